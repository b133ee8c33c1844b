//! Silence detection over waveform samples.
//!
//! Scans a track in fixed-size analysis windows, classifying each window by
//! RMS energy against a normalized threshold. Adjacent silent windows
//! coalesce into intervals; intervals shorter than the configured minimum are
//! discarded as brief dips rather than genuine pauses.
//!
//! Detection is a pure function of (samples, parameters): identical input
//! always yields identical intervals.

use crate::audio::AudioTrack;
use crate::defaults;

/// A silent span of the track, in seconds from track start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceInterval {
    pub start_secs: f64,
    pub end_secs: f64,
}

impl SilenceInterval {
    pub fn new(start_secs: f64, end_secs: f64) -> Self {
        Self {
            start_secs,
            end_secs,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// Configuration for the silence detector.
#[derive(Debug, Clone, Copy)]
pub struct SilenceDetectorConfig {
    /// Normalized RMS threshold (0.0 to 1.0); windows strictly below are silent.
    pub threshold: f32,
    /// Analysis window length in milliseconds.
    pub window_ms: u32,
    /// Minimum silence duration in milliseconds; shorter runs are discarded.
    pub min_silence_ms: u32,
}

impl Default for SilenceDetectorConfig {
    fn default() -> Self {
        Self {
            threshold: defaults::SILENCE_THRESHOLD,
            window_ms: defaults::SILENCE_WINDOW_MS,
            min_silence_ms: defaults::MIN_SILENCE_MS,
        }
    }
}

/// Windowed-RMS silence detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilenceDetector {
    config: SilenceDetectorConfig,
}

impl SilenceDetector {
    pub fn new(config: SilenceDetectorConfig) -> Self {
        Self { config }
    }

    /// Scans the track and returns ordered, non-overlapping silent intervals.
    pub fn detect(&self, track: &AudioTrack) -> Vec<SilenceInterval> {
        let ch = track.channels() as usize;
        let rate = track.sample_rate() as f64;
        let frames_per_window =
            ((track.sample_rate() as u64 * self.config.window_ms as u64) / 1000).max(1) as usize;
        let min_silence_secs = self.config.min_silence_ms as f64 / 1000.0;

        let mut intervals = Vec::new();
        let mut run_start_frame: Option<usize> = None;
        let mut frame_cursor = 0usize;

        for window in track.samples().chunks(frames_per_window * ch) {
            let window_frames = window.len() / ch;
            let silent = normalized_rms(window) < self.config.threshold;

            match (silent, run_start_frame) {
                (true, None) => run_start_frame = Some(frame_cursor),
                (false, Some(start)) => {
                    intervals.push((start, frame_cursor));
                    run_start_frame = None;
                }
                _ => {}
            }

            frame_cursor += window_frames;
        }
        if let Some(start) = run_start_frame {
            intervals.push((start, frame_cursor));
        }

        intervals
            .into_iter()
            .map(|(start, end)| SilenceInterval::new(start as f64 / rate, end as f64 / rate))
            .filter(|interval| interval.duration_secs() >= min_silence_secs)
            .collect()
    }
}

/// Calculates the normalized Root Mean Square of interleaved samples.
///
/// Returns a value in 0.0 to 1.0, where 0.0 is digital silence and ~0.707 is
/// a full-scale sine wave. Multi-channel windows contribute all channels to
/// the same energy estimate.
pub fn normalized_rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let normalized = sample as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();

    let mean_square = sum_squares / samples.len() as f64;
    mean_square.sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a mono track from (amplitude, duration_secs) segments.
    fn track_from_segments(segments: &[(i16, f64)], sample_rate: u32) -> AudioTrack {
        let mut samples = Vec::new();
        for &(amplitude, secs) in segments {
            let frames = (secs * sample_rate as f64).round() as usize;
            samples.extend(std::iter::repeat_n(amplitude, frames));
        }
        AudioTrack::new(samples, sample_rate, 1).unwrap()
    }

    fn detector(threshold: f32, min_silence_ms: u32) -> SilenceDetector {
        SilenceDetector::new(SilenceDetectorConfig {
            threshold,
            window_ms: 20,
            min_silence_ms,
        })
    }

    #[test]
    fn test_rms_silence_is_zero() {
        assert_eq!(normalized_rms(&vec![0i16; 1000]), 0.0);
    }

    #[test]
    fn test_rms_max_amplitude() {
        let rms = normalized_rms(&vec![i16::MAX; 1000]);
        assert!((rms - 1.0).abs() < 0.001, "RMS should be ~1.0, got {}", rms);
    }

    #[test]
    fn test_rms_empty_samples() {
        assert_eq!(normalized_rms(&[]), 0.0);
    }

    #[test]
    fn test_no_silence_in_loud_track() {
        let track = track_from_segments(&[(6000, 2.0)], 16_000);
        assert!(detector(0.01, 200).detect(&track).is_empty());
    }

    #[test]
    fn test_fully_silent_track_is_one_interval() {
        let track = track_from_segments(&[(0, 1.5)], 16_000);
        let intervals = detector(0.01, 200).detect(&track);
        assert_eq!(intervals.len(), 1);
        assert!((intervals[0].start_secs - 0.0).abs() < 1e-9);
        assert!((intervals[0].end_secs - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_gap_between_speech_is_detected() {
        let track = track_from_segments(&[(6000, 2.0), (0, 0.6), (6000, 2.4)], 16_000);
        let intervals = detector(0.01, 200).detect(&track);
        assert_eq!(intervals.len(), 1);
        assert!((intervals[0].start_secs - 2.0).abs() < 0.021);
        assert!((intervals[0].end_secs - 2.6).abs() < 0.021);
    }

    #[test]
    fn test_short_dip_is_discarded() {
        // 100ms dip, below a 200ms minimum
        let track = track_from_segments(&[(6000, 1.0), (0, 0.1), (6000, 1.0)], 16_000);
        assert!(detector(0.01, 200).detect(&track).is_empty());
    }

    #[test]
    fn test_multiple_intervals_sorted_non_overlapping() {
        let track = track_from_segments(
            &[(6000, 1.0), (0, 0.3), (6000, 1.0), (0, 0.5), (6000, 0.5)],
            16_000,
        );
        let intervals = detector(0.01, 200).detect(&track);
        assert_eq!(intervals.len(), 2);
        for interval in &intervals {
            assert!(interval.end_secs > interval.start_secs);
        }
        assert!(intervals[0].end_secs <= intervals[1].start_secs);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let track = track_from_segments(&[(6000, 1.0), (0, 0.4), (3000, 1.0)], 16_000);
        let det = detector(0.01, 200);
        assert_eq!(det.detect(&track), det.detect(&track));
    }

    #[test]
    fn test_trailing_silence_reaches_track_end() {
        let track = track_from_segments(&[(6000, 1.0), (0, 0.5)], 16_000);
        let intervals = detector(0.01, 200).detect(&track);
        assert_eq!(intervals.len(), 1);
        assert!((intervals[0].end_secs - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_boundary_is_exclusive() {
        // A window exactly at the threshold is not silent.
        let amplitude = (0.01 * i16::MAX as f32) as i16 + 1;
        let track = track_from_segments(&[(amplitude, 1.0)], 16_000);
        assert!(detector(0.01, 200).detect(&track).is_empty());
    }

    #[test]
    fn test_stereo_track_downmixes_energy() {
        // Both channels silent in the middle second
        let rate = 16_000u32;
        let mut samples = Vec::new();
        samples.extend(std::iter::repeat_n(5000i16, rate as usize * 2)); // 1s stereo loud
        samples.extend(std::iter::repeat_n(0i16, rate as usize * 2)); // 1s stereo silent
        samples.extend(std::iter::repeat_n(5000i16, rate as usize * 2)); // 1s stereo loud
        let track = AudioTrack::new(samples, rate, 2).unwrap();

        let intervals = detector(0.01, 200).detect(&track);
        assert_eq!(intervals.len(), 1);
        assert!((intervals[0].start_secs - 1.0).abs() < 0.021);
        assert!((intervals[0].end_secs - 2.0).abs() < 0.021);
    }
}
