//! In-memory PCM audio buffer.
//!
//! An `AudioTrack` is owned by whichever pipeline stage currently holds it.
//! Stages never mutate a track in place: every transformation returns a new
//! track and the old one is dropped.

use crate::error::{ClipcueError, Result};

/// Interleaved 16-bit PCM audio with its format parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl AudioTrack {
    /// Creates a track from interleaved samples.
    ///
    /// The sample count must be a whole number of frames.
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ClipcueError::Audio {
                message: "sample rate must be positive".to_string(),
            });
        }
        if channels == 0 {
            return Err(ClipcueError::Audio {
                message: "channel count must be positive".to_string(),
            });
        }
        if samples.len() % channels as usize != 0 {
            return Err(ClipcueError::Audio {
                message: format!(
                    "{} samples do not form whole frames of {} channel(s)",
                    samples.len(),
                    channels
                ),
            });
        }
        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    /// Creates a silent track of the given duration.
    pub fn silence(duration_secs: f64, sample_rate: u32, channels: u16) -> Result<Self> {
        if !duration_secs.is_finite() || duration_secs < 0.0 {
            return Err(ClipcueError::Audio {
                message: format!("invalid silence duration {duration_secs}"),
            });
        }
        let frames = (duration_secs * sample_rate as f64).round() as usize;
        Self::new(vec![0i16; frames * channels as usize], sample_rate, channels)
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Track duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Returns a new track resized to exactly `target_frames`.
    ///
    /// A longer track is trimmed symmetrically (half from each end); a
    /// shorter one is padded with silence symmetrically. Frame-aligned, so
    /// channel interleaving is preserved.
    pub fn fit_to_frames(&self, target_frames: usize) -> Result<Self> {
        let ch = self.channels as usize;
        let frames = self.frames();

        let samples = if frames > target_frames {
            let excess = frames - target_frames;
            let front = excess / 2;
            let start = front * ch;
            let end = start + target_frames * ch;
            self.samples[start..end].to_vec()
        } else {
            let missing = target_frames - frames;
            let front = missing / 2;
            let back = missing - front;
            let mut out = Vec::with_capacity(target_frames * ch);
            out.extend(std::iter::repeat_n(0i16, front * ch));
            out.extend_from_slice(&self.samples);
            out.extend(std::iter::repeat_n(0i16, back * ch));
            out
        };

        Self::new(samples, self.sample_rate, self.channels)
    }

}
