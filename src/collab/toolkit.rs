//! Media toolkit collaborator.
//!
//! Pitch-preserving time stretch, segment extraction, audio/video merge, and
//! subtitle burn-in are delegated to an external toolkit (ffmpeg in
//! production). Every operation takes the per-idea scratch directory for its
//! intermediate files; final artifacts are moved out by the pipeline.

use crate::audio::{AudioTrack, wav};
use crate::defaults;
use crate::engine::timing::TimingMap;
use crate::error::{ClipcueError, Result};
use crate::subtitle;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// Handle to a video artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef(PathBuf);

impl VideoRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for VideoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Trait for the external audio/video toolkit.
#[async_trait]
pub trait MediaToolkit: Send + Sync {
    /// Cuts `[start_secs, end_secs)` out of the source video.
    async fn extract_segment(
        &self,
        source: &VideoRef,
        start_secs: f64,
        end_secs: f64,
        scratch: &Path,
    ) -> Result<VideoRef>;

    /// Stretches the track by `factor` (>1 speeds up, <1 slows down),
    /// preserving pitch.
    async fn stretch(&self, track: &AudioTrack, factor: f64, scratch: &Path)
    -> Result<AudioTrack>;

    /// Replaces the video's audio with `track`.
    async fn merge(&self, video: &VideoRef, track: &AudioTrack, scratch: &Path)
    -> Result<VideoRef>;

    /// Burns the timing map's subtitles into the video.
    async fn burn_subtitles(
        &self,
        video: &VideoRef,
        timing: &TimingMap,
        scratch: &Path,
    ) -> Result<VideoRef>;
}

/// Splits a stretch factor into a chain of per-filter factors.
///
/// ffmpeg's `atempo` filter accepts 0.5 to 2.0 per instance; factors outside
/// that range are expressed as a product of in-range filters.
pub fn atempo_chain(factor: f64) -> Vec<f64> {
    let mut chain = Vec::new();
    let mut remaining = factor;

    while remaining > 2.0 {
        chain.push(2.0);
        remaining /= 2.0;
    }
    while remaining < 0.5 {
        chain.push(0.5);
        remaining /= 0.5;
    }
    chain.push(remaining);
    chain
}

/// ffmpeg-backed toolkit.
pub struct FfmpegToolkit {
    program: String,
}

impl FfmpegToolkit {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, operation: &str, args: Vec<String>) -> Result<()> {
        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| ClipcueError::Toolkit {
                operation: operation.to_string(),
                message: format!("failed to spawn {}: {e}", self.program),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // The useful diagnostics are in ffmpeg's last few stderr lines
            let tail: Vec<&str> = stderr.lines().rev().take(4).collect();
            let tail: Vec<&str> = tail.into_iter().rev().collect();
            return Err(ClipcueError::Toolkit {
                operation: operation.to_string(),
                message: format!("{}: {}", output.status, tail.join(" | ")),
            });
        }
        Ok(())
    }
}

impl Default for FfmpegToolkit {
    fn default() -> Self {
        Self::new(defaults::FFMPEG_PROGRAM)
    }
}

#[async_trait]
impl MediaToolkit for FfmpegToolkit {
    async fn extract_segment(
        &self,
        source: &VideoRef,
        start_secs: f64,
        end_secs: f64,
        scratch: &Path,
    ) -> Result<VideoRef> {
        let out = scratch.join("segment.mp4");
        self.run(
            "extract_segment",
            vec![
                "-y".to_string(),
                "-ss".to_string(),
                format!("{start_secs:.3}"),
                "-i".to_string(),
                source.path().display().to_string(),
                "-t".to_string(),
                format!("{:.3}", end_secs - start_secs),
                "-c".to_string(),
                "copy".to_string(),
                out.display().to_string(),
            ],
        )
        .await?;
        Ok(VideoRef::new(out))
    }

    async fn stretch(
        &self,
        track: &AudioTrack,
        factor: f64,
        scratch: &Path,
    ) -> Result<AudioTrack> {
        let input = scratch.join("stretch_in.wav");
        let output = scratch.join("stretch_out.wav");
        wav::write_track_file(track, &input)?;

        let filter = atempo_chain(factor)
            .iter()
            .map(|f| format!("atempo={f:.6}"))
            .collect::<Vec<_>>()
            .join(",");

        self.run(
            "stretch",
            vec![
                "-y".to_string(),
                "-i".to_string(),
                input.display().to_string(),
                "-filter:a".to_string(),
                filter,
                output.display().to_string(),
            ],
        )
        .await?;

        wav::read_track_file(&output)
    }

    async fn merge(
        &self,
        video: &VideoRef,
        track: &AudioTrack,
        scratch: &Path,
    ) -> Result<VideoRef> {
        let audio = scratch.join("voiceover.wav");
        let out = scratch.join("merged.mp4");
        wav::write_track_file(track, &audio)?;

        self.run(
            "merge",
            vec![
                "-y".to_string(),
                "-i".to_string(),
                video.path().display().to_string(),
                "-i".to_string(),
                audio.display().to_string(),
                "-map".to_string(),
                "0:v:0".to_string(),
                "-map".to_string(),
                "1:a:0".to_string(),
                "-c:v".to_string(),
                "copy".to_string(),
                "-c:a".to_string(),
                "aac".to_string(),
                "-shortest".to_string(),
                out.display().to_string(),
            ],
        )
        .await?;
        Ok(VideoRef::new(out))
    }

    async fn burn_subtitles(
        &self,
        video: &VideoRef,
        timing: &TimingMap,
        scratch: &Path,
    ) -> Result<VideoRef> {
        let subs = scratch.join("subtitles.ass");
        let out = scratch.join("subtitled.mp4");
        std::fs::write(&subs, subtitle::ass::render(timing))?;

        // The ass filter parses ':' and '\' specially inside its argument
        let escaped = subs
            .display()
            .to_string()
            .replace('\\', "/")
            .replace(':', "\\:");

        self.run(
            "burn_subtitles",
            vec![
                "-y".to_string(),
                "-i".to_string(),
                video.path().display().to_string(),
                "-vf".to_string(),
                format!("ass={escaped}"),
                "-c:v".to_string(),
                "libx264".to_string(),
                "-preset".to_string(),
                "fast".to_string(),
                "-c:a".to_string(),
                "copy".to_string(),
                out.display().to_string(),
            ],
        )
        .await?;
        Ok(VideoRef::new(out))
    }
}

/// Mock toolkit for testing.
///
/// The stretch is a naive linear resample (duration-accurate, not
/// pitch-preserving); video operations create marker files in the scratch
/// directory. Individual operations can be primed to fail a number of times
/// to exercise retry paths.
#[derive(Default)]
pub struct MockToolkit {
    failures: Mutex<std::collections::HashMap<&'static str, u32>>,
    stretch_calls: AtomicU32,
}

impl MockToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the named operation fail its next `count` invocations.
    pub fn with_op_failures(self, operation: &'static str, count: u32) -> Self {
        #[allow(clippy::unwrap_used)]
        self.failures.lock().unwrap().insert(operation, count);
        self
    }

    /// Number of stretch requests seen so far.
    pub fn stretch_calls(&self) -> u32 {
        self.stretch_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self, operation: &'static str) -> Result<()> {
        #[allow(clippy::unwrap_used)]
        let mut failures = self.failures.lock().unwrap();
        if let Some(remaining) = failures.get_mut(operation)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(ClipcueError::Toolkit {
                operation: operation.to_string(),
                message: "mock toolkit failure".to_string(),
            });
        }
        Ok(())
    }

    fn touch(path: &Path) -> Result<VideoRef> {
        std::fs::write(path, b"mock video")?;
        Ok(VideoRef::new(path))
    }
}

#[async_trait]
impl MediaToolkit for MockToolkit {
    async fn extract_segment(
        &self,
        _source: &VideoRef,
        _start_secs: f64,
        _end_secs: f64,
        scratch: &Path,
    ) -> Result<VideoRef> {
        self.check_failure("extract_segment")?;
        Self::touch(&scratch.join("segment.mp4"))
    }

    async fn stretch(
        &self,
        track: &AudioTrack,
        factor: f64,
        _scratch: &Path,
    ) -> Result<AudioTrack> {
        self.check_failure("stretch")?;
        self.stretch_calls.fetch_add(1, Ordering::SeqCst);
        resample_by_factor(track, factor)
    }

    async fn merge(
        &self,
        _video: &VideoRef,
        _track: &AudioTrack,
        scratch: &Path,
    ) -> Result<VideoRef> {
        self.check_failure("merge")?;
        Self::touch(&scratch.join("merged.mp4"))
    }

    async fn burn_subtitles(
        &self,
        _video: &VideoRef,
        timing: &TimingMap,
        scratch: &Path,
    ) -> Result<VideoRef> {
        self.check_failure("burn_subtitles")?;
        // Exercise the real renderer so its output stays parseable
        std::fs::write(scratch.join("subtitles.ass"), subtitle::ass::render(timing))?;
        Self::touch(&scratch.join("subtitled.mp4"))
    }
}

/// Linear-interpolation resample changing duration by `factor`.
///
/// `factor` > 1 shortens the track (faster playback). Channel frames are
/// interpolated independently.
fn resample_by_factor(track: &AudioTrack, factor: f64) -> Result<AudioTrack> {
    if !(factor > 0.0) || !factor.is_finite() {
        return Err(ClipcueError::Audio {
            message: format!("invalid stretch factor {factor}"),
        });
    }

    let ch = track.channels() as usize;
    let in_frames = track.frames();
    let out_frames = (in_frames as f64 / factor).round().max(1.0) as usize;
    let samples = track.samples();

    let mut out = Vec::with_capacity(out_frames * ch);
    for frame in 0..out_frames {
        let position = frame as f64 * (in_frames - 1) as f64 / (out_frames - 1).max(1) as f64;
        let base = position.floor() as usize;
        let next = (base + 1).min(in_frames - 1);
        let fraction = position - base as f64;

        for channel in 0..ch {
            let a = samples[base * ch + channel] as f64;
            let b = samples[next * ch + channel] as f64;
            out.push((a + (b - a) * fraction).round() as i16);
        }
    }

    AudioTrack::new(out, track.sample_rate(), track.channels())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atempo_chain_in_range_factor() {
        assert_eq!(atempo_chain(1.2), vec![1.2]);
        assert_eq!(atempo_chain(0.9), vec![0.9]);
    }

    #[test]
    fn test_atempo_chain_large_factor() {
        let chain = atempo_chain(5.0);
        assert!(chain.iter().all(|&f| (0.5..=2.0).contains(&f)));
        let product: f64 = chain.iter().product();
        assert!((product - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_atempo_chain_small_factor() {
        let chain = atempo_chain(0.2);
        assert!(chain.iter().all(|&f| (0.5..=2.0).contains(&f)));
        let product: f64 = chain.iter().product();
        assert!((product - 0.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_mock_stretch_changes_duration() {
        let toolkit = MockToolkit::new();
        let scratch = tempfile::tempdir().unwrap();
        let track = AudioTrack::new(vec![4000i16; 24_000], 24_000, 1).unwrap();

        let stretched = toolkit.stretch(&track, 2.0, scratch.path()).await.unwrap();
        assert!((stretched.duration_secs() - 0.5).abs() < 0.001);
        assert_eq!(toolkit.stretch_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_stretch_slowdown() {
        let toolkit = MockToolkit::new();
        let scratch = tempfile::tempdir().unwrap();
        let track = AudioTrack::new(vec![4000i16; 12_000], 24_000, 1).unwrap();

        let stretched = toolkit.stretch(&track, 0.5, scratch.path()).await.unwrap();
        assert!((stretched.duration_secs() - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_mock_op_failures_then_success() {
        let toolkit = MockToolkit::new().with_op_failures("merge", 2);
        let scratch = tempfile::tempdir().unwrap();
        let video = VideoRef::new(scratch.path().join("in.mp4"));
        let track = AudioTrack::new(vec![0i16; 2400], 24_000, 1).unwrap();

        assert!(toolkit.merge(&video, &track, scratch.path()).await.is_err());
        assert!(toolkit.merge(&video, &track, scratch.path()).await.is_err());
        assert!(toolkit.merge(&video, &track, scratch.path()).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_burn_writes_ass_file() {
        use crate::engine::timing::TimingMapBuilder;

        let toolkit = MockToolkit::new();
        let scratch = tempfile::tempdir().unwrap();
        let video = VideoRef::new(scratch.path().join("in.mp4"));
        let map = TimingMapBuilder::default().build(Vec::new(), 1.0).unwrap();

        toolkit
            .burn_subtitles(&video, &map, scratch.path())
            .await
            .unwrap();
        assert!(scratch.path().join("subtitles.ass").exists());
    }

    #[test]
    fn test_resample_preserves_sample_rate_and_channels() {
        let track = AudioTrack::new(vec![100i16; 4800], 24_000, 2).unwrap();
        let out = resample_by_factor(&track, 1.5).unwrap();
        assert_eq!(out.sample_rate(), 24_000);
        assert_eq!(out.channels(), 2);
        assert_eq!(out.frames(), 1600);
    }

    #[test]
    fn test_resample_rejects_bad_factor() {
        let track = AudioTrack::new(vec![0i16; 100], 24_000, 1).unwrap();
        assert!(resample_by_factor(&track, 0.0).is_err());
        assert!(resample_by_factor(&track, f64::NAN).is_err());
    }

    #[test]
    fn test_video_ref_display() {
        let video = VideoRef::new("/tmp/clip.mp4");
        assert_eq!(video.to_string(), "/tmp/clip.mp4");
    }
}
