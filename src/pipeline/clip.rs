//! Per-idea clip pipeline.
//!
//! One pipeline owns one clip idea from synthesis to merged video. Stages
//! run strictly in sequence; the only suspension points are the external
//! collaborator calls, which are retried with backoff before the idea is
//! given up on. A failure terminates this idea only; the batch carries on.

use crate::audio::AudioTrack;
use crate::collab::idea::ClipIdea;
use crate::collab::synth::SpeechSynthesizer;
use crate::collab::toolkit::{MediaToolkit, VideoRef};
use crate::config::Config;
use crate::engine::phrases::PhraseSegmenter;
use crate::engine::reconcile::DurationReconciler;
use crate::engine::silence::SilenceDetector;
use crate::engine::timing::{TimingMap, TimingMapBuilder};
use crate::engine::words::WordTimeEstimator;
use crate::error::{ClipcueError, Result};
use crate::pipeline::events::{ClipStage, ProgressReporter};
use crate::pipeline::sidecar::sanitize_filename;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Terminal artifact of one successful pipeline run.
#[derive(Debug, Clone)]
pub struct ClipResult {
    pub video: VideoRef,
    pub track: AudioTrack,
    pub timing: TimingMap,
    pub title: String,
    pub description: String,
}

/// Pipeline for a single clip idea.
pub struct ClipPipeline {
    config: Config,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    toolkit: Arc<dyn MediaToolkit>,
    reporter: ProgressReporter,
    cancel: Arc<AtomicBool>,
}

impl ClipPipeline {
    pub fn new(
        config: Config,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        toolkit: Arc<dyn MediaToolkit>,
        reporter: ProgressReporter,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            synthesizer,
            toolkit,
            reporter,
            cancel,
        }
    }

    /// Runs the idea through every stage and delivers its final artifacts
    /// into `output_dir`.
    ///
    /// The cancellation flag is observed between stages: once set, no new
    /// stage starts. Intermediate files live in a private scratch directory
    /// that is removed when the run ends.
    pub async fn run(
        &self,
        index: usize,
        idea: &ClipIdea,
        source: &VideoRef,
        output_dir: &Path,
    ) -> Result<ClipResult> {
        let scratch = tempfile::tempdir()?;
        let scratch_path = scratch.path();

        idea.validate(index)?;
        self.checkpoint()?;
        self.reporter.stage(index, ClipStage::Pending);

        let target_secs = idea.target_duration_secs();
        let attempts = self.config.batch.retry_attempts;
        let backoff = Duration::from_millis(self.config.batch.retry_backoff_ms);

        // Cut the video segment the voiceover must fit
        let segment = retry_external(attempts, backoff, || {
            self.toolkit
                .extract_segment(source, idea.source_start_secs, idea.source_end_secs, scratch_path)
        })
        .await?;

        // Synthesize the voiceover
        self.checkpoint()?;
        let raw_track = retry_external(attempts, backoff, || {
            self.synthesizer
                .synthesize(&idea.script, idea.voice_style.as_deref())
        })
        .await?;

        // Fit the voiceover into the segment duration
        self.checkpoint()?;
        let reconciler = DurationReconciler::new(self.config.reconciler());
        let track = retry_external(attempts, backoff, || {
            reconciler.reconcile(raw_track.clone(), target_secs, self.toolkit.as_ref(), scratch_path)
        })
        .await?;
        self.reporter.stage(index, ClipStage::AudioAdjusted);

        // Analyze the adjusted voiceover's silence structure
        self.checkpoint()?;
        let silences = SilenceDetector::new(self.config.silence_detector()).detect(&track);
        if silences.is_empty() {
            self.reporter.diagnostic(
                index,
                &ClipcueError::SilenceDetectionInconclusive.to_string(),
            );
        }
        self.reporter.stage(index, ClipStage::SilenceAnalyzed);

        // Estimate words, segment phrases, build the timing map
        self.checkpoint()?;
        let tokens = WordTimeEstimator::new().estimate(&idea.script, track.duration_secs())?;
        let phrases = PhraseSegmenter::new(self.config.phrase_segmenter()).segment(&tokens, &silences);
        let timing = TimingMapBuilder::new(self.config.reconciler().tolerance_secs)
            .build(phrases, track.duration_secs())?;
        self.reporter.stage(index, ClipStage::TimingBuilt);

        // Merge the voiceover and burn the subtitles in
        self.checkpoint()?;
        let merged = retry_external(attempts, backoff, || {
            self.toolkit.merge(&segment, &track, scratch_path)
        })
        .await?;
        let subtitled = retry_external(attempts, backoff, || {
            self.toolkit.burn_subtitles(&merged, &timing, scratch_path)
        })
        .await?;
        self.reporter.stage(index, ClipStage::Merged);

        // Persist the final video before the scratch directory is dropped
        let filename = format!("{:02}_{}.mp4", index + 1, sanitize_filename(&idea.title));
        let final_path = output_dir.join(filename);
        tokio::fs::copy(subtitled.path(), &final_path).await?;

        self.reporter.stage(index, ClipStage::Done);
        Ok(ClipResult {
            video: VideoRef::new(final_path),
            track,
            timing,
            title: idea.title.clone(),
            description: idea.description.clone(),
        })
    }

    /// Fails fast when cancellation has been observed.
    fn checkpoint(&self) -> Result<()> {
        if self.cancel.load(Ordering::SeqCst) {
            Err(ClipcueError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Retries an external-collaborator call with doubling backoff.
///
/// Only retryable errors (synthesis and toolkit failures) are retried;
/// engine errors propagate immediately.
async fn retry_external<T, F, Fut>(attempts: u32, initial_backoff: Duration, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = initial_backoff;
    let mut attempt = 0u32;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts && e.is_retryable() => {
                attempt += 1;
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}
