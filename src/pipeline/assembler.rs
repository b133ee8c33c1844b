//! Batch assembly over a bounded worker pool.
//!
//! Runs one [`ClipPipeline`] per idea, at most `pool_size` concurrently, and
//! collects results back into the original idea order no matter how the pool
//! interleaves completions. One idea's failure never sinks the batch; the
//! batch fails only when nothing succeeds.

use crate::collab::idea::ClipIdea;
use crate::collab::synth::SpeechSynthesizer;
use crate::collab::toolkit::{MediaToolkit, VideoRef};
use crate::config::Config;
use crate::error::{ClipcueError, Result};
use crate::pipeline::clip::{ClipPipeline, ClipResult};
use crate::pipeline::events::ProgressReporter;
use crate::pipeline::sidecar::SidecarEntry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Report of one failed idea.
#[derive(Debug, Clone)]
pub struct ClipFailure {
    pub index: usize,
    pub title: String,
    pub reason: String,
}

/// Everything a finished batch delivers.
#[derive(Debug)]
pub struct BatchOutput {
    /// Successful clips, in original idea order.
    pub clips: Vec<ClipResult>,
    /// Title/description metadata for the successful clips, same order.
    pub sidecar: Vec<SidecarEntry>,
    /// Per-idea failures, in original idea order.
    pub failures: Vec<ClipFailure>,
}

/// Sequences clip pipelines and collects their outputs.
pub struct Assembler {
    config: Config,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    toolkit: Arc<dyn MediaToolkit>,
    reporter: ProgressReporter,
    cancel: Arc<AtomicBool>,
}

impl Assembler {
    pub fn new(
        config: Config,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        toolkit: Arc<dyn MediaToolkit>,
    ) -> Self {
        Self {
            config,
            synthesizer,
            toolkit,
            reporter: ProgressReporter::disabled(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attaches a progress reporter.
    pub fn with_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Shares a cancellation flag observed between stages and pool tasks.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Processes every idea and assembles the ordered batch output.
    ///
    /// Fails with `BatchFailed` only when zero ideas succeed.
    pub async fn assemble(
        &self,
        source: &VideoRef,
        ideas: &[ClipIdea],
        output_dir: &Path,
    ) -> Result<BatchOutput> {
        tokio::fs::create_dir_all(output_dir).await?;

        let pool = Arc::new(Semaphore::new(self.config.batch.pool_size.max(1)));
        let mut tasks: JoinSet<(usize, Result<ClipResult>)> = JoinSet::new();

        for (index, idea) in ideas.iter().enumerate() {
            let pipeline = ClipPipeline::new(
                self.config.clone(),
                self.synthesizer.clone(),
                self.toolkit.clone(),
                self.reporter.clone(),
                self.cancel.clone(),
            );
            let pool = pool.clone();
            let idea = idea.clone();
            let source = source.clone();
            let output_dir: PathBuf = output_dir.to_path_buf();

            tasks.spawn(async move {
                let _permit = match pool.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return (index, Err(ClipcueError::Cancelled)),
                };
                let result = pipeline.run(index, &idea, &source, &output_dir).await;
                (index, result)
            });
        }

        // Collect by index so output order matches input order regardless of
        // completion order.
        let mut slots: Vec<Option<Result<ClipResult>>> = (0..ideas.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => {
                    // A panicked pipeline task counts as a failed idea, not a
                    // failed batch; the slot stays empty and is reported below.
                    eprintln!("clipcue: pipeline task panicked: {e}");
                }
            }
        }

        let mut clips = Vec::new();
        let mut sidecar = Vec::new();
        let mut failures = Vec::new();
        for (index, slot) in slots.into_iter().enumerate() {
            let title = ideas[index].title.clone();
            match slot {
                Some(Ok(result)) => {
                    sidecar.push(SidecarEntry {
                        title: result.title.clone(),
                        description: result.description.clone(),
                    });
                    clips.push(result);
                }
                Some(Err(e)) => {
                    self.reporter.failed(index, &e.to_string());
                    failures.push(ClipFailure {
                        index,
                        title,
                        reason: e.to_string(),
                    });
                }
                None => {
                    let reason = "pipeline task panicked".to_string();
                    self.reporter.failed(index, &reason);
                    failures.push(ClipFailure {
                        index,
                        title,
                        reason,
                    });
                }
            }
        }

        self.reporter.batch_finished(clips.len(), failures.len());

        if clips.is_empty() {
            return Err(ClipcueError::BatchFailed {
                attempted: ideas.len(),
            });
        }

        Ok(BatchOutput {
            clips,
            sidecar,
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::synth::MockSynthesizer;
    use crate::collab::toolkit::MockToolkit;
    use crate::pipeline::events::ProgressEvent;
    use std::sync::atomic::Ordering;

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.batch.retry_backoff_ms = 1;
        config
    }

    fn idea(title: &str, script: &str, target_secs: f64) -> ClipIdea {
        ClipIdea {
            title: title.to_string(),
            description: format!("{title} description"),
            script: script.to_string(),
            source_start_secs: 0.0,
            source_end_secs: target_secs,
            voice_style: None,
        }
    }

    fn source_video(dir: &Path) -> VideoRef {
        let path = dir.join("source.mp4");
        std::fs::write(&path, b"source").unwrap();
        VideoRef::new(path)
    }

    #[tokio::test]
    async fn test_all_ideas_succeed_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_video(dir.path());

        let assembler = Assembler::new(
            fast_config(),
            Arc::new(MockSynthesizer::new().with_default_duration(10.0)),
            Arc::new(MockToolkit::new()),
        );

        let ideas = vec![
            idea("First", "words for clip one", 10.0),
            idea("Second", "words for clip two", 10.0),
            idea("Third", "words for clip three", 10.0),
        ];
        let output = assembler
            .assemble(&source, &ideas, &dir.path().join("out"))
            .await
            .unwrap();

        assert_eq!(output.clips.len(), 3);
        assert!(output.failures.is_empty());
        let titles: Vec<&str> = output.sidecar.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_order_preserved_despite_completion_order() {
        // The first idea takes the slow reconcile path while later ones are
        // trivial; with a pool of 2 the completions interleave.
        let dir = tempfile::tempdir().unwrap();
        let source = source_video(dir.path());

        let synth = MockSynthesizer::new()
            .with_default_duration(10.0)
            .with_script_duration("slow one", 14.0);

        let assembler = Assembler::new(
            fast_config(),
            Arc::new(synth),
            Arc::new(MockToolkit::new()),
        );

        let ideas = vec![
            idea("Slow", "slow one", 10.0),
            idea("Quick A", "fast words", 10.0),
            idea("Quick B", "more fast words", 10.0),
        ];
        let output = assembler
            .assemble(&source, &ideas, &dir.path().join("out"))
            .await
            .unwrap();

        let titles: Vec<&str> = output.sidecar.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Slow", "Quick A", "Quick B"]);
    }

    #[tokio::test]
    async fn test_failed_idea_does_not_sink_batch() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_video(dir.path());

        // 20s of audio for a 10s target: factor 2.0, unreconcilable
        let synth = MockSynthesizer::new()
            .with_default_duration(10.0)
            .with_script_duration("doomed script", 20.0);

        let (tx, rx) = crossbeam_channel::unbounded();
        let assembler = Assembler::new(
            fast_config(),
            Arc::new(synth),
            Arc::new(MockToolkit::new()),
        )
        .with_reporter(ProgressReporter::new(tx));

        let ideas = vec![
            idea("Doomed", "doomed script", 10.0),
            idea("Fine", "perfectly fine words", 10.0),
        ];
        let output = assembler
            .assemble(&source, &ideas, &dir.path().join("out"))
            .await
            .unwrap();

        assert_eq!(output.clips.len(), 1);
        assert_eq!(output.clips[0].title, "Fine");
        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].index, 0);
        assert_eq!(output.failures[0].title, "Doomed");
        assert!(output.failures[0].reason.contains("2.000"));

        let events: Vec<ProgressEvent> = rx.try_iter().collect();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, ProgressEvent::IdeaFailed { idea_index: 0, .. }))
        );
        assert!(
            events
                .iter()
                .any(|e| matches!(e, ProgressEvent::BatchFinished { succeeded: 1, failed: 1 }))
        );
    }

    #[tokio::test]
    async fn test_batch_fails_when_nothing_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_video(dir.path());

        let assembler = Assembler::new(
            fast_config(),
            Arc::new(MockSynthesizer::new().with_default_duration(10.0).with_failures(100)),
            Arc::new(MockToolkit::new()),
        );

        let ideas = vec![idea("A", "some words", 10.0), idea("B", "other words", 10.0)];
        let err = assembler
            .assemble(&source, &ideas, &dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClipcueError::BatchFailed { attempted: 2 }));
    }

    #[tokio::test]
    async fn test_empty_batch_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_video(dir.path());

        let assembler = Assembler::new(
            fast_config(),
            Arc::new(MockSynthesizer::new()),
            Arc::new(MockToolkit::new()),
        );

        let err = assembler
            .assemble(&source, &[], &dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClipcueError::BatchFailed { attempted: 0 }));
    }

    #[tokio::test]
    async fn test_cancellation_fails_pending_ideas() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_video(dir.path());

        let cancel = Arc::new(AtomicBool::new(false));
        cancel.store(true, Ordering::SeqCst);

        let assembler = Assembler::new(
            fast_config(),
            Arc::new(MockSynthesizer::new().with_default_duration(10.0)),
            Arc::new(MockToolkit::new()),
        )
        .with_cancel_flag(cancel);

        let ideas = vec![idea("A", "some words", 10.0)];
        let err = assembler
            .assemble(&source, &ideas, &dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClipcueError::BatchFailed { .. }));
    }
}
