//! Typed progress events emitted by running pipelines.
//!
//! The engine has no UI dependency: pipelines report state transitions over
//! an optional non-blocking channel and any front end (console, web, GUI)
//! renders them as it likes.

use serde::Serialize;

/// Pipeline state for one clip idea.
///
/// Reachable in order; `Failed` is terminal and reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClipStage {
    Pending,
    AudioAdjusted,
    SilenceAnalyzed,
    TimingBuilt,
    Merged,
    Done,
}

impl ClipStage {
    /// Coarse completion percentage for progress bars.
    pub fn percent(&self) -> u8 {
        match self {
            ClipStage::Pending => 0,
            ClipStage::AudioAdjusted => 30,
            ClipStage::SilenceAnalyzed => 50,
            ClipStage::TimingBuilt => 70,
            ClipStage::Merged => 90,
            ClipStage::Done => 100,
        }
    }
}

impl std::fmt::Display for ClipStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ClipStage::Pending => "pending",
            ClipStage::AudioAdjusted => "audio adjusted",
            ClipStage::SilenceAnalyzed => "silence analyzed",
            ClipStage::TimingBuilt => "timing built",
            ClipStage::Merged => "merged",
            ClipStage::Done => "done",
        };
        write!(f, "{name}")
    }
}

/// One progress report from a pipeline or the assembler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ProgressEvent {
    /// An idea's pipeline entered a new stage.
    StageChanged {
        idea_index: usize,
        stage: ClipStage,
        percent: u8,
    },
    /// An idea's pipeline terminated with a failure.
    IdeaFailed { idea_index: usize, reason: String },
    /// A non-fatal observation worth surfacing (e.g. inconclusive silence).
    Diagnostic { idea_index: usize, message: String },
    /// The whole batch finished.
    BatchFinished { succeeded: usize, failed: usize },
}

/// Non-blocking event emitter carried by pipelines.
///
/// Cloneable and cheap; with no sender attached every emit is a no-op. Send
/// errors are ignored: a disconnected or full consumer must never stall the
/// pipeline.
#[derive(Clone, Default)]
pub struct ProgressReporter {
    tx: Option<crossbeam_channel::Sender<ProgressEvent>>,
}

impl ProgressReporter {
    /// Reporter that discards all events.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Reporter sending events over the given channel.
    pub fn new(tx: crossbeam_channel::Sender<ProgressEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn stage(&self, idea_index: usize, stage: ClipStage) {
        self.emit(ProgressEvent::StageChanged {
            idea_index,
            stage,
            percent: stage.percent(),
        });
    }

    pub fn failed(&self, idea_index: usize, reason: &str) {
        self.emit(ProgressEvent::IdeaFailed {
            idea_index,
            reason: reason.to_string(),
        });
    }

    pub fn diagnostic(&self, idea_index: usize, message: &str) {
        self.emit(ProgressEvent::Diagnostic {
            idea_index,
            message: message.to_string(),
        });
    }

    pub fn batch_finished(&self, succeeded: usize, failed: usize) {
        self.emit(ProgressEvent::BatchFinished { succeeded, failed });
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(ref tx) = self.tx {
            let _ = tx.try_send(event);
        }
    }
}
