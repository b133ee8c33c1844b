//! clipcue - Subtitle timing and voiceover synchronization for short-form clips
//!
//! Reconciles a synthesized voiceover, a fixed-length video segment, and the
//! script that produced the voiceover into a frame-accurate subtitle timing
//! map, then hands merge and burn-in to an external media toolkit.

// Enforce error handling discipline in non-test code
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod cli;
pub mod collab;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod subtitle;

// Core engine (analysis stages)
pub use engine::phrases::{Phrase, PhraseSegmenter, PhraseSegmenterConfig, WordHighlight};
pub use engine::reconcile::{DurationReconciler, ReconcilerConfig, StretchPlan};
pub use engine::silence::{SilenceDetector, SilenceDetectorConfig, SilenceInterval};
pub use engine::timing::{TimingMap, TimingMapBuilder};
pub use engine::words::{ScriptToken, WordTimeEstimator};

// Collaborator seams (source → synthesize → toolkit)
pub use collab::idea::{ClipIdea, load_manifest};
pub use collab::synth::{CommandSynthesizer, MockSynthesizer, SpeechSynthesizer};
pub use collab::toolkit::{FfmpegToolkit, MediaToolkit, MockToolkit, VideoRef};

// Pipeline and batch assembly
pub use pipeline::assembler::{Assembler, BatchOutput, ClipFailure};
pub use pipeline::clip::{ClipPipeline, ClipResult};
pub use pipeline::events::{ClipStage, ProgressEvent, ProgressReporter};
pub use pipeline::sidecar::SidecarEntry;

// Audio
pub use audio::AudioTrack;

// Error handling
pub use error::{ClipcueError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
