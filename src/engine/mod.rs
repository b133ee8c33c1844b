//! Core timing-synchronization engine.
//!
//! The engine reconciles three independently produced timelines (a
//! synthesized voiceover track, a fixed-length video segment, and the script
//! that produced the voiceover) into one ordered subtitle timing map:
//!
//! - [`reconcile`] fits the voiceover into the segment's duration window.
//! - [`silence`] scans the (possibly stretched) waveform for silent intervals.
//! - [`words`] estimates per-word spans over the final track duration.
//! - [`phrases`] merges words and silences into display phrases.
//! - [`timing`] composes phrases into the validated cue sequence.
//!
//! Every stage is synchronous, deterministic CPU work; only the external
//! stretch call (via the media toolkit) suspends.

pub mod phrases;
pub mod reconcile;
pub mod silence;
pub mod timing;
pub mod words;

pub use phrases::{Phrase, PhraseSegmenter, PhraseSegmenterConfig, WordHighlight};
pub use reconcile::{DurationReconciler, ReconcilerConfig, StretchPlan};
pub use silence::{SilenceDetector, SilenceDetectorConfig, SilenceInterval};
pub use timing::{TimingMap, TimingMapBuilder};
pub use words::{ScriptToken, WordTimeEstimator};
