//! External collaborator interfaces.
//!
//! The engine consumes three collaborators it does not implement: the
//! upstream idea generator (via a manifest file), a speech synthesizer, and
//! a media toolkit. Each is a trait seam with a subprocess-backed production
//! implementation and a mock for tests.

pub mod idea;
pub mod synth;
pub mod toolkit;

pub use idea::ClipIdea;
pub use synth::SpeechSynthesizer;
pub use toolkit::{MediaToolkit, VideoRef};
