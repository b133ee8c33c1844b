//! Per-idea clip pipelines and batch assembly.
//!
//! Each clip idea runs through its own pipeline, an independent state
//! machine with no shared mutable state, while the assembler bounds how
//! many run concurrently and stitches the results back into input order.

pub mod assembler;
pub mod clip;
pub mod events;
pub mod sidecar;

pub use assembler::{Assembler, BatchOutput, ClipFailure};
pub use clip::{ClipPipeline, ClipResult};
pub use events::{ClipStage, ProgressEvent, ProgressReporter};
pub use sidecar::SidecarEntry;
