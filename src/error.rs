//! Error types for clipcue.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipcueError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio errors
    #[error("Audio error: {message}")]
    Audio { message: String },

    // Reconciliation errors
    #[error("Stretch factor {factor:.3} is outside the reconcilable range")]
    DurationUnreconcilable { factor: f64 },

    // Silence analysis
    #[error("No silence detected in the analyzed track")]
    SilenceDetectionInconclusive,

    // Timing map invariant violations (a defect, never silently patched)
    #[error("Invalid timing map: {detail}")]
    InvalidTimingMap { detail: String },

    // External collaborators
    #[error("Speech synthesis failed: {message}")]
    SynthesisFailure { message: String },

    #[error("Media toolkit {operation} failed: {message}")]
    Toolkit { operation: String, message: String },

    // Idea manifest errors
    #[error("Invalid clip idea at index {index}: {message}")]
    InvalidIdea { index: usize, message: String },

    // Batch-level errors
    #[error("All {attempted} clip idea(s) failed; nothing to assemble")]
    BatchFailed { attempted: usize },

    #[error("Cancelled before completion")]
    Cancelled,

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl ClipcueError {
    /// True for failures of external collaborators, which the pipeline
    /// retries with backoff before giving up on the idea.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClipcueError::SynthesisFailure { .. } | ClipcueError::Toolkit { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ClipcueError>;
