//! Configuration for clipcue.
//!
//! An explicit record passed into each pipeline run, never ambient process
//! state, so runs stay deterministic, parallel, and testable.

use crate::defaults;
use crate::engine::phrases::PhraseSegmenterConfig;
use crate::engine::reconcile::ReconcilerConfig;
use crate::engine::silence::SilenceDetectorConfig;
use crate::error::{ClipcueError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub silence: SilenceConfig,
    pub reconcile: ReconcileConfig,
    pub segmenter: SegmenterConfig,
    pub batch: BatchConfig,
    pub synth: SynthConfig,
    pub toolkit: ToolkitConfig,
}

/// Silence detection parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SilenceConfig {
    pub threshold: f32,
    pub window_ms: u32,
    pub min_silence_ms: u32,
}

/// Duration reconciliation bands and tolerance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReconcileConfig {
    pub acceptable_min: f64,
    pub acceptable_max: f64,
    pub extended_min: f64,
    pub extended_max: f64,
    pub tolerance_ms: u32,
}

/// Phrase segmentation thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmenterConfig {
    pub hard_break_ms: u32,
    pub max_words: usize,
    pub max_phrase_secs: f64,
}

/// Batch scheduling and retry policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BatchConfig {
    /// Concurrent clip pipelines.
    pub pool_size: usize,
    /// Additional attempts for a failed external call.
    pub retry_attempts: u32,
    /// Initial retry backoff in milliseconds; doubles per attempt.
    pub retry_backoff_ms: u64,
}

/// Speech synthesizer command configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SynthConfig {
    /// External command producing WAV on stdout from script text on stdin.
    pub command: Option<String>,
    /// Arguments for the command; `{style}` expands to the idea's style hint.
    pub args: Vec<String>,
}

/// Media toolkit configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolkitConfig {
    pub ffmpeg_path: String,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            threshold: defaults::SILENCE_THRESHOLD,
            window_ms: defaults::SILENCE_WINDOW_MS,
            min_silence_ms: defaults::MIN_SILENCE_MS,
        }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            acceptable_min: defaults::STRETCH_ACCEPTABLE_MIN,
            acceptable_max: defaults::STRETCH_ACCEPTABLE_MAX,
            extended_min: defaults::STRETCH_EXTENDED_MIN,
            extended_max: defaults::STRETCH_EXTENDED_MAX,
            tolerance_ms: defaults::DURATION_TOLERANCE_MS,
        }
    }
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            hard_break_ms: defaults::HARD_BREAK_MS,
            max_words: defaults::MAX_PHRASE_WORDS,
            max_phrase_secs: defaults::MAX_PHRASE_SECS,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            pool_size: defaults::POOL_SIZE,
            retry_attempts: defaults::RETRY_ATTEMPTS,
            retry_backoff_ms: defaults::RETRY_BACKOFF_MS,
        }
    }
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: defaults::FFMPEG_PROGRAM.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ClipcueError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                e.into()
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file, or defaults if the file is missing.
    ///
    /// Only a missing file yields defaults; invalid TOML is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config: Config = toml::from_str(&contents)?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - CLIPCUE_FFMPEG → toolkit.ffmpeg_path
    /// - CLIPCUE_TTS_COMMAND → synth.command
    /// - CLIPCUE_POOL_SIZE → batch.pool_size
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(ffmpeg) = std::env::var("CLIPCUE_FFMPEG")
            && !ffmpeg.is_empty()
        {
            self.toolkit.ffmpeg_path = ffmpeg;
        }

        if let Ok(command) = std::env::var("CLIPCUE_TTS_COMMAND")
            && !command.is_empty()
        {
            self.synth.command = Some(command);
        }

        if let Ok(pool) = std::env::var("CLIPCUE_POOL_SIZE")
            && let Ok(size) = pool.parse::<usize>()
            && size > 0
        {
            self.batch.pool_size = size;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/clipcue/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("clipcue").join("config.toml"))
    }

    /// Rejects values no pipeline run could work with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, message: &str| {
            Err(ClipcueError::ConfigInvalidValue {
                key: key.to_string(),
                message: message.to_string(),
            })
        };

        if !(self.silence.threshold > 0.0) || self.silence.threshold >= 1.0 {
            return invalid("silence.threshold", "must be between 0 and 1");
        }
        if self.silence.window_ms == 0 {
            return invalid("silence.window_ms", "must be positive");
        }
        if self.batch.pool_size == 0 {
            return invalid("batch.pool_size", "must be positive");
        }
        if self.segmenter.max_words == 0 {
            return invalid("segmenter.max_words", "must be positive");
        }
        if !(self.segmenter.max_phrase_secs > 0.0) {
            return invalid("segmenter.max_phrase_secs", "must be positive");
        }
        if !(self.reconcile.extended_min <= self.reconcile.acceptable_min
            && self.reconcile.acceptable_min < self.reconcile.acceptable_max
            && self.reconcile.acceptable_max <= self.reconcile.extended_max)
        {
            return invalid(
                "reconcile",
                "bands must nest: extended_min <= acceptable_min < acceptable_max <= extended_max",
            );
        }
        Ok(())
    }

    pub fn silence_detector(&self) -> SilenceDetectorConfig {
        SilenceDetectorConfig {
            threshold: self.silence.threshold,
            window_ms: self.silence.window_ms,
            min_silence_ms: self.silence.min_silence_ms,
        }
    }

    pub fn reconciler(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            acceptable_min: self.reconcile.acceptable_min,
            acceptable_max: self.reconcile.acceptable_max,
            extended_min: self.reconcile.extended_min,
            extended_max: self.reconcile.extended_max,
            tolerance_secs: self.reconcile.tolerance_ms as f64 / 1000.0,
        }
    }

    pub fn phrase_segmenter(&self) -> PhraseSegmenterConfig {
        PhraseSegmenterConfig {
            hard_break_secs: self.segmenter.hard_break_ms as f64 / 1000.0,
            max_words: self.segmenter.max_words,
            max_phrase_secs: self.segmenter.max_phrase_secs,
        }
    }
}
