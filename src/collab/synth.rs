//! Speech synthesis collaborator.
//!
//! The engine never synthesizes speech itself; it hands the script to an
//! external synthesizer and receives a raw audio track back. The trait
//! allows swapping implementations (subprocess-backed vs mock).

use crate::audio::{AudioTrack, wav};
use crate::defaults;
use crate::error::{ClipcueError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::io::AsyncWriteExt;

/// Placeholder in synthesizer command arguments replaced by the style hint.
const STYLE_PLACEHOLDER: &str = "{style}";

/// Trait for text-to-speech synthesis.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizes the script into a raw audio track.
    ///
    /// # Arguments
    /// * `script` - The text to speak
    /// * `style` - Optional delivery hint (tone, pacing)
    async fn synthesize(&self, script: &str, style: Option<&str>) -> Result<AudioTrack>;

    /// Human-readable name of the backend, for diagnostics.
    fn name(&self) -> &str;
}

/// Synthesizer backed by an external command.
///
/// The command receives the script on stdin and must write a 16-bit PCM WAV
/// stream to stdout. A `{style}` placeholder in any argument is replaced by
/// the idea's style hint (or removed when no hint is given).
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn resolved_args(&self, style: Option<&str>) -> Vec<String> {
        self.args
            .iter()
            .filter_map(|arg| {
                if arg.contains(STYLE_PLACEHOLDER) {
                    style.map(|s| arg.replace(STYLE_PLACEHOLDER, s))
                } else {
                    Some(arg.clone())
                }
            })
            .collect()
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    async fn synthesize(&self, script: &str, style: Option<&str>) -> Result<AudioTrack> {
        let mut child = tokio::process::Command::new(&self.program)
            .args(self.resolved_args(style))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ClipcueError::SynthesisFailure {
                message: format!("failed to spawn {}: {e}", self.program),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(script.as_bytes()).await.map_err(|e| {
                ClipcueError::SynthesisFailure {
                    message: format!("failed to send script to {}: {e}", self.program),
                }
            })?;
            // Close stdin so the synthesizer sees end-of-input
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ClipcueError::SynthesisFailure {
                message: format!("{} did not finish: {e}", self.program),
            })?;

        if !output.status.success() {
            return Err(ClipcueError::SynthesisFailure {
                message: format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        if output.stdout.is_empty() {
            return Err(ClipcueError::SynthesisFailure {
                message: format!("{} produced no audio data", self.program),
            });
        }

        wav::read_track_bytes(&output.stdout).map_err(|e| ClipcueError::SynthesisFailure {
            message: format!("{} produced invalid WAV output: {e}", self.program),
        })
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Mock synthesizer for testing.
///
/// Produces a constant-amplitude mono tone whose duration is looked up per
/// script (falling back to a default), and can be configured to fail its
/// first N calls to exercise retry paths.
pub struct MockSynthesizer {
    sample_rate: u32,
    default_secs: f64,
    per_script_secs: HashMap<String, f64>,
    failures_remaining: AtomicU32,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            default_secs: 5.0,
            per_script_secs: HashMap::new(),
            failures_remaining: AtomicU32::new(0),
        }
    }

    /// Sets the duration produced for any script without an explicit entry.
    pub fn with_default_duration(mut self, secs: f64) -> Self {
        self.default_secs = secs;
        self
    }

    /// Sets the duration produced for one specific script.
    pub fn with_script_duration(mut self, script: &str, secs: f64) -> Self {
        self.per_script_secs.insert(script.to_string(), secs);
        self
    }

    /// Makes the first `count` calls fail with `SynthesisFailure`.
    pub fn with_failures(self, count: u32) -> Self {
        self.failures_remaining.store(count, Ordering::SeqCst);
        self
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, script: &str, _style: Option<&str>) -> Result<AudioTrack> {
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0
            && self
                .failures_remaining
                .compare_exchange(remaining, remaining - 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        {
            return Err(ClipcueError::SynthesisFailure {
                message: "mock synthesis failure".to_string(),
            });
        }

        let secs = self
            .per_script_secs
            .get(script)
            .copied()
            .unwrap_or(self.default_secs);
        let frames = (secs * self.sample_rate as f64).round() as usize;
        AudioTrack::new(vec![6000i16; frames], self.sample_rate, 1)
    }

    fn name(&self) -> &str {
        "mock-synthesizer"
    }
}
