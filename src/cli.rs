//! Command-line interface for clipcue
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Subtitle timing and voiceover synchronization for short-form clips
#[derive(Parser, Debug)]
#[command(name = "clipcue", version, about)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: progress events, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Output format for generated cue lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CueFormat {
    Json,
    Srt,
    Ass,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a batch of clip ideas against a source video
    Run {
        /// Source video file
        #[arg(long, value_name = "PATH")]
        source: PathBuf,

        /// Idea manifest (JSON) from the upstream generator
        #[arg(long, value_name = "PATH")]
        ideas: PathBuf,

        /// Output directory for rendered clips and metadata
        #[arg(long, short, value_name = "DIR", default_value = "clips")]
        out: PathBuf,

        /// Concurrent pipelines (overrides config)
        #[arg(long, value_name = "N")]
        pool: Option<usize>,
    },

    /// Build a cue list for an existing voiceover track and script
    Cues {
        /// Voiceover WAV file
        #[arg(long, value_name = "PATH")]
        audio: PathBuf,

        /// Script text file matching the voiceover
        #[arg(long, value_name = "PATH")]
        script: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = CueFormat::Json)]
        format: CueFormat,
    },

    /// Print the silence intervals of a WAV file
    Silence {
        /// WAV file to analyze
        #[arg(long, value_name = "PATH")]
        audio: PathBuf,

        /// RMS threshold override (0.0 to 1.0)
        #[arg(long, value_name = "LEVEL")]
        threshold: Option<f32>,

        /// Minimum silence duration override (e.g. "200ms", "1s")
        #[arg(long, value_name = "DURATION", value_parser = parse_duration_ms)]
        min_silence: Option<u32>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse a duration string into milliseconds.
///
/// Supports any format accepted by `humantime`: bare numbers (milliseconds),
/// single-unit (`200ms`, `2s`), and compound (`1s500ms`).
fn parse_duration_ms(s: &str) -> Result<u32, String> {
    let s = s.trim();
    // Bare number → milliseconds
    if let Ok(ms) = s.parse::<u32>() {
        return Ok(ms);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_millis() as u32)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run_command() {
        let cli = Cli::try_parse_from([
            "clipcue", "run", "--source", "video.mp4", "--ideas", "ideas.json", "--out", "output",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                source,
                ideas,
                out,
                pool,
            } => {
                assert_eq!(source, PathBuf::from("video.mp4"));
                assert_eq!(ideas, PathBuf::from("ideas.json"));
                assert_eq!(out, PathBuf::from("output"));
                assert_eq!(pool, None);
            }
            other => panic!("expected run command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_cues_with_format() {
        let cli = Cli::try_parse_from([
            "clipcue", "cues", "--audio", "vo.wav", "--script", "script.txt", "--format", "srt",
        ])
        .unwrap();

        match cli.command {
            Commands::Cues { format, .. } => assert_eq!(format, CueFormat::Srt),
            other => panic!("expected cues command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let cli =
            Cli::try_parse_from(["clipcue", "-q", "-vv", "silence", "--audio", "vo.wav"]).unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_duration_ms() {
        assert_eq!(parse_duration_ms("250"), Ok(250));
        assert_eq!(parse_duration_ms("250ms"), Ok(250));
        assert_eq!(parse_duration_ms("2s"), Ok(2000));
        assert_eq!(parse_duration_ms("1s 500ms"), Ok(1500));
        assert!(parse_duration_ms("not a duration").is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["clipcue"]).is_err());
    }
}
