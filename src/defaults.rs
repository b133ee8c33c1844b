//! Default tuning constants for clipcue.
//!
//! This module provides shared constants used across different configuration
//! types to ensure consistency and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 24kHz is the common output rate of modern speech synthesizers and is more
/// than enough resolution for energy-based silence analysis.
pub const SAMPLE_RATE: u32 = 24_000;

/// Default silence threshold as normalized RMS (0.0 to 1.0).
///
/// Windows quieter than this are classified as silent. 0.01 sits well below
/// typical synthesized speech levels while staying above encoder noise floors.
pub const SILENCE_THRESHOLD: f32 = 0.01;

/// Default analysis window length in milliseconds for silence scanning.
pub const SILENCE_WINDOW_MS: u32 = 20;

/// Default minimum silence duration in milliseconds.
///
/// Silent runs shorter than this are discarded as brief energy dips, not
/// genuine pauses.
pub const MIN_SILENCE_MS: u32 = 200;

/// Default hard-break threshold in milliseconds.
///
/// A silence at least this long ends the current subtitle phrase. Anything
/// shorter is a soft pause: the on-screen text persists through it.
pub const HARD_BREAK_MS: u32 = 300;

/// Default maximum number of words shown in one phrase.
pub const MAX_PHRASE_WORDS: usize = 6;

/// Default maximum on-screen duration of one phrase, in seconds.
pub const MAX_PHRASE_SECS: f64 = 3.5;

/// Lower edge of the acceptable playback-rate band for time stretching.
///
/// Within the acceptable band the pitch-preserving stretch alone lands the
/// audio on the target duration.
pub const STRETCH_ACCEPTABLE_MIN: f64 = 0.85;

/// Upper edge of the acceptable playback-rate band.
pub const STRETCH_ACCEPTABLE_MAX: f64 = 1.25;

/// Lower edge of the extended playback-rate band.
///
/// Outside the acceptable band but within the extended one, the stretch is
/// clamped to the nearest acceptable edge and the remainder is trimmed or
/// padded with silence.
pub const STRETCH_EXTENDED_MIN: f64 = 0.60;

/// Upper edge of the extended playback-rate band.
pub const STRETCH_EXTENDED_MAX: f64 = 1.60;

/// Tolerance on the reconciled audio duration, in milliseconds.
pub const DURATION_TOLERANCE_MS: u32 = 20;

/// Default number of clip pipelines running concurrently.
///
/// Kept small: the point is overlapping external synthesis and toolkit calls
/// with CPU-bound analysis, not saturating the machine.
pub const POOL_SIZE: usize = 2;

/// Default number of additional attempts for a failed external call.
pub const RETRY_ATTEMPTS: u32 = 2;

/// Default initial backoff before retrying an external call, in milliseconds.
/// Doubles on each subsequent attempt.
pub const RETRY_BACKOFF_MS: u64 = 500;

/// Name of the ffmpeg binary used by the media toolkit.
pub const FFMPEG_PROGRAM: &str = "ffmpeg";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stretch_bands_are_nested() {
        assert!(STRETCH_EXTENDED_MIN < STRETCH_ACCEPTABLE_MIN);
        assert!(STRETCH_ACCEPTABLE_MIN < 1.0);
        assert!(1.0 < STRETCH_ACCEPTABLE_MAX);
        assert!(STRETCH_ACCEPTABLE_MAX < STRETCH_EXTENDED_MAX);
    }

    #[test]
    fn hard_break_at_least_min_silence() {
        assert!(HARD_BREAK_MS >= MIN_SILENCE_MS);
    }
}
