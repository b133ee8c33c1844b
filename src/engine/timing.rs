//! Timing map assembly and invariant checking.
//!
//! The timing map is the terminal artifact of the engine: the ordered,
//! non-overlapping cue sequence that drives subtitle burn-in and word
//! highlighting. The builder clamps the outermost cue edges to the track and
//! verifies every invariant; a violation here means an upstream logic defect
//! and is surfaced, never silently corrected.

use crate::defaults;
use crate::engine::phrases::Phrase;
use crate::error::{ClipcueError, Result};

/// Ordered, validated sequence of subtitle cues for one track.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingMap {
    cues: Vec<Phrase>,
    duration_secs: f64,
}

impl TimingMap {
    pub fn cues(&self) -> &[Phrase] {
        &self.cues
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }
}

/// Composes phrases and the final track duration into a [`TimingMap`].
#[derive(Debug, Clone, Copy)]
pub struct TimingMapBuilder {
    /// Permitted overshoot of the map span past the track duration, seconds.
    pub tolerance_secs: f64,
}

impl Default for TimingMapBuilder {
    fn default() -> Self {
        Self {
            tolerance_secs: defaults::DURATION_TOLERANCE_MS as f64 / 1000.0,
        }
    }
}

impl TimingMapBuilder {
    pub fn new(tolerance_secs: f64) -> Self {
        Self { tolerance_secs }
    }

    /// Builds and validates the timing map.
    ///
    /// The first phrase's start is clamped up to 0 and the last phrase's end
    /// down to the track duration; everything else must already satisfy the
    /// invariants. Gaps between phrases are legal and mean "no subtitle
    /// shown".
    pub fn build(&self, mut phrases: Vec<Phrase>, duration_secs: f64) -> Result<TimingMap> {
        if !(duration_secs > 0.0) || !duration_secs.is_finite() {
            return Err(ClipcueError::InvalidTimingMap {
                detail: format!("track duration {duration_secs}s is not positive"),
            });
        }

        if let Some(first) = phrases.first_mut()
            && first.start_secs < 0.0
        {
            first.start_secs = 0.0;
        }
        if let Some(last) = phrases.last_mut()
            && last.end_secs > duration_secs
        {
            last.end_secs = duration_secs;
        }

        self.validate(&phrases, duration_secs)?;

        Ok(TimingMap {
            cues: phrases,
            duration_secs,
        })
    }

    fn validate(&self, phrases: &[Phrase], duration_secs: f64) -> Result<()> {
        let limit = duration_secs + self.tolerance_secs;

        for (i, phrase) in phrases.iter().enumerate() {
            if !phrase.end_secs.is_finite() || !phrase.start_secs.is_finite() {
                return Err(invalid(format!("cue {i} has a non-finite boundary")));
            }
            if phrase.end_secs <= phrase.start_secs {
                return Err(invalid(format!(
                    "cue {i} spans {:.3}s to {:.3}s (end must exceed start)",
                    phrase.start_secs, phrase.end_secs
                )));
            }
            if phrase.start_secs < 0.0 || phrase.end_secs > limit {
                return Err(invalid(format!(
                    "cue {i} spans {:.3}s to {:.3}s, outside the track's 0s to {:.3}s",
                    phrase.start_secs, phrase.end_secs, duration_secs
                )));
            }
            if phrase.text.trim().is_empty() {
                return Err(invalid(format!("cue {i} has no visible text")));
            }
            if phrase.highlights.is_empty() {
                return Err(invalid(format!("cue {i} carries no word highlights")));
            }

            let span = phrase.end_secs - phrase.start_secs;
            for highlight in &phrase.highlights {
                if highlight.offset_secs < 0.0 || highlight.offset_secs > span {
                    return Err(invalid(format!(
                        "cue {i} highlight for word {} at {:.3}s is outside the cue span",
                        highlight.ordinal, highlight.offset_secs
                    )));
                }
            }
            for pair in phrase.highlights.windows(2) {
                if pair[1].ordinal <= pair[0].ordinal {
                    return Err(invalid(format!("cue {i} highlight ordinals out of order")));
                }
            }

            if i > 0 && phrase.start_secs < phrases[i - 1].end_secs {
                return Err(invalid(format!("cue {i} overlaps cue {}", i - 1)));
            }
        }

        Ok(())
    }
}

fn invalid(detail: String) -> ClipcueError {
    ClipcueError::InvalidTimingMap { detail }
}
