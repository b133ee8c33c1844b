//! Per-word timing estimation over a script.
//!
//! Without a forced-alignment signal, word timings are approximated by
//! allocating track time proportionally to each word's character length.
//! The allocation always spans the full track duration: token spans are
//! contiguous, strictly ordered, and gap-free.

use crate::error::{ClipcueError, Result};

/// One script word with its estimated span.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptToken {
    pub word: String,
    pub start_secs: f64,
    pub end_secs: f64,
    /// Position of the word in the script, starting at 0.
    pub ordinal: usize,
}

/// Estimates word spans from script text and the final track duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTimeEstimator;

impl WordTimeEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Produces one token per whitespace-separated word.
    ///
    /// Boundaries are cumulative character-weight fractions of the duration,
    /// so the union of spans equals `[0, duration_secs]` exactly and the
    /// last token ends precisely at the duration. An empty script yields an
    /// empty token list.
    pub fn estimate(&self, script: &str, duration_secs: f64) -> Result<Vec<ScriptToken>> {
        let words: Vec<&str> = script.split_whitespace().collect();
        if words.is_empty() {
            return Ok(Vec::new());
        }
        if !(duration_secs > 0.0) || !duration_secs.is_finite() {
            return Err(ClipcueError::Audio {
                message: format!("cannot estimate word timings over {duration_secs}s"),
            });
        }

        let weights: Vec<u64> = words
            .iter()
            .map(|word| word.chars().count().max(1) as u64)
            .collect();
        let total: u64 = weights.iter().sum();

        let mut tokens = Vec::with_capacity(words.len());
        let mut cumulative = 0u64;
        for (ordinal, (word, weight)) in words.iter().zip(&weights).enumerate() {
            let start_secs = duration_secs * (cumulative as f64 / total as f64);
            cumulative += weight;
            let end_secs = duration_secs * (cumulative as f64 / total as f64);
            tokens.push(ScriptToken {
                word: (*word).to_string(),
                start_secs,
                end_secs,
                ordinal,
            });
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(script: &str, duration: f64) -> Vec<ScriptToken> {
        WordTimeEstimator::new().estimate(script, duration).unwrap()
    }

    #[test]
    fn test_empty_script_yields_no_tokens() {
        assert!(estimate("", 5.0).is_empty());
        assert!(estimate("   \n\t ", 5.0).is_empty());
    }

    #[test]
    fn test_single_word_spans_whole_duration() {
        let tokens = estimate("hello", 3.0);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].word, "hello");
        assert_eq!(tokens[0].start_secs, 0.0);
        assert_eq!(tokens[0].end_secs, 3.0);
        assert_eq!(tokens[0].ordinal, 0);
    }

    #[test]
    fn test_spans_are_contiguous_and_cover_duration() {
        let tokens = estimate("The quick brown fox jumps", 5.0);
        assert_eq!(tokens.len(), 5);

        assert_eq!(tokens[0].start_secs, 0.0);
        assert_eq!(tokens.last().unwrap().end_secs, 5.0);
        for pair in tokens.windows(2) {
            assert_eq!(pair[0].end_secs, pair[1].start_secs, "gap between tokens");
        }
    }

    #[test]
    fn test_ordinals_strictly_increase() {
        let tokens = estimate("a b c d", 2.0);
        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(token.ordinal, i);
        }
    }

    #[test]
    fn test_longer_words_get_more_time() {
        let tokens = estimate("to extraordinary", 4.0);
        let short = tokens[0].end_secs - tokens[0].start_secs;
        let long = tokens[1].end_secs - tokens[1].start_secs;
        assert!(long > short * 5.0);
        // 2 and 13 characters → 2/15 and 13/15 of 4s
        assert!((short - 4.0 * 2.0 / 15.0).abs() < 1e-9);
        assert!((long - 4.0 * 13.0 / 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_known_fractions_for_sample_script() {
        // Weights 3,5,5,3,5 of 21 over 5 seconds
        let tokens = estimate("The quick brown fox jumps", 5.0);
        assert!((tokens[2].start_secs - 5.0 * 8.0 / 21.0).abs() < 1e-9);
        assert!((tokens[2].end_secs - 5.0 * 13.0 / 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_multibyte_words_counted_by_chars() {
        // "größer" is 6 characters despite 8 bytes
        let tokens = estimate("größer ok", 4.0);
        let first = tokens[0].end_secs - tokens[0].start_secs;
        assert!((first - 4.0 * 6.0 / 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_every_span_is_positive() {
        let tokens = estimate("a bb ccc dddd eeeee", 1.0);
        for token in tokens {
            assert!(token.end_secs > token.start_secs);
        }
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        let estimator = WordTimeEstimator::new();
        assert!(estimator.estimate("words here", 0.0).is_err());
        assert!(estimator.estimate("words here", -2.0).is_err());
        assert!(estimator.estimate("words here", f64::NAN).is_err());
    }
}
