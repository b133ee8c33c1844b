//! Phrase segmentation: merging word timings with silence structure.
//!
//! Walks the script tokens in order and groups them into display phrases.
//! A silence long enough to count as a hard break closes the current phrase;
//! shorter pauses are absorbed so the on-screen text does not flicker.
//! Independent of silence, a readability cap bounds how many words and how
//! many seconds a single phrase may hold.

use crate::defaults;
use crate::engine::silence::SilenceInterval;
use crate::engine::words::ScriptToken;

/// Highlight timing for one word inside a phrase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordHighlight {
    /// Global ordinal of the word in the script.
    pub ordinal: usize,
    /// Highlight time relative to the phrase start, seconds.
    pub offset_secs: f64,
}

/// A run of words displayed together.
#[derive(Debug, Clone, PartialEq)]
pub struct Phrase {
    pub text: String,
    pub start_secs: f64,
    pub end_secs: f64,
    pub highlights: Vec<WordHighlight>,
}

impl Phrase {
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }

    pub fn word_count(&self) -> usize {
        self.highlights.len()
    }
}

/// Configuration for phrase segmentation.
#[derive(Debug, Clone, Copy)]
pub struct PhraseSegmenterConfig {
    /// Minimum silence duration that ends a phrase, seconds.
    pub hard_break_secs: f64,
    /// Maximum words per phrase.
    pub max_words: usize,
    /// Maximum on-screen duration per phrase, seconds.
    pub max_phrase_secs: f64,
}

impl Default for PhraseSegmenterConfig {
    fn default() -> Self {
        Self {
            hard_break_secs: defaults::HARD_BREAK_MS as f64 / 1000.0,
            max_words: defaults::MAX_PHRASE_WORDS,
            max_phrase_secs: defaults::MAX_PHRASE_SECS,
        }
    }
}

/// Groups tokens into phrases using silence structure and readability caps.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhraseSegmenter {
    config: PhraseSegmenterConfig,
}

impl PhraseSegmenter {
    pub fn new(config: PhraseSegmenterConfig) -> Self {
        Self { config }
    }

    /// Segments `tokens` into ordered, non-overlapping phrases.
    ///
    /// `silences` must be sorted and non-overlapping (as produced by the
    /// silence detector). With no silences at all, segmentation degrades to
    /// readability-cap-only breaking.
    pub fn segment(&self, tokens: &[ScriptToken], silences: &[SilenceInterval]) -> Vec<Phrase> {
        let hard_breaks: Vec<&SilenceInterval> = silences
            .iter()
            .filter(|s| s.duration_secs() >= self.config.hard_break_secs)
            .collect();

        let mut phrases: Vec<Phrase> = Vec::new();
        let mut current: Vec<&ScriptToken> = Vec::new();
        let mut phrase_start = 0.0f64;
        // Earliest allowed start for the next phrase: the end of the hard
        // break that closed the previous one.
        let mut start_floor = 0.0f64;

        for token in tokens {
            if !current.is_empty() {
                let at_word_cap = current.len() >= self.config.max_words;
                let at_time_cap = token.end_secs - phrase_start > self.config.max_phrase_secs;
                if at_word_cap || at_time_cap {
                    let end = current[current.len() - 1].end_secs;
                    push_phrase(&mut phrases, &current, phrase_start, end);
                    current.clear();
                }
            }

            if current.is_empty() {
                phrase_start = token.start_secs.max(start_floor);
            }
            current.push(token);

            // A hard break starting inside this token's span, or exactly at
            // its end, closes the phrase after this token. A silence starting
            // exactly on a token boundary belongs to the earlier token.
            let closing = hard_breaks
                .iter()
                .find(|s| s.start_secs > token.start_secs && s.start_secs <= token.end_secs);
            if let Some(silence) = closing {
                let end = token.end_secs.min(silence.start_secs);
                push_phrase(&mut phrases, &current, phrase_start, end);
                current.clear();
                start_floor = silence.end_secs;
            }
        }

        if !current.is_empty() {
            let end = current[current.len() - 1].end_secs;
            push_phrase(&mut phrases, &current, phrase_start, end);
        }

        phrases
    }
}

/// Builds a phrase from its member tokens and appends it.
///
/// A span that collapsed to nothing (possible only with degenerate silence
/// input) is dropped rather than emitted as a zero-width cue.
fn push_phrase(phrases: &mut Vec<Phrase>, tokens: &[&ScriptToken], start_secs: f64, end_secs: f64) {
    if tokens.is_empty() || end_secs <= start_secs {
        return;
    }

    let text = tokens
        .iter()
        .map(|t| t.word.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let highlights = tokens
        .iter()
        .map(|t| WordHighlight {
            ordinal: t.ordinal,
            offset_secs: (t.start_secs - start_secs).max(0.0),
        })
        .collect();

    phrases.push(Phrase {
        text,
        start_secs,
        end_secs,
        highlights,
    });
}
