//! Serialized cue list for downstream consumers.

use crate::engine::timing::TimingMap;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One serialized subtitle cue.
///
/// `highlighted_word_index` is the global script ordinal of the word being
/// spoken when the cue appears (the cue's first word); the offsets list gives
/// every member word's highlight time relative to the cue start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
    pub highlighted_word_index: usize,
    pub word_highlight_offsets_ms: Vec<u64>,
}

/// Converts a timing map into its ordered cue list.
pub fn cues(map: &TimingMap) -> Vec<Cue> {
    map.cues()
        .iter()
        .map(|phrase| Cue {
            start_ms: to_ms(phrase.start_secs),
            end_ms: to_ms(phrase.end_secs),
            text: phrase.text.clone(),
            highlighted_word_index: phrase.highlights.first().map(|h| h.ordinal).unwrap_or(0),
            word_highlight_offsets_ms: phrase
                .highlights
                .iter()
                .map(|h| to_ms(h.offset_secs))
                .collect(),
        })
        .collect()
}

/// Renders the cue list as pretty-printed JSON.
pub fn to_json(map: &TimingMap) -> Result<String> {
    let cue_list = cues(map);
    serde_json::to_string_pretty(&cue_list)
        .map_err(|e| crate::error::ClipcueError::Other(format!("cue serialization failed: {e}")))
}

fn to_ms(secs: f64) -> u64 {
    (secs * 1000.0).round() as u64
}
