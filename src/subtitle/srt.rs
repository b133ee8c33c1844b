//! SubRip (SRT) rendering of a timing map.
//!
//! For players that cannot burn subtitles in; one SRT block per phrase,
//! without word-level highlighting (SRT has no timed-span markup).

use crate::engine::timing::TimingMap;
use std::fmt::Write;

/// Renders the timing map as an SRT document.
pub fn render(map: &TimingMap) -> String {
    let mut out = String::new();
    for (i, phrase) in map.cues().iter().enumerate() {
        // Infallible: writing to a String cannot fail
        let _ = writeln!(out, "{}", i + 1);
        let _ = writeln!(
            out,
            "{} --> {}",
            format_srt_time(phrase.start_secs),
            format_srt_time(phrase.end_secs)
        );
        let _ = writeln!(out, "{}", phrase.text);
        let _ = writeln!(out);
    }
    out
}

/// Formats seconds as `HH:MM:SS,mmm`.
fn format_srt_time(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_sec = total_ms / 1000;
    let s = total_sec % 60;
    let total_min = total_sec / 60;
    let m = total_min % 60;
    let h = total_min / 60;
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}
