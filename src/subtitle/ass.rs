//! Advanced SubStation (ASS) rendering of a timing map.
//!
//! Produces the script consumed by the toolkit's burn-in step. Two layers
//! per phrase: the base layer shows the full phrase in white for its whole
//! span; the highlight layer redraws the line once per word with the word
//! being spoken recolored, giving karaoke-style word tracking.

use crate::engine::timing::TimingMap;
use std::fmt::Write;

const PLAY_RES_X: u32 = 1080;
const PLAY_RES_Y: u32 = 1920;

/// Primary text color override for the word being spoken (BGR hex).
const HIGHLIGHT_COLOR: &str = "&H00FFFF&";
/// Base text color restored after the highlighted word (BGR hex).
const BASE_COLOR: &str = "&HFFFFFF&";

/// Renders the timing map as an ASS document.
pub fn render(map: &TimingMap) -> String {
    let mut out = String::new();

    // Infallible: writing to a String cannot fail
    let _ = writeln!(out, "[Script Info]");
    let _ = writeln!(out, "ScriptType: v4.00+");
    let _ = writeln!(out, "PlayResX: {PLAY_RES_X}");
    let _ = writeln!(out, "PlayResY: {PLAY_RES_Y}");
    let _ = writeln!(out);
    let _ = writeln!(out, "[V4+ Styles]");
    let _ = writeln!(
        out,
        "Style: White,Arial Black,90,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,\
         -1,0,0,0,100,100,2,0,1,6,2,5,50,50,200,1"
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "[Events]");
    let _ = writeln!(
        out,
        "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"
    );

    for phrase in map.cues() {
        let words: Vec<String> = phrase
            .text
            .split_whitespace()
            .map(str::to_uppercase)
            .collect();

        let _ = writeln!(
            out,
            "Dialogue: 0,{},{},White,,0,0,0,,{}",
            format_ass_time(phrase.start_secs),
            format_ass_time(phrase.end_secs),
            words.join(" ")
        );

        for (i, highlight) in phrase.highlights.iter().enumerate() {
            let word_start = phrase.start_secs + highlight.offset_secs;
            let word_end = phrase
                .highlights
                .get(i + 1)
                .map(|next| phrase.start_secs + next.offset_secs)
                .unwrap_or(phrase.end_secs);

            let line: Vec<String> = words
                .iter()
                .enumerate()
                .map(|(j, word)| {
                    if j == i {
                        format!("{{\\c{HIGHLIGHT_COLOR}}}{word}{{\\c{BASE_COLOR}}}")
                    } else {
                        word.clone()
                    }
                })
                .collect();

            let _ = writeln!(
                out,
                "Dialogue: 1,{},{},White,,0,0,0,,{}",
                format_ass_time(word_start),
                format_ass_time(word_end),
                line.join(" ")
            );
        }
    }

    out
}

/// Formats seconds as `H:MM:SS.CC` (centisecond resolution).
fn format_ass_time(seconds: f64) -> String {
    let total_cs = (seconds.max(0.0) * 100.0).round() as u64;
    let cs = total_cs % 100;
    let total_sec = total_cs / 100;
    let s = total_sec % 60;
    let total_min = total_sec / 60;
    let m = total_min % 60;
    let h = total_min / 60;
    format!("{}:{:02}:{:02}.{:02}", h, m, s, cs)
}
