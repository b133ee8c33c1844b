//! Sidecar metadata delivery.
//!
//! Alongside the rendered clips, the batch delivers an ordered text file of
//! titles and descriptions for publishing.

use crate::error::Result;
use serde::Serialize;
use std::path::Path;

/// Characters that are illegal or unsafe in artifact filenames.
const ILLEGAL_FILENAME_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Title/description pair for one successfully produced clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidecarEntry {
    pub title: String,
    pub description: String,
}

/// Strips illegal characters so a title can name a file.
///
/// Falls back to `"clip"` when nothing printable remains.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c))
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "clip".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Writes the ordered sidecar file: one block per clip.
pub fn write_sidecar(path: &Path, entries: &[SidecarEntry]) -> Result<()> {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&format!("Clip {}: {}\n", i + 1, entry.title));
        out.push_str(&entry.description);
        out.push_str("\n\n");
    }
    std::fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_illegal_characters() {
        assert_eq!(
            sanitize_filename("What? A *great* clip: part 1/2"),
            "What A great clip part 12"
        );
    }

    #[test]
    fn test_sanitize_keeps_plain_titles() {
        assert_eq!(sanitize_filename("Satisfying spin"), "Satisfying spin");
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_filename(""), "clip");
        assert_eq!(sanitize_filename("???"), "clip");
        assert_eq!(sanitize_filename("  "), "clip");
    }

    #[test]
    fn test_write_sidecar_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("descriptions.txt");
        let entries = vec![
            SidecarEntry {
                title: "First clip".to_string(),
                description: "An opener.".to_string(),
            },
            SidecarEntry {
                title: "Second clip".to_string(),
                description: "A follow-up.".to_string(),
            },
        ];

        write_sidecar(&path, &entries).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "Clip 1: First clip\nAn opener.\n\nClip 2: Second clip\nA follow-up.\n\n"
        );
    }

    #[test]
    fn test_write_sidecar_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("descriptions.txt");
        write_sidecar(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
