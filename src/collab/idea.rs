//! Clip ideas from the upstream generator.
//!
//! The generator delivers an ordered JSON manifest of clip candidates; each
//! entry is read-only input to one pipeline run.

use crate::error::{ClipcueError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One proposed short-form clip: metadata, script, and source time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipIdea {
    pub title: String,
    pub description: String,
    /// Voiceover script; also the subtitle text source.
    pub script: String,
    /// Start offset into the source video, seconds.
    pub source_start_secs: f64,
    /// End offset into the source video, seconds.
    pub source_end_secs: f64,
    /// Optional style hint forwarded to the synthesizer.
    #[serde(default)]
    pub voice_style: Option<String>,
}

impl ClipIdea {
    /// Target duration of the clip's video segment, seconds.
    pub fn target_duration_secs(&self) -> f64 {
        self.source_end_secs - self.source_start_secs
    }

    /// Validates the fields a pipeline run depends on.
    pub fn validate(&self, index: usize) -> Result<()> {
        let fail = |message: String| ClipcueError::InvalidIdea { index, message };

        if self.script.split_whitespace().next().is_none() {
            return Err(fail("script has no words".to_string()));
        }
        if !self.source_start_secs.is_finite()
            || !self.source_end_secs.is_finite()
            || self.source_start_secs < 0.0
        {
            return Err(fail(format!(
                "invalid source range {:.3}s to {:.3}s",
                self.source_start_secs, self.source_end_secs
            )));
        }
        if self.target_duration_secs() <= 0.0 {
            return Err(fail(format!(
                "source range {:.3}s to {:.3}s has no duration",
                self.source_start_secs, self.source_end_secs
            )));
        }
        Ok(())
    }
}

/// Loads an ordered idea manifest from a JSON file.
pub fn load_manifest(path: &Path) -> Result<Vec<ClipIdea>> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| ClipcueError::Other(format!(
        "failed to parse idea manifest {}: {e}",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn idea() -> ClipIdea {
        ClipIdea {
            title: "Satisfying spin".to_string(),
            description: "A quick demo".to_string(),
            script: "Give it a satisfying spin".to_string(),
            source_start_secs: 10.0,
            source_end_secs: 20.0,
            voice_style: Some("energetic".to_string()),
        }
    }

    #[test]
    fn test_target_duration() {
        assert_eq!(idea().target_duration_secs(), 10.0);
    }

    #[test]
    fn test_validate_accepts_well_formed_idea() {
        assert!(idea().validate(0).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_script() {
        let mut bad = idea();
        bad.script = "   ".to_string();
        let err = bad.validate(2).unwrap_err();
        assert!(matches!(err, ClipcueError::InvalidIdea { index: 2, .. }));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut bad = idea();
        bad.source_end_secs = 5.0;
        assert!(bad.validate(0).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_start() {
        let mut bad = idea();
        bad.source_start_secs = -1.0;
        assert!(bad.validate(0).is_err());
    }

    #[test]
    fn test_manifest_roundtrip() {
        let ideas = vec![idea()];
        let json = serde_json::to_string(&ideas).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = load_manifest(file.path()).unwrap();
        assert_eq!(loaded, ideas);
    }

    #[test]
    fn test_manifest_without_style_field() {
        let json = r#"[{
            "title": "t",
            "description": "d",
            "script": "some words",
            "source_start_secs": 0.0,
            "source_end_secs": 8.0
        }]"#;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = load_manifest(file.path()).unwrap();
        assert_eq!(loaded[0].voice_style, None);
    }

    #[test]
    fn test_manifest_rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();
        assert!(load_manifest(file.path()).is_err());
    }
}
