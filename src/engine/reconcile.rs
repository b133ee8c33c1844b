//! Duration reconciliation between voiceover audio and its video segment.
//!
//! A synthesized track almost never matches the segment length exactly. The
//! reconciler computes the playback-rate factor that would, applies a banded
//! policy (stretch, or clamp-and-trim/pad), and delegates the actual
//! pitch-preserving stretch to the media toolkit.

use crate::audio::AudioTrack;
use crate::collab::toolkit::MediaToolkit;
use crate::defaults;
use crate::error::{ClipcueError, Result};
use std::path::Path;

/// Configuration for duration reconciliation.
#[derive(Debug, Clone, Copy)]
pub struct ReconcilerConfig {
    /// Stretch factors inside this band are applied as-is.
    pub acceptable_min: f64,
    pub acceptable_max: f64,
    /// Factors outside the acceptable band but inside this one are clamped
    /// to the nearest acceptable edge; the remainder is trimmed or padded.
    pub extended_min: f64,
    pub extended_max: f64,
    /// Permitted deviation of the output duration from the target, seconds.
    pub tolerance_secs: f64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            acceptable_min: defaults::STRETCH_ACCEPTABLE_MIN,
            acceptable_max: defaults::STRETCH_ACCEPTABLE_MAX,
            extended_min: defaults::STRETCH_EXTENDED_MIN,
            extended_max: defaults::STRETCH_EXTENDED_MAX,
            tolerance_secs: defaults::DURATION_TOLERANCE_MS as f64 / 1000.0,
        }
    }
}

/// How a given raw/target duration pair will be reconciled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StretchPlan {
    /// Factor within the acceptable band; stretch alone reaches the target.
    Stretch { factor: f64 },
    /// Factor clamped to an acceptable edge; the stretched track is then
    /// trimmed or padded symmetrically to hit the target exactly.
    Clamped { factor: f64, clamped: f64 },
}

impl StretchPlan {
    /// The factor actually sent to the toolkit.
    pub fn effective_factor(&self) -> f64 {
        match *self {
            StretchPlan::Stretch { factor } => factor,
            StretchPlan::Clamped { clamped, .. } => clamped,
        }
    }
}

/// Computes and applies the playback-rate adjustment for one track.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationReconciler {
    config: ReconcilerConfig,
}

impl DurationReconciler {
    pub fn new(config: ReconcilerConfig) -> Self {
        Self { config }
    }

    /// Decides how to reconcile a raw duration against a target.
    ///
    /// Pure policy, no audio touched. Fails with `DurationUnreconcilable`
    /// when the factor falls outside the extended band.
    pub fn plan(&self, raw_secs: f64, target_secs: f64) -> Result<StretchPlan> {
        if !(raw_secs > 0.0) || !(target_secs > 0.0) {
            return Err(ClipcueError::Audio {
                message: format!(
                    "durations must be positive (raw {raw_secs:.3}s, target {target_secs:.3}s)"
                ),
            });
        }

        let factor = raw_secs / target_secs;
        let c = &self.config;

        if factor >= c.acceptable_min && factor <= c.acceptable_max {
            Ok(StretchPlan::Stretch { factor })
        } else if factor >= c.extended_min && factor <= c.extended_max {
            let clamped = factor.clamp(c.acceptable_min, c.acceptable_max);
            Ok(StretchPlan::Clamped { factor, clamped })
        } else {
            Err(ClipcueError::DurationUnreconcilable { factor })
        }
    }

    /// Fits `track` into the target duration.
    ///
    /// Requests the pitch-preserving stretch from the toolkit, then trims or
    /// pads the remainder symmetrically so the output lands within tolerance
    /// of the target (exactly on the nearest frame).
    pub async fn reconcile(
        &self,
        track: AudioTrack,
        target_secs: f64,
        toolkit: &dyn MediaToolkit,
        scratch: &Path,
    ) -> Result<AudioTrack> {
        let plan = self.plan(track.duration_secs(), target_secs)?;

        let stretched = toolkit
            .stretch(&track, plan.effective_factor(), scratch)
            .await?;

        let target_frames = (target_secs * stretched.sample_rate() as f64).round() as usize;
        let fitted = if stretched.frames() == target_frames {
            stretched
        } else {
            stretched.fit_to_frames(target_frames)?
        };

        debug_assert!((fitted.duration_secs() - target_secs).abs() <= self.config.tolerance_secs);
        Ok(fitted)
    }
}
