//! Global render settings the quality controller is allowed to move, and the
//! one-way interface to the pipeline that applies them.

use orrery_lod::PerformanceMode;
use serde::{Deserialize, Serialize};

/// Tolerance for float settings sitting on a floor or ceiling.
const EPSILON: f32 = 1e-4;

/// Named preset, or `Custom` once anything was changed by hand or automatically.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityProfile {
    Low,
    Medium,
    #[default]
    High,
    Ultra,
    Custom,
}

/// Renderer-wide quality knobs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualitySettings {
    /// Output resolution relative to the window (1.0 = native).
    pub resolution_scale: f32,
    pub shadows: bool,
    pub antialiasing: bool,
    pub post_processing: bool,
    /// Fraction of particles and small visual details spawned (0.0 - 1.0).
    pub particle_density: f32,
    pub profile: QualityProfile,
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self::preset(QualityProfile::High)
    }
}

impl QualitySettings {
    /// Settings for a named preset. `Custom` yields the `High` values tagged custom.
    pub fn preset(profile: QualityProfile) -> Self {
        let (resolution_scale, shadows, antialiasing, post_processing, particle_density) =
            match profile {
                QualityProfile::Low => (0.5, false, false, false, 0.25),
                QualityProfile::Medium => (0.75, false, true, false, 0.5),
                QualityProfile::High | QualityProfile::Custom => (1.0, true, true, true, 0.75),
                QualityProfile::Ultra => (1.0, true, true, true, 1.0),
            };
        Self {
            resolution_scale,
            shadows,
            antialiasing,
            post_processing,
            particle_density,
            profile,
        }
    }

    /// Step down the most expensive setting that can still go down.
    ///
    /// Order: resolution scale, then shadows, then particle density. Returns
    /// `None` once all three sit on their floors.
    pub fn reduce(&mut self, tuning: &QualityTuning) -> Option<SettingsChange> {
        let mut change = SettingsChange::default();

        if self.resolution_scale > tuning.resolution_min + EPSILON {
            let next = (self.resolution_scale - tuning.resolution_step).max(tuning.resolution_min);
            change.resolution_scale_delta = next - self.resolution_scale;
            self.resolution_scale = next;
        } else if self.shadows {
            self.shadows = false;
            change.shadows = Some(false);
        } else if self.particle_density > tuning.particle_min + EPSILON {
            let next = (self.particle_density - tuning.particle_step).max(tuning.particle_min);
            change.particle_density_delta = next - self.particle_density;
            self.particle_density = next;
        } else {
            return None;
        }

        self.profile = QualityProfile::Custom;
        Some(change)
    }

    /// Step one setting back up.
    ///
    /// Shadows come back first since they restore the most fidelity for their
    /// cost, then resolution, then particle density.
    pub fn increase(&mut self, tuning: &QualityTuning) -> Option<SettingsChange> {
        let mut change = SettingsChange::default();

        if !self.shadows {
            self.shadows = true;
            change.shadows = Some(true);
        } else if self.resolution_scale < tuning.resolution_max - EPSILON {
            let next = (self.resolution_scale + tuning.resolution_step).min(tuning.resolution_max);
            change.resolution_scale_delta = next - self.resolution_scale;
            self.resolution_scale = next;
        } else if self.particle_density < tuning.particle_max - EPSILON {
            let next = (self.particle_density + tuning.particle_step).min(tuning.particle_max);
            change.particle_density_delta = next - self.particle_density;
            self.particle_density = next;
        } else {
            return None;
        }

        self.profile = QualityProfile::Custom;
        Some(change)
    }
}

/// Tuning constants for automatic quality control.
///
/// These are empirically chosen defaults, not derived limits.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityTuning {
    /// Frame rate the controller steers toward.
    pub target_fps: f64,
    /// Half-width of the dead band as a fraction of `target_fps`.
    pub band: f64,
    /// Controller ticks to wait after an adjustment.
    pub cooldown_ticks: u32,
    pub resolution_step: f32,
    pub resolution_min: f32,
    pub resolution_max: f32,
    pub particle_step: f32,
    pub particle_min: f32,
    pub particle_max: f32,
}

impl Default for QualityTuning {
    fn default() -> Self {
        Self {
            target_fps: 30.0,
            band: 0.2,
            cooldown_ticks: 300,
            resolution_step: 0.25,
            resolution_min: 0.5,
            resolution_max: 1.0,
            particle_step: 0.25,
            particle_min: 0.25,
            particle_max: 1.0,
        }
    }
}

impl QualityTuning {
    /// Below this the controller reduces quality.
    pub fn lower_bound(&self) -> f64 {
        self.target_fps * (1.0 - self.band)
    }

    /// Above this the controller raises quality.
    pub fn upper_bound(&self) -> f64 {
        self.target_fps * (1.0 + self.band)
    }
}

/// A single settings adjustment, expressed as deltas and toggles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SettingsChange {
    pub resolution_scale_delta: f32,
    /// `Some` when shadows were switched.
    pub shadows: Option<bool>,
    pub particle_density_delta: f32,
    /// `Some` when the LOD performance mode moved alongside.
    pub performance_mode: Option<PerformanceMode>,
}

impl SettingsChange {
    pub fn is_empty(&self) -> bool {
        self.resolution_scale_delta == 0.0
            && self.shadows.is_none()
            && self.particle_density_delta == 0.0
            && self.performance_mode.is_none()
    }
}

/// The settings pipeline: applies changes to the renderer. Never calls back.
pub trait SettingsSink {
    fn apply(&mut self, change: &SettingsChange);
}

impl SettingsSink for Vec<SettingsChange> {
    fn apply(&mut self, change: &SettingsChange) {
        self.push(*change);
    }
}
