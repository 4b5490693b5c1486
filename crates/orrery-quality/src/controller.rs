//! Slow feedback loop from measured frame rate to global quality settings.
//!
//! Each tick the controller compares the monitor's frame rate against
//! `target_fps ± band`. Leaving the band steps one setting down (or up) and
//! starts a cooldown, so a correction has time to show up in the measurement
//! before the next one is considered.

use std::hash::Hash;

use orrery_lod::LodManager;
use serde::Serialize;
use tracing::{debug, info};

use crate::monitor::PerformanceMonitor;
use crate::settings::{QualitySettings, QualityTuning, SettingsChange, SettingsSink};

/// What one controller tick did.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum QualityAction {
    Disabled,
    CoolingDown { remaining: u32 },
    /// The monitor had no measurement yet.
    NoData,
    WithinBand,
    Reduced(SettingsChange),
    Increased(SettingsChange),
    /// Out of band, but nothing was left to move in that direction.
    Exhausted,
}

impl QualityAction {
    /// Returns `true` if settings were changed.
    pub fn is_adjustment(&self) -> bool {
        matches!(self, QualityAction::Reduced(_) | QualityAction::Increased(_))
    }
}

/// Dynamic quality controller.
#[derive(Clone, Debug)]
pub struct DynamicQualityController {
    enabled: bool,
    cooldown_remaining: u32,
    tuning: QualityTuning,
    settings: QualitySettings,
    adjustments: u64,
}

impl DynamicQualityController {
    pub fn new(settings: QualitySettings, tuning: QualityTuning, enabled: bool) -> Self {
        Self {
            enabled,
            cooldown_remaining: 0,
            tuning,
            settings,
            adjustments: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn automatic adjustment on or off. Disabling clears any cooldown.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled != self.enabled {
            info!(enabled, "dynamic quality toggled");
        }
        self.enabled = enabled;
        if !enabled {
            self.cooldown_remaining = 0;
        }
    }

    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown_remaining
    }

    /// Current view of the global settings.
    pub fn settings(&self) -> &QualitySettings {
        &self.settings
    }

    /// Replace the settings, e.g. after the user picked a preset.
    pub fn set_settings(&mut self, settings: QualitySettings) {
        self.settings = settings;
    }

    pub fn tuning(&self) -> &QualityTuning {
        &self.tuning
    }

    pub fn set_tuning(&mut self, tuning: QualityTuning) {
        self.tuning = tuning;
    }

    /// Adjustments applied since creation.
    pub fn adjustments(&self) -> u64 {
        self.adjustments
    }

    /// Step the most expensive setting down once.
    pub fn reduce_quality(&mut self) -> Option<SettingsChange> {
        self.settings.reduce(&self.tuning)
    }

    /// Step one setting back up.
    pub fn increase_quality(&mut self) -> Option<SettingsChange> {
        self.settings.increase(&self.tuning)
    }

    /// Run one controller tick.
    ///
    /// On an adjustment the LOD manager's performance mode is also moved
    /// through its frame-rate hysteresis, and the combined change is sent to
    /// `sink`.
    pub fn tick<K, M, S>(&mut self, monitor: &M, lod: &mut LodManager<K>, sink: &mut S) -> QualityAction
    where
        K: Eq + Hash + Clone,
        M: PerformanceMonitor + ?Sized,
        S: SettingsSink + ?Sized,
    {
        if !self.enabled {
            return QualityAction::Disabled;
        }
        if self.cooldown_remaining > 0 {
            self.cooldown_remaining -= 1;
            return QualityAction::CoolingDown {
                remaining: self.cooldown_remaining,
            };
        }

        let fps = match monitor.current_fps() {
            Some(fps) if fps.is_finite() && fps > 0.0 => fps,
            _ => return QualityAction::NoData,
        };

        let reducing = if fps < self.tuning.lower_bound() {
            true
        } else if fps > self.tuning.upper_bound() {
            false
        } else {
            return QualityAction::WithinBand;
        };

        self.cooldown_remaining = self.tuning.cooldown_ticks;

        let stepped = if reducing {
            self.reduce_quality()
        } else {
            self.increase_quality()
        };
        // The LOD bands are wider than the quality band, so only keep a mode
        // move that points the same way as the settings step.
        let current = lod.performance_mode();
        let mode = lod.hysteresis().next_mode(current, fps).filter(|&next| {
            if reducing {
                current.is_richer_than(next)
            } else {
                next.is_richer_than(current)
            }
        });
        if let Some(next) = mode {
            debug!(fps, "frame rate moved LOD profile");
            lod.set_performance_mode(next);
        }

        let Some(mut change) = stepped.or_else(|| mode.map(|_| SettingsChange::default())) else {
            debug!(fps, reducing, "quality out of band but nothing left to adjust");
            return QualityAction::Exhausted;
        };
        change.performance_mode = mode;

        self.adjustments += 1;
        info!(
            fps,
            resolution = self.settings.resolution_scale,
            shadows = self.settings.shadows,
            particles = self.settings.particle_density,
            mode = %lod.performance_mode(),
            "{} quality",
            if reducing { "reduced" } else { "increased" }
        );
        sink.apply(&change);

        if reducing {
            QualityAction::Reduced(change)
        } else {
            QualityAction::Increased(change)
        }
    }
}

impl Default for DynamicQualityController {
    fn default() -> Self {
        Self::new(QualitySettings::default(), QualityTuning::default(), true)
    }
}
