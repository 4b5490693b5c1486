//! Per-callback orchestration of frame pacing, LOD and quality control.
//!
//! One [`RenderDirector`] is built at startup and handed to the host loop by
//! reference. Each animation callback calls [`RenderDirector::frame`], which
//! asks the limiter whether to render, then runs the LOD pass and one quality
//! controller tick.

use std::hash::Hash;

use glam::DVec3;
use orrery_config::Config;
use orrery_lod::{LodManager, LodMetrics, LodPolicyTable, PerformanceMode, Renderable};
use orrery_quality::{
    DynamicQualityController, PerformanceMonitor, QualityAction, QualitySettings,
    RollingFpsMonitor, SettingsSink,
};
use serde::Serialize;
use tracing::info;

use crate::frame_limiter::FrameRateLimiter;

/// What happened during one host callback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameOutcome {
    /// `false` when the limiter skipped this callback.
    pub rendered: bool,
    pub lod: Option<LodMetrics>,
    pub quality: Option<QualityAction>,
    /// Sleep hint for schedulers that prefer not to poll.
    pub next_frame_delay_ms: f64,
}

/// Point-in-time copy of everything an overlay may want to show.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiagnosticsSnapshot {
    pub frames_rendered: u64,
    pub callbacks_skipped: u64,
    pub target_fps: f64,
    pub measured_fps: Option<f64>,
    pub performance_mode: PerformanceMode,
    pub lod: LodMetrics,
    pub quality: QualitySettings,
    pub dynamic_quality: bool,
    pub cooldown_remaining: u32,
    pub quality_adjustments: u64,
    pub last_quality_action: Option<QualityAction>,
}

/// Owns the limiter, LOD manager, quality controller and FPS monitor.
pub struct RenderDirector<K> {
    limiter: FrameRateLimiter,
    lod: LodManager<K>,
    quality: DynamicQualityController,
    monitor: RollingFpsMonitor,
    /// Config as last applied, to tell user changes from automatic ones.
    applied: Config,
    last_quality_action: Option<QualityAction>,
}

impl<K: Eq + Hash + Clone> RenderDirector<K> {
    /// Build every part from `config` with the default LOD policy table.
    pub fn from_config(config: &Config, now_ms: f64) -> Self {
        Self::with_table(config, LodPolicyTable::default(), now_ms)
    }

    pub fn with_table(config: &Config, table: LodPolicyTable, now_ms: f64) -> Self {
        let lod = LodManager::new(table, config.render.performance_mode)
            .with_hysteresis(config.lod);
        let quality = DynamicQualityController::new(
            config.quality,
            config.tuning,
            config.render.dynamic_quality,
        );
        Self {
            limiter: FrameRateLimiter::new(f64::from(config.render.target_fps), now_ms),
            lod,
            quality,
            monitor: RollingFpsMonitor::default(),
            applied: config.clone(),
            last_quality_action: None,
        }
    }

    /// Run one host callback.
    pub fn frame<'a, R, I, S>(
        &mut self,
        now_ms: f64,
        renderables: I,
        viewer: DVec3,
        sink: &mut S,
    ) -> FrameOutcome
    where
        R: Renderable<Key = K> + 'a,
        I: IntoIterator<Item = &'a mut R>,
        S: SettingsSink + ?Sized,
    {
        if !self.limiter.should_render(now_ms) {
            return FrameOutcome {
                rendered: false,
                lod: None,
                quality: None,
                next_frame_delay_ms: self.limiter.next_frame_delay(now_ms),
            };
        }

        self.monitor.record_frame(now_ms);
        let lod = self.lod.update(renderables, viewer);
        let action = self.quality.tick(&self.monitor, &mut self.lod, sink);
        self.last_quality_action = Some(action);

        FrameOutcome {
            rendered: true,
            lod: Some(lod),
            quality: Some(action),
            next_frame_delay_ms: self.limiter.next_frame_delay(now_ms),
        }
    }

    /// Apply runtime config changes without rebuilding anything.
    ///
    /// Only fields that differ from the previously applied config are pushed,
    /// so automatic quality adjustments survive an unrelated reload.
    pub fn apply_config(&mut self, config: &Config, now_ms: f64) {
        let prev = &self.applied;

        if config.render.target_fps != prev.render.target_fps {
            self.limiter
                .set_target_fps(f64::from(config.render.target_fps), now_ms);
        }
        if config.render.performance_mode != prev.render.performance_mode {
            self.lod.set_performance_mode(config.render.performance_mode);
        }
        if config.render.dynamic_quality != prev.render.dynamic_quality {
            self.quality.set_enabled(config.render.dynamic_quality);
        }
        if config.quality != prev.quality {
            info!(profile = ?config.quality.profile, "quality settings replaced");
            self.quality.set_settings(config.quality);
        }
        if config.tuning != prev.tuning {
            self.quality.set_tuning(config.tuning);
        }
        if config.lod != prev.lod {
            self.lod.set_hysteresis(config.lod);
        }

        self.applied = config.clone();
    }

    /// Forget a body that left the scene.
    pub fn remove(&mut self, key: &K) {
        self.lod.forget(key);
    }

    pub fn limiter(&self) -> &FrameRateLimiter {
        &self.limiter
    }

    pub fn lod(&self) -> &LodManager<K> {
        &self.lod
    }

    /// Direct access for pins and forced levels.
    pub fn lod_mut(&mut self) -> &mut LodManager<K> {
        &mut self.lod
    }

    pub fn quality(&self) -> &DynamicQualityController {
        &self.quality
    }

    pub fn monitor(&self) -> &RollingFpsMonitor {
        &self.monitor
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            frames_rendered: self.limiter.frame_count(),
            callbacks_skipped: self.limiter.skipped_count(),
            target_fps: self.limiter.target_fps(),
            measured_fps: self.monitor.current_fps(),
            performance_mode: self.lod.performance_mode(),
            lod: self.lod.metrics(),
            quality: *self.quality.settings(),
            dynamic_quality: self.quality.is_enabled(),
            cooldown_remaining: self.quality.cooldown_remaining(),
            quality_adjustments: self.quality.adjustments(),
            last_quality_action: self.last_quality_action,
        }
    }
}
