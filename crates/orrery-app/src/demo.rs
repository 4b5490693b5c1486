//! Headless simulation of a render loop driven by a vsync-style clock.
//!
//! Frame cost is modeled from what is visible and from the current quality
//! settings, so the quality controller and LOD manager react to load the same
//! way they would behind a real renderer.

use orrery_config::Config;
use orrery_lod::{EffectFlags, LodLevel, PerformanceMode, RepresentationMode};
use orrery_quality::{QualitySettings, SettingsChange, SettingsSink};
use serde::Serialize;
use tracing::{debug, info};

use crate::director::{DiagnosticsSnapshot, RenderDirector};
use crate::scene::{Body, StarSystem, camera_position};

/// Fixed per-frame overhead in milliseconds.
const BASE_COST_MS: f64 = 3.0;

/// Rendered frames between overlay lines when `debug.show_fps` is set.
const OVERLAY_PERIOD: u64 = 60;

/// Knobs of one headless run.
#[derive(Clone, Debug, PartialEq)]
pub struct DemoOptions {
    /// Host animation callbacks to simulate.
    pub callbacks: u32,
    pub bodies: usize,
    pub seed: u64,
    /// Display refresh rate driving the callbacks.
    pub refresh_hz: f64,
    /// Multiplier on the modeled GPU cost (1.0 = nominal).
    pub load: f64,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            callbacks: 3_600,
            bodies: 600,
            seed: 7,
            refresh_hz: 60.0,
            load: 1.0,
        }
    }
}

/// Renderer state as seen by the settings pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RendererSettings {
    pub settings: QualitySettings,
    pub performance_mode: Option<PerformanceMode>,
    pub changes_applied: u64,
}

impl RendererSettings {
    pub fn new(settings: QualitySettings) -> Self {
        Self {
            settings,
            performance_mode: None,
            changes_applied: 0,
        }
    }
}

impl SettingsSink for RendererSettings {
    fn apply(&mut self, change: &SettingsChange) {
        let s = &mut self.settings;
        s.resolution_scale = (s.resolution_scale + change.resolution_scale_delta).clamp(0.1, 1.0);
        s.particle_density = (s.particle_density + change.particle_density_delta).clamp(0.0, 1.0);
        if let Some(shadows) = change.shadows {
            s.shadows = shadows;
        }
        if change.performance_mode.is_some() {
            self.performance_mode = change.performance_mode;
        }
        self.changes_applied += 1;
        debug!(?change, "renderer settings updated");
    }
}

/// Modeled GPU time for drawing `bodies` under `settings`.
pub fn frame_cost_ms(bodies: &[Body], settings: &QualitySettings, load: f64) -> f64 {
    let mut geometry = 0.0;
    let mut effects = 0.0;
    for body in bodies {
        geometry += match body.representation() {
            RepresentationMode::Full => 0.06,
            RepresentationMode::Simplified => 0.025,
            RepresentationMode::Billboard => 0.006,
            RepresentationMode::PointOnly => 0.001,
            RepresentationMode::IconOnly => 0.0,
        };
        let flags = body.effects();
        if flags.contains(EffectFlags::PARTICLES) {
            effects += 0.03 * f64::from(settings.particle_density);
        }
        if flags.contains(EffectFlags::ATMOSPHERE) {
            effects += 0.02;
        }
        if flags.contains(EffectFlags::GLOW) {
            effects += 0.004;
        }
    }

    let scale = f64::from(settings.resolution_scale);
    let fill = 0.4 + 0.6 * scale * scale;
    let shadows = if settings.shadows { 1.35 } else { 1.0 };
    (BASE_COST_MS + (geometry * shadows + effects) * fill) * load.max(0.0)
}

/// Final state of a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DemoReport {
    pub simulated_ms: f64,
    pub bodies: usize,
    pub renderer: RendererSettings,
    pub diagnostics: DiagnosticsSnapshot,
}

/// Simulate `options.callbacks` host callbacks against `config`.
pub fn run(config: &Config, options: &DemoOptions) -> DemoReport {
    let mut system = StarSystem::generate(options.seed, options.bodies);
    let mut renderer = RendererSettings::new(config.quality);
    let mut director = RenderDirector::from_config(config, 0.0);

    // The star stays fully detailed wherever the camera goes.
    if let Some(star) = system.bodies().first() {
        director.lod_mut().pin_level(star.id(), LodLevel::NEAREST);
    }

    let vsync_ms = 1000.0 / options.refresh_hz.max(1.0);
    let mut now = 0.0;
    info!(
        bodies = system.len(),
        callbacks = options.callbacks,
        refresh_hz = options.refresh_hz,
        "starting headless run"
    );

    for _ in 0..options.callbacks {
        now += vsync_ms;
        let t_s = now / 1000.0;
        system.advance(t_s);

        let outcome = director.frame(now, system.bodies_mut(), camera_position(t_s), &mut renderer);
        if outcome.rendered {
            if config.debug.show_fps && director.limiter().frame_count() % OVERLAY_PERIOD == 0 {
                let snapshot = director.snapshot();
                info!(
                    fps = snapshot.measured_fps,
                    visible = snapshot.lod.visible,
                    mode = %snapshot.performance_mode,
                    "overlay"
                );
            }
            // A frame longer than one refresh misses the following vsyncs.
            let cost = frame_cost_ms(system.bodies(), &renderer.settings, options.load);
            let missed = (cost / vsync_ms).ceil() - 1.0;
            if missed > 0.0 {
                now += missed * vsync_ms;
            }
        }
    }

    let diagnostics = director.snapshot();
    info!(
        frames = diagnostics.frames_rendered,
        fps = diagnostics.measured_fps,
        mode = %diagnostics.performance_mode,
        adjustments = diagnostics.quality_adjustments,
        "headless run finished"
    );

    DemoReport {
        simulated_ms: now,
        bodies: system.len(),
        renderer,
        diagnostics,
    }
}
