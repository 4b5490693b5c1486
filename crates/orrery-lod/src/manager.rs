//! Per-tick LOD assignment for every registered body.
//!
//! [`LodManager`] never owns renderables. Each tick it reads their positions,
//! picks a level from the [`LodPolicyTable`], pushes representation and effect
//! changes only when the level moved, and throttles per-body effect updates
//! with each level's update divisor.

use std::hash::Hash;

use glam::DVec3;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::category::BodyCategory;
use crate::performance::{FrameRateHysteresis, PerformanceMode};
use crate::policy::{LodConfig, LodLevel, LodPolicyTable};
use crate::representation::{EffectFlags, RepresentationMode};

/// A scene object whose visual representation the LOD manager drives.
pub trait Renderable {
    /// Stable identity across ticks.
    type Key: Eq + Hash + Clone;

    fn key(&self) -> Self::Key;

    /// `None` when the registry holds a category tag outside the known set.
    fn category(&self) -> Option<BodyCategory>;

    fn world_position(&self) -> DVec3;

    /// Show `mode` and hide every other representation.
    fn set_representation(&mut self, mode: RepresentationMode);

    fn set_effect_flags(&mut self, flags: EffectFlags);

    /// Refresh particle/animation state. Called on throttled ticks only.
    fn run_effect_update(&mut self, tick: u64);
}

/// Counters for one [`LodManager::update`] call.
///
/// Always handed out by value; holding one never borrows the manager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LodMetrics {
    pub tick: u64,
    /// Bodies below [`LodLevel::FARTHEST`].
    ///
    /// Counted by level, not by representation: a policy with fewer than six
    /// rows never reaches `FARTHEST`, so its last row counts as visible even
    /// when that row is `IconOnly`.
    pub visible: u32,
    /// Bodies at [`LodLevel::FARTHEST`], including unplaceable ones.
    pub culled: u32,
    /// Representation changes applied this tick.
    pub transitions: u32,
    pub effect_updates: u32,
    /// Bodies with an unknown category or a non-finite position.
    pub anomalies: u32,
    pub mode: PerformanceMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Anomaly {
    UnknownCategory,
    NonFinitePosition,
}

struct Assignment {
    level: LodLevel,
    config: LodConfig,
    anomaly: Option<Anomaly>,
}

/// Distance-driven LOD state for the whole scene.
pub struct LodManager<K> {
    table: LodPolicyTable,
    mode: PerformanceMode,
    hysteresis: FrameRateHysteresis,
    /// Last level applied per body. Only used to detect transitions.
    levels: FxHashMap<K, LodLevel>,
    pinned: FxHashMap<K, LodLevel>,
    tick: u64,
    metrics: LodMetrics,
}

impl<K: Eq + Hash + Clone> LodManager<K> {
    /// Create a manager with the given policy table and starting mode.
    pub fn new(table: LodPolicyTable, mode: PerformanceMode) -> Self {
        Self {
            table,
            mode,
            hysteresis: FrameRateHysteresis::default(),
            levels: FxHashMap::default(),
            pinned: FxHashMap::default(),
            tick: 0,
            metrics: LodMetrics {
                mode,
                ..LodMetrics::default()
            },
        }
    }

    /// Replace the FPS bands used by [`adjust_for_frame_rate`](Self::adjust_for_frame_rate).
    pub fn with_hysteresis(mut self, hysteresis: FrameRateHysteresis) -> Self {
        self.hysteresis = hysteresis;
        self
    }

    pub fn set_hysteresis(&mut self, hysteresis: FrameRateHysteresis) {
        self.hysteresis = hysteresis;
    }

    pub fn hysteresis(&self) -> &FrameRateHysteresis {
        &self.hysteresis
    }

    pub fn table(&self) -> &LodPolicyTable {
        &self.table
    }

    pub fn performance_mode(&self) -> PerformanceMode {
        self.mode
    }

    /// Change the global profile. Takes effect on the next [`update`](Self::update).
    pub fn set_performance_mode(&mut self, mode: PerformanceMode) {
        if mode != self.mode {
            info!(from = %self.mode, to = %mode, "LOD performance mode changed");
            self.mode = mode;
        }
    }

    /// Map a measured frame rate onto a performance mode with hysteresis.
    ///
    /// Returns the new mode when it changed.
    pub fn adjust_for_frame_rate(&mut self, measured_fps: f64) -> Option<PerformanceMode> {
        let next = self.hysteresis.next_mode(self.mode, measured_fps)?;
        debug!(fps = measured_fps, "frame rate moved LOD profile");
        self.set_performance_mode(next);
        Some(next)
    }

    /// Ticks processed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Counters from the most recent update.
    pub fn metrics(&self) -> LodMetrics {
        self.metrics
    }

    /// Last level applied to `key`.
    pub fn level_of(&self, key: &K) -> Option<LodLevel> {
        self.levels.get(key).copied()
    }

    /// Number of bodies with a cached level.
    pub fn tracked(&self) -> usize {
        self.levels.len()
    }

    /// Assign levels for one tick.
    pub fn update<'a, R, I>(&mut self, renderables: I, viewer: DVec3) -> LodMetrics
    where
        R: Renderable<Key = K> + 'a,
        I: IntoIterator<Item = &'a mut R>,
    {
        self.tick += 1;
        let tick = self.tick;
        let mut metrics = LodMetrics {
            tick,
            mode: self.mode,
            ..LodMetrics::default()
        };

        for renderable in renderables {
            let key = renderable.key();
            let assignment = self.assign(&*renderable, &key, viewer);

            if assignment.anomaly.is_some() {
                metrics.anomalies += 1;
            }

            if self.levels.get(&key) != Some(&assignment.level) {
                if let Some(anomaly) = assignment.anomaly {
                    warn!(
                        ?anomaly,
                        category = ?renderable.category(),
                        "renderable cannot be placed, culling it"
                    );
                }
                renderable.set_representation(assignment.config.representation);
                renderable.set_effect_flags(assignment.config.effects);
                self.levels.insert(key, assignment.level);
                metrics.transitions += 1;
            }

            if tick % u64::from(assignment.config.update_divisor.get()) == 0 {
                renderable.run_effect_update(tick);
                metrics.effect_updates += 1;
            }

            if assignment.level < LodLevel::FARTHEST {
                metrics.visible += 1;
            } else {
                metrics.culled += 1;
            }
        }

        self.metrics = metrics;
        metrics
    }

    fn assign<R: Renderable<Key = K>>(&self, renderable: &R, key: &K, viewer: DVec3) -> Assignment {
        let Some(policy) = renderable.category().and_then(|c| self.table.policy(c)) else {
            return Assignment {
                level: LodLevel::FARTHEST,
                config: LodConfig::culled(),
                anomaly: Some(Anomaly::UnknownCategory),
            };
        };

        // A pin never hides a broken position.
        let distance = renderable.world_position().distance(viewer);
        if !distance.is_finite() {
            return Assignment {
                level: LodLevel::FARTHEST,
                config: LodConfig::culled(),
                anomaly: Some(Anomaly::NonFinitePosition),
            };
        }

        if let Some(&level) = self.pinned.get(key)
            && let Some(config) = policy.config(level)
        {
            return Assignment {
                level,
                config: *config,
                anomaly: None,
            };
        }

        let level = policy.select_level(distance / self.mode.multiplier());
        // select_level only returns levels the policy defines.
        let config = policy
            .config(level)
            .copied()
            .unwrap_or_else(LodConfig::culled);
        Assignment {
            level,
            config,
            anomaly: None,
        }
    }

    /// Apply `level` to `renderable` right now, bypassing the no-change check.
    ///
    /// Returns `false` and leaves everything untouched if the body's category
    /// has no row for `level`. The next [`update`](Self::update) recomputes the
    /// level from distance unless the body is [pinned](Self::pin_level).
    pub fn force_level<R: Renderable<Key = K>>(&mut self, renderable: &mut R, level: LodLevel) -> bool {
        let Some(config) = renderable
            .category()
            .and_then(|c| self.table.config(c, level))
            .copied()
        else {
            warn!(
                level = level.get(),
                category = ?renderable.category(),
                "no LOD config for forced level, keeping current representation"
            );
            return false;
        };

        renderable.set_representation(config.representation);
        renderable.set_effect_flags(config.effects);
        self.levels.insert(renderable.key(), level);
        true
    }

    /// Hold `key` at `level` on every update until [`unpin`](Self::unpin).
    pub fn pin_level(&mut self, key: K, level: LodLevel) {
        self.pinned.insert(key, level);
    }

    pub fn unpin(&mut self, key: &K) -> Option<LodLevel> {
        self.pinned.remove(key)
    }

    /// Drop cached state for a body that left the registry.
    pub fn forget(&mut self, key: &K) {
        self.levels.remove(key);
        self.pinned.remove(key);
    }

    /// Keep cached state only for keys where `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.levels.retain(|k, _| keep(k));
        self.pinned.retain(|k, _| keep(k));
    }

    /// Forget every cached level, forcing a full re-apply on the next update.
    pub fn clear(&mut self) {
        self.levels.clear();
    }
}

impl<K: Eq + Hash + Clone> Default for LodManager<K> {
    fn default() -> Self {
        Self::new(LodPolicyTable::default(), PerformanceMode::default())
    }
}
