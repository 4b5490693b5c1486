//! Per-category LOD policy: distance thresholds mapped to representations,
//! effects and effect-update divisors.

use std::num::NonZeroU32;

use serde::Serialize;

use crate::category::BodyCategory;
use crate::representation::{EffectFlags, RepresentationMode};

/// A discrete detail tier. 0 is closest and most detailed, 5 is farthest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct LodLevel(u8);

impl LodLevel {
    pub const NEAREST: LodLevel = LodLevel(0);
    pub const FARTHEST: LodLevel = LodLevel(5);
    /// Number of distinct levels.
    pub const COUNT: usize = 6;

    /// Returns `None` for levels past [`FARTHEST`](Self::FARTHEST).
    pub const fn new(level: u8) -> Option<Self> {
        if level <= Self::FARTHEST.0 {
            Some(LodLevel(level))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a body looks like at one level of its category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodConfig {
    /// Bodies whose scaled distance is strictly below this use this level.
    pub threshold: f64,
    pub representation: RepresentationMode,
    pub effects: EffectFlags,
    /// Effect updates run on ticks divisible by this.
    pub update_divisor: NonZeroU32,
}

impl LodConfig {
    /// Build a config row.
    ///
    /// # Panics
    ///
    /// Panics if `update_divisor` is zero.
    pub fn new(
        threshold: f64,
        representation: RepresentationMode,
        effects: EffectFlags,
        update_divisor: u32,
    ) -> Self {
        let update_divisor =
            NonZeroU32::new(update_divisor).expect("update divisor must be at least 1");
        Self {
            threshold,
            representation,
            effects,
            update_divisor,
        }
    }

    /// Assignment used when a body cannot be placed: unknown category or a
    /// position that is not finite.
    pub const fn culled() -> Self {
        Self {
            threshold: f64::INFINITY,
            representation: RepresentationMode::IconOnly,
            effects: EffectFlags::NONE,
            update_divisor: CULLED_UPDATE_DIVISOR,
        }
    }
}

const CULLED_UPDATE_DIVISOR: NonZeroU32 = match NonZeroU32::new(64) {
    Some(d) => d,
    None => unreachable!(),
};

/// Reasons a policy row set is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("policy must have between 1 and {max} levels, got {got}", max = LodLevel::COUNT)]
    LevelCount { got: usize },
    #[error("threshold {threshold} at level {level} must be positive")]
    NonPositive { level: usize, threshold: f64 },
    #[error("thresholds must be strictly increasing (level {level})")]
    NotIncreasing { level: usize },
    #[error("the last threshold must be infinite, got {0}")]
    FiniteTail(f64),
}

/// Ordered LOD rows for one category.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryPolicy {
    levels: Vec<LodConfig>,
}

impl CategoryPolicy {
    /// Create a policy from rows ordered nearest-first.
    ///
    /// # Panics
    ///
    /// Panics if thresholds are not positive and strictly increasing, the last
    /// threshold is finite, or there are more than six rows.
    pub fn new(levels: Vec<LodConfig>) -> Self {
        match Self::try_new(levels) {
            Ok(policy) => policy,
            Err(e) => panic!("invalid LOD policy: {e}"),
        }
    }

    /// Fallible form of [`new`](Self::new).
    pub fn try_new(levels: Vec<LodConfig>) -> Result<Self, PolicyError> {
        if levels.is_empty() || levels.len() > LodLevel::COUNT {
            return Err(PolicyError::LevelCount { got: levels.len() });
        }
        for (i, row) in levels.iter().enumerate() {
            // NaN fails this too.
            if !(row.threshold > 0.0) {
                return Err(PolicyError::NonPositive {
                    level: i,
                    threshold: row.threshold,
                });
            }
            if i > 0 && row.threshold <= levels[i - 1].threshold {
                return Err(PolicyError::NotIncreasing { level: i });
            }
        }
        let tail = levels[levels.len() - 1].threshold;
        if tail != f64::INFINITY {
            return Err(PolicyError::FiniteTail(tail));
        }
        Ok(Self { levels })
    }

    /// Coarsest level this category defines.
    pub fn max_level(&self) -> LodLevel {
        LodLevel((self.levels.len() - 1) as u8)
    }

    /// Select the level for an already-scaled distance.
    ///
    /// A distance exactly on a threshold belongs to the farther level.
    pub fn select_level(&self, scaled_distance: f64) -> LodLevel {
        debug_assert!(
            !(scaled_distance < 0.0),
            "distance must be non-negative"
        );
        for (i, row) in self.levels.iter().enumerate() {
            if scaled_distance < row.threshold {
                return LodLevel(i as u8);
            }
        }
        self.max_level()
    }

    /// Row for `level`, if this category defines it.
    pub fn config(&self, level: LodLevel) -> Option<&LodConfig> {
        self.levels.get(level.index())
    }

    pub fn levels(&self) -> &[LodConfig] {
        &self.levels
    }
}

/// Immutable lookup from `(category, level)` to [`LodConfig`].
#[derive(Clone, Debug, PartialEq)]
pub struct LodPolicyTable {
    policies: [Option<CategoryPolicy>; BodyCategory::COUNT],
}

impl LodPolicyTable {
    /// A table with no categories; every body is treated as unknown.
    pub fn empty() -> Self {
        Self {
            policies: [None, None, None, None, None, None],
        }
    }

    /// Set the policy for `category`.
    pub fn with_policy(mut self, category: BodyCategory, policy: CategoryPolicy) -> Self {
        self.policies[category.index()] = Some(policy);
        self
    }

    pub fn policy(&self, category: BodyCategory) -> Option<&CategoryPolicy> {
        self.policies[category.index()].as_ref()
    }

    /// Row for `(category, level)`.
    pub fn config(&self, category: BodyCategory, level: LodLevel) -> Option<&LodConfig> {
        self.policy(category)?.config(level)
    }
}

impl Default for LodPolicyTable {
    /// Thresholds in scene units for a balanced profile.
    fn default() -> Self {
        use EffectFlags as E;
        use RepresentationMode as R;

        let row = LodConfig::new;
        let inf = f64::INFINITY;

        Self::empty()
            .with_policy(
                BodyCategory::Star,
                CategoryPolicy::new(vec![
                    row(2_000.0, R::Full, E::PARTICLES | E::GLOW, 1),
                    row(8_000.0, R::Full, E::GLOW, 1),
                    row(30_000.0, R::Simplified, E::GLOW, 2),
                    row(100_000.0, R::Billboard, E::GLOW, 4),
                    row(400_000.0, R::PointOnly, E::NONE, 8),
                    row(inf, R::IconOnly, E::NONE, 16),
                ]),
            )
            .with_policy(
                BodyCategory::Planet,
                CategoryPolicy::new(vec![
                    row(500.0, R::Full, E::ALL, 1),
                    row(1_500.0, R::Full, E::ATMOSPHERE | E::GLOW, 2),
                    row(5_000.0, R::Simplified, E::ATMOSPHERE, 4),
                    row(15_000.0, R::Billboard, E::GLOW, 8),
                    row(50_000.0, R::PointOnly, E::NONE, 16),
                    row(inf, R::IconOnly, E::NONE, 32),
                ]),
            )
            .with_policy(
                BodyCategory::Moon,
                CategoryPolicy::new(vec![
                    row(200.0, R::Full, E::ATMOSPHERE, 1),
                    row(800.0, R::Full, E::NONE, 2),
                    row(2_500.0, R::Simplified, E::NONE, 4),
                    row(8_000.0, R::Billboard, E::NONE, 8),
                    row(25_000.0, R::PointOnly, E::NONE, 16),
                    row(inf, R::IconOnly, E::NONE, 32),
                ]),
            )
            .with_policy(
                BodyCategory::Asteroid,
                CategoryPolicy::new(vec![
                    row(100.0, R::Full, E::NONE, 1),
                    row(400.0, R::Simplified, E::NONE, 2),
                    row(1_200.0, R::Simplified, E::NONE, 4),
                    row(4_000.0, R::Billboard, E::NONE, 8),
                    row(10_000.0, R::PointOnly, E::NONE, 16),
                    row(inf, R::IconOnly, E::NONE, 64),
                ]),
            )
            .with_policy(
                BodyCategory::Comet,
                CategoryPolicy::new(vec![
                    row(300.0, R::Full, E::PARTICLES | E::GLOW, 1),
                    row(1_000.0, R::Full, E::PARTICLES, 1),
                    row(3_000.0, R::Simplified, E::PARTICLES, 2),
                    row(10_000.0, R::Billboard, E::GLOW, 4),
                    row(30_000.0, R::PointOnly, E::NONE, 16),
                    row(inf, R::IconOnly, E::NONE, 32),
                ]),
            )
            .with_policy(
                BodyCategory::CompactObject,
                CategoryPolicy::new(vec![
                    row(1_000.0, R::Full, E::PARTICLES | E::GLOW, 1),
                    row(4_000.0, R::Full, E::GLOW, 1),
                    row(15_000.0, R::Simplified, E::GLOW, 2),
                    row(50_000.0, R::Billboard, E::GLOW, 4),
                    row(200_000.0, R::PointOnly, E::NONE, 8),
                    row(inf, R::IconOnly, E::NONE, 16),
                ]),
            )
    }
}
