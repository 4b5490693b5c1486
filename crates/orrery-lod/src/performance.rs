//! Global performance profiles that scale every LOD threshold.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Global detail profile. Thresholds are multiplied by [`multiplier`](Self::multiplier),
/// so higher tiers keep full detail further out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceMode {
    Ultra,
    High,
    #[default]
    Balanced,
    Performance,
}

impl PerformanceMode {
    /// Tiers from most to least detailed.
    pub const TIERS: [PerformanceMode; 4] = [
        PerformanceMode::Ultra,
        PerformanceMode::High,
        PerformanceMode::Balanced,
        PerformanceMode::Performance,
    ];

    /// Distance multiplier applied to every threshold.
    pub const fn multiplier(self) -> f64 {
        match self {
            PerformanceMode::Ultra => 2.0,
            PerformanceMode::High => 1.5,
            PerformanceMode::Balanced => 1.0,
            PerformanceMode::Performance => 0.5,
        }
    }

    const fn tier(self) -> usize {
        match self {
            PerformanceMode::Ultra => 0,
            PerformanceMode::High => 1,
            PerformanceMode::Balanced => 2,
            PerformanceMode::Performance => 3,
        }
    }

    /// One tier cheaper, saturating at `Performance`.
    pub const fn degrade(self) -> Self {
        match self {
            PerformanceMode::Ultra => PerformanceMode::High,
            PerformanceMode::High => PerformanceMode::Balanced,
            PerformanceMode::Balanced | PerformanceMode::Performance => {
                PerformanceMode::Performance
            }
        }
    }

    /// One tier richer, saturating at `Ultra`.
    pub const fn upgrade(self) -> Self {
        match self {
            PerformanceMode::Ultra | PerformanceMode::High => PerformanceMode::Ultra,
            PerformanceMode::Balanced => PerformanceMode::High,
            PerformanceMode::Performance => PerformanceMode::Balanced,
        }
    }

    /// Returns `true` if `self` renders more detail than `other`.
    pub const fn is_richer_than(self, other: PerformanceMode) -> bool {
        self.tier() < other.tier()
    }

    pub const fn name(self) -> &'static str {
        match self {
            PerformanceMode::Ultra => "ultra",
            PerformanceMode::High => "high",
            PerformanceMode::Balanced => "balanced",
            PerformanceMode::Performance => "performance",
        }
    }
}

impl fmt::Display for PerformanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing a mode name that is not one of the four tiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown performance mode {0:?} (expected ultra, high, balanced or performance)")]
pub struct ParseModeError(pub String);

impl FromStr for PerformanceMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PerformanceMode::TIERS
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseModeError(s.to_string()))
    }
}

/// FPS bands for [`LodManager::adjust_for_frame_rate`](crate::LodManager::adjust_for_frame_rate).
///
/// The raise thresholds sit well above the lower ones so a frame rate hovering
/// around a single boundary cannot flip the mode back and forth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameRateHysteresis {
    /// Below this, drop one tier.
    pub degrade_below: f64,
    /// Below this (and above `degrade_below`), cap at `Balanced`.
    pub cap_below: f64,
    /// Above this, `Performance` may climb back to `Balanced`.
    pub recover_above: f64,
    /// Above this, climb one tier.
    pub upgrade_above: f64,
}

impl Default for FrameRateHysteresis {
    fn default() -> Self {
        Self {
            degrade_below: 30.0,
            cap_below: 45.0,
            recover_above: 55.0,
            upgrade_above: 58.0,
        }
    }
}

impl FrameRateHysteresis {
    /// Mode to move to from `current` at `fps`, or `None` to stay.
    pub fn next_mode(&self, current: PerformanceMode, fps: f64) -> Option<PerformanceMode> {
        if !fps.is_finite() || fps <= 0.0 {
            return None;
        }

        let next = if fps < self.degrade_below {
            current.degrade()
        } else if fps < self.cap_below {
            if current.is_richer_than(PerformanceMode::Balanced) {
                PerformanceMode::Balanced
            } else {
                current
            }
        } else if fps <= self.recover_above {
            current
        } else if fps <= self.upgrade_above {
            if current == PerformanceMode::Performance {
                PerformanceMode::Balanced
            } else {
                current
            }
        } else {
            current.upgrade()
        };

        (next != current).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipliers() {
        assert_eq!(PerformanceMode::Ultra.multiplier(), 2.0);
        assert_eq!(PerformanceMode::High.multiplier(), 1.5);
        assert_eq!(PerformanceMode::Balanced.multiplier(), 1.0);
        assert_eq!(PerformanceMode::Performance.multiplier(), 0.5);
    }

    #[test]
    fn test_degrade_and_upgrade_saturate() {
        assert_eq!(
            PerformanceMode::Performance.degrade(),
            PerformanceMode::Performance
        );
        assert_eq!(PerformanceMode::Ultra.upgrade(), PerformanceMode::Ultra);
        assert_eq!(PerformanceMode::High.degrade(), PerformanceMode::Balanced);
        assert_eq!(PerformanceMode::Performance.upgrade(), PerformanceMode::Balanced);
    }

    #[test]
    fn test_parse_mode_names() {
        assert_eq!("ultra".parse(), Ok(PerformanceMode::Ultra));
        assert_eq!(" Balanced ".parse(), Ok(PerformanceMode::Balanced));
        assert!("potato".parse::<PerformanceMode>().is_err());
    }

    #[test]
    fn test_low_fps_degrades_one_tier() {
        let h = FrameRateHysteresis::default();
        assert_eq!(
            h.next_mode(PerformanceMode::Ultra, 20.0),
            Some(PerformanceMode::High)
        );
        assert_eq!(h.next_mode(PerformanceMode::Performance, 20.0), None);
    }

    #[test]
    fn test_mid_fps_caps_at_balanced() {
        let h = FrameRateHysteresis::default();
        assert_eq!(
            h.next_mode(PerformanceMode::Ultra, 40.0),
            Some(PerformanceMode::Balanced)
        );
        assert_eq!(h.next_mode(PerformanceMode::Performance, 40.0), None);
    }

    #[test]
    fn test_resting_band_holds_every_mode() {
        let h = FrameRateHysteresis::default();
        for mode in PerformanceMode::TIERS {
            assert_eq!(h.next_mode(mode, 50.0), None, "{mode} moved at 50 fps");
        }
    }

    #[test]
    fn test_raise_threshold_is_above_lower_threshold() {
        let h = FrameRateHysteresis::default();
        // 56 fps is enough to leave the emergency tier but not to climb further.
        assert_eq!(
            h.next_mode(PerformanceMode::Performance, 56.0),
            Some(PerformanceMode::Balanced)
        );
        assert_eq!(h.next_mode(PerformanceMode::Balanced, 56.0), None);
        assert_eq!(
            h.next_mode(PerformanceMode::Balanced, 60.0),
            Some(PerformanceMode::High)
        );
    }

    #[test]
    fn test_no_flapping_around_lower_boundary() {
        let h = FrameRateHysteresis::default();
        let mut mode = PerformanceMode::High;
        let mut changes = 0;
        for i in 0..100 {
            let fps = if i % 2 == 0 { 29.0 } else { 31.0 };
            if let Some(next) = h.next_mode(mode, fps) {
                mode = next;
                changes += 1;
            }
        }
        // 29 fps only ever pushes down; 31 never pushes back up.
        assert!(changes <= 2, "mode flapped {changes} times");
        assert_eq!(mode, PerformanceMode::Performance);
    }

    #[test]
    fn test_invalid_fps_ignored() {
        let h = FrameRateHysteresis::default();
        assert_eq!(h.next_mode(PerformanceMode::High, 0.0), None);
        assert_eq!(h.next_mode(PerformanceMode::High, f64::NAN), None);
    }
}
