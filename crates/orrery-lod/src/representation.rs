//! Visual stand-ins for a body and the effect bits toggled alongside them.

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Which precomputed visual stand-in is shown for a body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentationMode {
    /// Full-resolution mesh.
    #[default]
    Full,
    /// Reduced mesh.
    Simplified,
    /// Camera-facing sprite.
    Billboard,
    /// Point light only.
    PointOnly,
    /// Hidden, map icon only.
    IconOnly,
}

impl RepresentationMode {
    /// Every mode, nearest-first.
    pub const ALL: [RepresentationMode; 5] = [
        RepresentationMode::Full,
        RepresentationMode::Simplified,
        RepresentationMode::Billboard,
        RepresentationMode::PointOnly,
        RepresentationMode::IconOnly,
    ];

    const fn slot(self) -> usize {
        match self {
            RepresentationMode::Full => 0,
            RepresentationMode::Simplified => 1,
            RepresentationMode::Billboard => 2,
            RepresentationMode::PointOnly => 3,
            RepresentationMode::IconOnly => 4,
        }
    }
}

/// Bitset of per-body effects: particles, atmosphere, glow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectFlags(u8);

impl EffectFlags {
    pub const NONE: EffectFlags = EffectFlags(0);
    pub const PARTICLES: EffectFlags = EffectFlags(1 << 0);
    pub const ATMOSPHERE: EffectFlags = EffectFlags(1 << 1);
    pub const GLOW: EffectFlags = EffectFlags(1 << 2);
    pub const ALL: EffectFlags = EffectFlags(0b111);

    /// Build from raw bits; unknown bits are dropped.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        EffectFlags(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    pub const fn contains(self, other: EffectFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for EffectFlags {
    type Output = EffectFlags;

    fn bitor(self, rhs: EffectFlags) -> EffectFlags {
        EffectFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for EffectFlags {
    fn bitor_assign(&mut self, rhs: EffectFlags) {
        self.0 |= rhs.0;
    }
}

/// Side table from [`RepresentationMode`] to the concrete asset standing in for it.
///
/// Exactly one mode is active at a time, so switching representation is a
/// single assignment and two stand-ins can never both be visible. Modes
/// without an asset (e.g. `IconOnly`) are valid targets: nothing is drawn.
#[derive(Clone, Debug)]
pub struct RepresentationSlots<T> {
    slots: [Option<T>; 5],
    active: RepresentationMode,
}

impl<T> RepresentationSlots<T> {
    /// Create an empty table with `initial` active.
    pub fn new(initial: RepresentationMode) -> Self {
        Self {
            slots: [None, None, None, None, None],
            active: initial,
        }
    }

    /// Attach the asset used for `mode`, returning any previous one.
    pub fn insert(&mut self, mode: RepresentationMode, asset: T) -> Option<T> {
        self.slots[mode.slot()].replace(asset)
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, mode: RepresentationMode, asset: T) -> Self {
        self.insert(mode, asset);
        self
    }

    /// Make `mode` the single visible representation.
    pub fn activate(&mut self, mode: RepresentationMode) {
        self.active = mode;
    }

    pub fn active(&self) -> RepresentationMode {
        self.active
    }

    /// Returns `true` only for the active mode.
    pub fn is_visible(&self, mode: RepresentationMode) -> bool {
        self.active == mode
    }

    /// The asset currently drawn, if the active mode has one.
    pub fn visible(&self) -> Option<&T> {
        self.slots[self.active.slot()].as_ref()
    }

    pub fn get(&self, mode: RepresentationMode) -> Option<&T> {
        self.slots[mode.slot()].as_ref()
    }
}

impl<T> Default for RepresentationSlots<T> {
    fn default() -> Self {
        Self::new(RepresentationMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_flags_combine() {
        let flags = EffectFlags::PARTICLES | EffectFlags::GLOW;
        assert!(flags.contains(EffectFlags::PARTICLES));
        assert!(flags.contains(EffectFlags::GLOW));
        assert!(!flags.contains(EffectFlags::ATMOSPHERE));
        assert!(EffectFlags::NONE.is_empty());
        assert_eq!(EffectFlags::from_bits_truncate(0xFF), EffectFlags::ALL);
    }

    #[test]
    fn test_exactly_one_mode_visible() {
        let mut slots = RepresentationSlots::new(RepresentationMode::IconOnly)
            .with(RepresentationMode::Full, "mesh_hi")
            .with(RepresentationMode::Simplified, "mesh_lo")
            .with(RepresentationMode::Billboard, "sprite");

        for mode in RepresentationMode::ALL {
            slots.activate(mode);
            let visible = RepresentationMode::ALL
                .iter()
                .filter(|m| slots.is_visible(**m))
                .count();
            assert_eq!(visible, 1, "mode {mode:?} left {visible} modes visible");
        }
    }

    #[test]
    fn test_visible_asset_follows_active_mode() {
        let mut slots = RepresentationSlots::default()
            .with(RepresentationMode::Full, 1u32)
            .with(RepresentationMode::Billboard, 3u32);
        assert_eq!(slots.visible(), Some(&1));

        slots.activate(RepresentationMode::Billboard);
        assert_eq!(slots.visible(), Some(&3));

        slots.activate(RepresentationMode::IconOnly);
        assert_eq!(slots.visible(), None);
        assert_eq!(slots.get(RepresentationMode::Full), Some(&1));
    }
}
