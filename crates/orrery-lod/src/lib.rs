//! Level-of-detail control for simulated bodies: per-category distance
//! policies, performance-mode scaling and the per-tick LOD manager.

mod category;
mod manager;
mod performance;
mod policy;
mod representation;

pub use category::{BodyCategory, ParseCategoryError};
pub use manager::{LodManager, LodMetrics, Renderable};
pub use performance::{FrameRateHysteresis, ParseModeError, PerformanceMode};
pub use policy::{CategoryPolicy, LodConfig, LodLevel, LodPolicyTable, PolicyError};
pub use representation::{EffectFlags, RepresentationMode, RepresentationSlots};
