//! Closed-loop quality control: global render settings, a rolling frame-rate
//! monitor, and the controller that trades detail for frame rate.

mod controller;
mod monitor;
mod settings;

pub use controller::{DynamicQualityController, QualityAction};
pub use monitor::{PerformanceMonitor, RollingFpsMonitor};
pub use settings::{QualityProfile, QualitySettings, QualityTuning, SettingsChange, SettingsSink};
