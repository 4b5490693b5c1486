//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use orrery_lod::{FrameRateHysteresis, PerformanceMode};
use orrery_quality::{QualitySettings, QualityTuning};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const FILE_NAME: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Options the user may change at runtime.
    pub render: RenderConfig,
    /// Global quality knobs, as last chosen or last adjusted.
    pub quality: QualitySettings,
    /// Automatic quality control constants.
    pub tuning: QualityTuning,
    /// FPS bands for automatic performance-mode switching.
    pub lod: FrameRateHysteresis,
    pub debug: DebugConfig,
}

/// Runtime rendering options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Frame cap; zero or negative renders on every callback.
    pub target_fps: i32,
    pub performance_mode: PerformanceMode,
    /// Let the quality controller adjust settings automatically.
    pub dynamic_quality: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Show the FPS / LOD overlay.
    pub show_fps: bool,
    /// Log filter (e.g. "debug", "info,orrery_lod=trace").
    pub log_level: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            performance_mode: PerformanceMode::Balanced,
            dynamic_quality: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_fps: false,
            log_level: "info".to_string(),
        }
    }
}

// --- Validation ---

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl Config {
    /// Reject values that would make the controllers misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.tuning;
        if !(t.target_fps > 0.0) {
            return Err(invalid("tuning.target_fps", "must be positive"));
        }
        if !(t.band > 0.0 && t.band < 1.0) {
            return Err(invalid("tuning.band", "must be between 0 and 1"));
        }
        if !(t.resolution_step > 0.0) || t.resolution_min > t.resolution_max {
            return Err(invalid(
                "tuning.resolution_step",
                "step must be positive and min <= max",
            ));
        }
        if !(t.particle_step > 0.0) || t.particle_min > t.particle_max {
            return Err(invalid(
                "tuning.particle_step",
                "step must be positive and min <= max",
            ));
        }

        let h = &self.lod;
        if !(h.degrade_below <= h.cap_below
            && h.cap_below <= h.recover_above
            && h.recover_above <= h.upgrade_above)
        {
            return Err(invalid(
                "lod",
                format!(
                    "bands must be ordered, got {} / {} / {} / {}",
                    h.degrade_below, h.cap_below, h.recover_above, h.upgrade_above
                ),
            ));
        }

        if !(self.quality.resolution_scale > 0.0) {
            return Err(invalid("quality.resolution_scale", "must be positive"));
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(FILE_NAME);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = ron::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_err)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty)?;

        std::fs::write(config_dir.join(FILE_NAME), serialized).map_err(write_err)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    ///
    /// A file that fails validation is reported as an error and the running
    /// config stays in effect.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(FILE_NAME))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_quality::QualityProfile;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("target_fps: 60"));
        assert!(ron_str.contains("performance_mode: balanced"));
        assert!(ron_str.contains("cooldown_ticks: 300"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.render.performance_mode = PerformanceMode::Ultra;
        config.quality.profile = QualityProfile::Custom;
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        let ron_str = "(render: (target_fps: 30))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.render.target_fps, 30);
        assert!(config.render.dynamic_quality);
        assert_eq!(config.tuning, QualityTuning::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_mode_names_parse() {
        let config: Config = ron::from_str("(render: (performance_mode: performance))").unwrap();
        assert_eq!(config.render.performance_mode, PerformanceMode::Performance);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.render.target_fps = 0;
        config.render.dynamic_quality = false;
        config.quality = QualitySettings::preset(QualityProfile::Low);

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.render.target_fps = 144;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.map(|c| c.render.target_fps), Some(144));
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn test_validation_rejects_unordered_bands() {
        let mut config = Config::default();
        config.lod.upgrade_above = 10.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "lod", .. }));
    }

    #[test]
    fn test_validation_rejects_bad_band() {
        let mut config = Config::default();
        config.tuning.band = 1.5;
        assert!(config.validate().is_err());
        config.tuning.band = 0.2;
        config.tuning.target_fps = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ron_comments_accepted() {
        let ron_str = "// tuned for laptops\n(\n  // keep defaults\n  debug: (show_fps: false),\n)";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config, Config::default());
    }
}
