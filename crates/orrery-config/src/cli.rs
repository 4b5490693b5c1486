//! Command-line overrides for the persisted configuration.

use std::path::PathBuf;

use clap::Args;
use orrery_lod::PerformanceMode;

use crate::Config;

/// Flags that override values loaded from `config.ron`.
#[derive(Args, Debug, Clone, Default)]
pub struct CliArgs {
    /// Frame cap (0 or negative = unlimited).
    #[arg(long, allow_negative_numbers = true)]
    pub target_fps: Option<i32>,

    /// LOD performance mode: ultra, high, balanced or performance.
    #[arg(long)]
    pub performance_mode: Option<PerformanceMode>,

    /// Enable or disable automatic quality adjustment.
    #[arg(long)]
    pub dynamic_quality: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(fps) = args.target_fps {
            self.render.target_fps = fps;
        }
        if let Some(mode) = args.performance_mode {
            self.render.performance_mode = mode;
        }
        if let Some(enabled) = args.dynamic_quality {
            self.render.dynamic_quality = enabled;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: CliArgs,
    }

    fn parse(argv: &[&str]) -> CliArgs {
        Harness::try_parse_from(std::iter::once("orrery").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = parse(&["--target-fps", "30", "--performance-mode", "ultra"]);
        config.apply_cli_overrides(&args);
        assert_eq!(config.render.target_fps, 30);
        assert_eq!(config.render.performance_mode, PerformanceMode::Ultra);
        // Non-overridden fields retain defaults
        assert!(config.render.dynamic_quality);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_negative_fps_means_unlimited() {
        let args = parse(&["--target-fps", "-1", "--dynamic-quality", "false"]);
        assert_eq!(args.target_fps, Some(-1));
        assert_eq!(args.dynamic_quality, Some(false));
    }

    #[test]
    fn test_bad_mode_rejected() {
        let result = Harness::try_parse_from(["orrery", "--performance-mode", "potato"]);
        assert!(result.is_err());
    }
}
