//! Headless Orrery run: simulates a render loop over a procedural star system
//! and prints the final diagnostics as JSON.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p orrery-app -- --load 3` to watch the quality
//! controller back off.

use std::process::ExitCode;

use clap::Parser;
use orrery_app::demo::{self, DemoOptions};
use orrery_app::platform::PlatformDirs;
use orrery_config::{CliArgs, Config};

#[derive(Parser, Debug)]
#[command(name = "orrery", about = "Adaptive LOD and frame pacing, headless")]
struct Args {
    #[command(flatten)]
    config: CliArgs,

    /// Host callbacks to simulate.
    #[arg(long, default_value_t = 3_600)]
    callbacks: u32,

    /// Bodies in the generated system.
    #[arg(long, default_value_t = 600)]
    bodies: usize,

    /// Seed for the generated system.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Simulated display refresh rate.
    #[arg(long, default_value_t = 60.0)]
    refresh_hz: f64,

    /// GPU cost multiplier.
    #[arg(long, default_value_t = 1.0)]
    load: f64,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let dirs = match PlatformDirs::resolve_and_create(args.config.config.as_deref()) {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Failed to initialize platform directories: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut config = Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args.config);
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    orrery_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));

    let options = DemoOptions {
        callbacks: args.callbacks,
        bodies: args.bodies,
        seed: args.seed,
        refresh_hz: args.refresh_hz,
        load: args.load,
    };
    let report = demo::run(&config, &options);

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize report: {e}");
            ExitCode::FAILURE
        }
    }
}
