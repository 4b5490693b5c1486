//! Configuration for the Orrery renderer.
//!
//! Settings persist to disk as RON. Missing fields fall back to defaults so
//! older and newer files both load, and CLI flags override whatever was read.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, RenderConfig};
pub use error::ConfigError;
