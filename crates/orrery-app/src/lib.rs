//! Orrery application layer.
//!
//! Wires the frame limiter, LOD manager and dynamic quality controller into a
//! single per-callback [`RenderDirector`], plus a procedural scene and a
//! headless loop for exercising them without a GPU.

pub mod demo;
pub mod director;
pub mod frame_limiter;
pub mod platform;
pub mod scene;

pub use director::{DiagnosticsSnapshot, FrameOutcome, RenderDirector};
pub use frame_limiter::FrameRateLimiter;
