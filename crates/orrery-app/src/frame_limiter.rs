//! Frame pacing gate consulted once per animation callback.
//!
//! The reference timestamp only ever advances by whole frame intervals, so the
//! overshoot of a late callback carries into the next frame instead of being
//! dropped. Over a long run the achieved frame interval converges to the
//! target no matter how the callbacks jitter.

use tracing::{debug, info, warn};

/// Rendered frames between periodic pacing diagnostics.
pub const DIAGNOSTIC_PERIOD: u64 = 600;

/// Decides which host callbacks produce a frame.
///
/// Timestamps are milliseconds from any monotonic origin.
#[derive(Clone, Debug)]
pub struct FrameRateLimiter {
    target_fps: f64,
    /// `None` when unlimited.
    frame_interval_ms: Option<f64>,
    last_frame_ms: f64,
    frame_count: u64,
    skipped_count: u64,
}

impl FrameRateLimiter {
    /// Create a limiter anchored at `now_ms`. `target_fps <= 0` is unlimited.
    pub fn new(target_fps: f64, now_ms: f64) -> Self {
        let mut limiter = Self {
            target_fps: 0.0,
            frame_interval_ms: None,
            last_frame_ms: now_ms,
            frame_count: 0,
            skipped_count: 0,
        };
        limiter.configure(target_fps, now_ms);
        limiter
    }

    /// A limiter that renders every callback.
    pub fn unlimited() -> Self {
        Self::new(0.0, 0.0)
    }

    fn configure(&mut self, fps: f64, now_ms: f64) {
        if fps > 0.0 && fps.is_finite() {
            self.target_fps = fps;
            self.frame_interval_ms = Some(1000.0 / fps);
        } else {
            self.target_fps = 0.0;
            self.frame_interval_ms = None;
        }
        if now_ms.is_finite() {
            self.last_frame_ms = now_ms;
        }
    }

    /// Change the target. Re-anchors at `now_ms` so frames skipped under the
    /// old target do not arrive as a burst.
    pub fn set_target_fps(&mut self, fps: f64, now_ms: f64) {
        self.configure(fps, now_ms);
        match self.frame_interval_ms {
            Some(interval) => info!(fps, interval_ms = interval, "frame limiter target set"),
            None => info!("frame limiter disabled"),
        }
    }

    /// Returns `true` if this callback should render a frame.
    pub fn should_render(&mut self, now_ms: f64) -> bool {
        let Some(interval) = self.frame_interval_ms else {
            self.count_frame();
            return true;
        };

        if !now_ms.is_finite() {
            warn!(now_ms, "non-finite frame timestamp, rendering without pacing");
            self.count_frame();
            return true;
        }

        let elapsed = now_ms - self.last_frame_ms;
        if elapsed < 0.0 {
            // The host clock restarted.
            self.last_frame_ms = now_ms;
            self.skipped_count += 1;
            return false;
        }
        if elapsed < interval {
            self.skipped_count += 1;
            return false;
        }

        self.last_frame_ms += elapsed - elapsed % interval;
        self.count_frame();
        true
    }

    fn count_frame(&mut self) {
        self.frame_count += 1;
        if self.frame_count % DIAGNOSTIC_PERIOD == 0 {
            debug!(
                frames = self.frame_count,
                skipped = self.skipped_count,
                target_fps = self.target_fps,
                "frame pacing"
            );
        }
    }

    /// Milliseconds until the next callback may render; 0 if unlimited or due.
    pub fn next_frame_delay(&self, now_ms: f64) -> f64 {
        match self.frame_interval_ms {
            Some(interval) if now_ms.is_finite() => {
                (self.last_frame_ms + interval - now_ms).max(0.0)
            }
            _ => 0.0,
        }
    }

    /// Configured target, 0 when unlimited.
    pub fn target_fps(&self) -> f64 {
        self.target_fps
    }

    pub fn frame_interval_ms(&self) -> Option<f64> {
        self.frame_interval_ms
    }

    pub fn is_unlimited(&self) -> bool {
        self.frame_interval_ms.is_none()
    }

    /// Reference timestamp: the start of the interval the last frame fell in.
    pub fn last_frame_ms(&self) -> f64 {
        self.last_frame_ms
    }

    /// Frames rendered so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Callbacks that were told to skip.
    pub fn skipped_count(&self) -> u64 {
        self.skipped_count
    }
}

impl Default for FrameRateLimiter {
    fn default() -> Self {
        Self::unlimited()
    }
}
