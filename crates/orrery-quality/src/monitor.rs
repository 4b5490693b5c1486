//! Frame-rate sources polled by the quality controller.

use std::collections::VecDeque;

/// Supplies a smoothed frame rate.
pub trait PerformanceMonitor {
    /// Current frames per second, or `None` while no measurement exists.
    fn current_fps(&self) -> Option<f64>;
}

impl<F: Fn() -> Option<f64>> PerformanceMonitor for F {
    fn current_fps(&self) -> Option<f64> {
        self()
    }
}

/// Rolling average over the last `window` rendered frames.
#[derive(Clone, Debug)]
pub struct RollingFpsMonitor {
    /// Frame timestamps in milliseconds, oldest first.
    stamps: VecDeque<f64>,
    window: usize,
}

impl RollingFpsMonitor {
    /// Default number of frames averaged.
    pub const DEFAULT_WINDOW: usize = 60;

    /// # Panics
    ///
    /// Panics if `window` is below 2.
    pub fn new(window: usize) -> Self {
        assert!(window >= 2, "window must hold at least two frames");
        Self {
            stamps: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Record a rendered frame at `now_ms`.
    pub fn record_frame(&mut self, now_ms: f64) {
        if !now_ms.is_finite() {
            return;
        }
        // A clock that jumped backwards invalidates the window.
        if self.stamps.back().is_some_and(|&last| now_ms < last) {
            self.stamps.clear();
        }
        if self.stamps.len() == self.window {
            self.stamps.pop_front();
        }
        self.stamps.push_back(now_ms);
    }

    /// Forget every sample, e.g. after a pause.
    pub fn reset(&mut self) {
        self.stamps.clear();
    }

    pub fn samples(&self) -> usize {
        self.stamps.len()
    }
}

impl Default for RollingFpsMonitor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

impl PerformanceMonitor for RollingFpsMonitor {
    fn current_fps(&self) -> Option<f64> {
        let (first, last) = (self.stamps.front()?, self.stamps.back()?);
        let intervals = self.stamps.len() - 1;
        let span = last - first;
        if intervals == 0 || span <= 0.0 {
            return None;
        }
        Some(1000.0 * intervals as f64 / span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_until_two_frames() {
        let mut monitor = RollingFpsMonitor::default();
        assert_eq!(monitor.current_fps(), None);
        monitor.record_frame(0.0);
        assert_eq!(monitor.current_fps(), None);
        monitor.record_frame(16.0);
        assert!(monitor.current_fps().is_some());
    }

    #[test]
    fn test_steady_frames() {
        let mut monitor = RollingFpsMonitor::new(10);
        for i in 0..100 {
            monitor.record_frame(f64::from(i) * 20.0);
        }
        let fps = monitor.current_fps().unwrap();
        assert!((fps - 50.0).abs() < 1e-9, "expected 50 fps, got {fps}");
        assert_eq!(monitor.samples(), 10);
    }

    #[test]
    fn test_window_forgets_old_frames() {
        let mut monitor = RollingFpsMonitor::new(4);
        let mut t = 0.0;
        for _ in 0..4 {
            t += 100.0;
            monitor.record_frame(t);
        }
        for _ in 0..4 {
            t += 10.0;
            monitor.record_frame(t);
        }
        assert!((monitor.current_fps().unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_clock_reset_clears_window() {
        let mut monitor = RollingFpsMonitor::new(8);
        monitor.record_frame(1_000.0);
        monitor.record_frame(1_016.0);
        monitor.record_frame(5.0);
        assert_eq!(monitor.samples(), 1);
        assert_eq!(monitor.current_fps(), None);
    }

    #[test]
    fn test_closure_monitor() {
        let fixed = || Some(42.0);
        assert_eq!(fixed.current_fps(), Some(42.0));
    }
}
