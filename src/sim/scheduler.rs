//! Fixed-timestep accumulator
//!
//! Decouples the display refresh from simulation ticks. Each display frame
//! banks its elapsed time and runs as many whole ticks as fit, up to the
//! frame-skip cap. Ticks past the cap are dropped so a stall never turns
//! into an ever-growing catch-up.

use crate::consts::{FIXED_STEP_MS, MAX_FRAME_SKIP};

/// What one display frame did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Ticks executed this frame
    pub ticks: u32,
    /// Whole ticks discarded by the frame-skip cap
    pub dropped: u32,
    /// Leftover fraction of a tick, in [0, 1), for render interpolation
    pub alpha: f32,
}

#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    max_frame_skip: u32,
    accumulator: f32,
    last_time: f64,
    running: bool,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(FIXED_STEP_MS, MAX_FRAME_SKIP)
    }
}

impl FixedTimestep {
    pub fn new(step: f32, max_frame_skip: u32) -> Self {
        Self {
            step,
            max_frame_skip,
            accumulator: 0.0,
            last_time: 0.0,
            running: false,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self, now_ms: f64) {
        self.running = true;
        self.last_time = now_ms;
        self.accumulator = 0.0;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Bank the time since the last frame and run `tick` for each whole step
    pub fn frame<F: FnMut(f32)>(&mut self, now_ms: f64, mut tick: F) -> FrameReport {
        if !self.running {
            return FrameReport::default();
        }

        // A clock that runs backwards contributes nothing
        let frame_time = (now_ms - self.last_time).max(0.0) as f32;
        self.last_time = now_ms;
        self.accumulator += frame_time;

        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < self.max_frame_skip {
            tick(self.step);
            self.accumulator -= self.step;
            ticks += 1;
        }

        let mut dropped = 0;
        if self.accumulator >= self.step {
            dropped = (self.accumulator / self.step).floor() as u32;
            self.accumulator -= dropped as f32 * self.step;
            log::debug!("Frame-skip cap hit: dropped {dropped} ticks");
        }

        FrameReport {
            ticks,
            dropped,
            alpha: (self.accumulator / self.step).clamp(0.0, 1.0 - f32::EPSILON),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_running_does_nothing() {
        let mut clock = FixedTimestep::default();
        let mut count = 0;
        let report = clock.frame(1000.0, |_| count += 1);
        assert_eq!(report, FrameReport::default());
        assert_eq!(count, 0);
    }

    #[test]
    fn test_steady_sixty_hz() {
        let mut clock = FixedTimestep::default();
        clock.start(0.0);
        let mut count = 0;
        for frame in 1..=60 {
            clock.frame(frame as f64 * 1000.0 / 60.0, |dt| {
                assert_eq!(dt, FIXED_STEP_MS);
                count += 1;
            });
        }
        // Float drift may leave the last step banked
        assert!((59..=60).contains(&count));
    }

    #[test]
    fn test_alpha_carries_remainder() {
        let mut clock = FixedTimestep::new(10.0, 5);
        clock.start(0.0);
        let report = clock.frame(25.0, |_| {});
        assert_eq!(report.ticks, 2);
        assert!((report.alpha - 0.5).abs() < 1e-6);

        let report = clock.frame(30.0, |_| {});
        assert_eq!(report.ticks, 1);
        assert!(report.alpha.abs() < 1e-6);
    }

    #[test]
    fn test_stall_is_capped_and_dropped() {
        let mut clock = FixedTimestep::new(10.0, 5);
        clock.start(0.0);
        let mut count = 0;
        let report = clock.frame(1003.0, |_| count += 1);
        assert_eq!(count, 5);
        assert_eq!(report.ticks, 5);
        assert_eq!(report.dropped, 95);
        assert!(report.alpha >= 0.0 && report.alpha < 1.0);

        // No catch-up on the next frame
        let report = clock.frame(1010.0, |_| {});
        assert_eq!(report.ticks, 1);
        assert_eq!(report.dropped, 0);
    }

    #[test]
    fn test_backwards_clock_is_ignored() {
        let mut clock = FixedTimestep::new(10.0, 5);
        clock.start(100.0);
        let report = clock.frame(50.0, |_| {});
        assert_eq!(report.ticks, 0);
        let report = clock.frame(60.0, |_| {});
        assert_eq!(report.ticks, 1);
    }
}
