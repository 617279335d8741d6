//! Smooth-follow camera with look-ahead, peeking, bounds and screen shake
//!
//! Shake only perturbs the rendered offset; the logical position that
//! follows the player is never disturbed by it.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::tuning::CameraTuning;

/// Level-edge clamp for the camera's top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBounds {
    pub min: Vec2,
    pub max: Vec2,
}

#[derive(Debug, Clone)]
pub struct Camera {
    /// Top-left of the view in world space
    pub pos: Vec2,
    target: Vec2,
    viewport: Vec2,
    look_ahead: f32,
    peek_y: f32,
    peek_target: f32,
    peek_timer: f32,
    shake_magnitude: f32,
    shake_timer: f32,
    shake_offset: Vec2,
    bounds: Option<CameraBounds>,
    shake_enabled: bool,
    rng: Pcg32,
}

impl Camera {
    pub fn new(viewport: Vec2, seed: u64) -> Self {
        Self {
            pos: Vec2::ZERO,
            target: Vec2::ZERO,
            viewport,
            look_ahead: 0.0,
            peek_y: 0.0,
            peek_target: 0.0,
            peek_timer: 0.0,
            shake_magnitude: 0.0,
            shake_timer: 0.0,
            shake_offset: Vec2::ZERO,
            bounds: None,
            shake_enabled: true,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn look_ahead(&self) -> f32 {
        self.look_ahead
    }

    pub fn shake_offset(&self) -> Vec2 {
        self.shake_offset
    }

    pub fn is_shaking(&self) -> bool {
        self.shake_timer > 0.0
    }

    /// Position the renderer should use (logical position plus shake)
    pub fn render_offset(&self) -> Vec2 {
        self.pos + self.shake_offset
    }

    /// Aim at a world point, leading in the direction of travel
    pub fn follow(&mut self, target: Vec2, velocity_x: f32, tuning: &CameraTuning) {
        let goal = if velocity_x > tuning.look_ahead_threshold {
            tuning.look_ahead
        } else if velocity_x < -tuning.look_ahead_threshold {
            -tuning.look_ahead
        } else {
            0.0
        };
        self.look_ahead += (goal - self.look_ahead) * tuning.look_ahead_smooth;

        self.target = Vec2::new(
            target.x + self.look_ahead - self.viewport.x / 2.0,
            target.y + self.peek_y - self.viewport.y / 2.0,
        );
    }

    /// Look up/down after holding the direction past the peek threshold
    pub fn update_peeking(&mut self, dt: f32, up_held: bool, down_held: bool, tuning: &CameraTuning) {
        if up_held || down_held {
            self.peek_timer += dt;
            if self.peek_timer > tuning.peek_threshold {
                self.peek_target = if up_held {
                    -tuning.peek_distance
                } else {
                    tuning.peek_distance
                };
            }
        } else {
            self.peek_timer = 0.0;
            self.peek_target = 0.0;
        }
        self.peek_y += (self.peek_target - self.peek_y) * tuning.peek_smooth;
    }

    /// Reduced-motion switch; disabling also stops a running shake
    pub fn set_shake_enabled(&mut self, enabled: bool) {
        self.shake_enabled = enabled;
        if !enabled {
            self.shake_timer = 0.0;
            self.shake_offset = Vec2::ZERO;
        }
    }

    pub fn shake(&mut self, magnitude: f32, duration_ms: f32) {
        if !self.shake_enabled {
            return;
        }
        self.shake_magnitude = magnitude;
        self.shake_timer = duration_ms;
    }

    /// Clamp to a level of the given extent; the viewport never shows past its edges
    pub fn set_bounds(&mut self, min: Vec2, max: Vec2) {
        self.bounds = Some(CameraBounds {
            min,
            max: (max - self.viewport).max(min),
        });
    }

    pub fn clear_bounds(&mut self) {
        self.bounds = None;
    }

    /// Center on a point immediately, with no glide
    pub fn snap_to(&mut self, center: Vec2) {
        self.pos = center - self.viewport / 2.0;
        if let Some(b) = self.bounds {
            self.pos = self.pos.clamp(b.min, b.max);
        }
        self.target = self.pos;
        self.look_ahead = 0.0;
    }

    pub fn update(&mut self, dt: f32, tuning: &CameraTuning) {
        self.pos += (self.target - self.pos) * tuning.lag;

        if let Some(b) = self.bounds {
            self.pos = self.pos.clamp(b.min, b.max);
        }

        if self.shake_timer > 0.0 {
            self.shake_timer -= dt;
        }
        if self.shake_timer > 0.0 {
            let m = self.shake_magnitude.abs();
            self.shake_offset = Vec2::new(
                self.rng.random_range(-m..=m),
                self.rng.random_range(-m..=m),
            );
        } else {
            self.shake_timer = 0.0;
            self.shake_offset = Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = crate::consts::FIXED_STEP_MS;

    fn camera() -> Camera {
        Camera::new(Vec2::new(800.0, 600.0), 7)
    }

    #[test]
    fn test_look_ahead_tracks_direction() {
        let tuning = CameraTuning::default();
        let mut cam = camera();
        for _ in 0..200 {
            cam.follow(Vec2::new(1000.0, 300.0), 200.0, &tuning);
        }
        assert!((cam.look_ahead() - 100.0).abs() < 0.1);

        for _ in 0..200 {
            cam.follow(Vec2::new(1000.0, 300.0), -200.0, &tuning);
        }
        assert!((cam.look_ahead() + 100.0).abs() < 0.1);

        for _ in 0..300 {
            cam.follow(Vec2::new(1000.0, 300.0), 5.0, &tuning);
        }
        assert!(cam.look_ahead().abs() < 0.1);
    }

    #[test]
    fn test_follow_converges_on_target() {
        let tuning = CameraTuning::default();
        let mut cam = camera();
        for _ in 0..300 {
            cam.follow(Vec2::new(1000.0, 300.0), 0.0, &tuning);
            cam.update(DT, &tuning);
        }
        assert!((cam.pos - Vec2::new(600.0, 0.0)).length() < 0.5);
    }

    #[test]
    fn test_bounds_respect_viewport() {
        let tuning = CameraTuning::default();
        let mut cam = camera();
        cam.set_bounds(Vec2::ZERO, Vec2::new(3200.0, 600.0));
        for _ in 0..300 {
            cam.follow(Vec2::new(3150.0, 580.0), 0.0, &tuning);
            cam.update(DT, &tuning);
        }
        assert!(cam.pos.x <= 2400.0);
        assert_eq!(cam.pos.y, 0.0);

        cam.snap_to(Vec2::new(-500.0, -500.0));
        assert_eq!(cam.pos, Vec2::ZERO);
    }

    #[test]
    fn test_snap_has_no_glide() {
        let tuning = CameraTuning::default();
        let mut cam = camera();
        cam.snap_to(Vec2::new(500.0, 400.0));
        assert_eq!(cam.pos, Vec2::new(100.0, 100.0));
        cam.update(DT, &tuning);
        assert_eq!(cam.pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_shake_is_bounded_and_stops() {
        let tuning = CameraTuning::default();
        let mut cam = camera();
        cam.snap_to(Vec2::new(400.0, 300.0));
        cam.shake(4.0, 100.0);
        cam.update(DT, &tuning);
        assert!(cam.is_shaking());
        let offset = cam.shake_offset();
        assert!(offset.x.abs() <= 4.0 && offset.y.abs() <= 4.0);
        // Logical position is untouched
        assert_eq!(cam.pos, Vec2::ZERO);

        for _ in 0..6 {
            cam.update(DT, &tuning);
        }
        assert!(!cam.is_shaking());
        assert_eq!(cam.shake_offset(), Vec2::ZERO);
        assert_eq!(cam.render_offset(), cam.pos);
    }

    #[test]
    fn test_disabled_shake_is_ignored() {
        let tuning = CameraTuning::default();
        let mut cam = camera();
        cam.set_shake_enabled(false);
        cam.shake(10.0, 200.0);
        cam.update(DT, &tuning);
        assert!(!cam.is_shaking());
        assert_eq!(cam.shake_offset(), Vec2::ZERO);
    }

    #[test]
    fn test_peek_after_hold() {
        let tuning = CameraTuning::default();
        let mut cam = camera();
        // 20 ticks ~ 333ms: below threshold
        for _ in 0..20 {
            cam.update_peeking(DT, false, true, &tuning);
        }
        assert_eq!(cam.peek_y, 0.0);
        for _ in 0..200 {
            cam.update_peeking(DT, false, true, &tuning);
        }
        assert!((cam.peek_y - 150.0).abs() < 1.0);
        cam.update_peeking(DT, false, false, &tuning);
        assert!(cam.peek_y < 150.0);
    }
}
