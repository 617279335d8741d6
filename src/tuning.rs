//! Data-driven game balance
//!
//! Movement and camera feel live here instead of in scattered constants so a
//! level designer can override them from JSON. Any field left out of the
//! document keeps its default.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Player movement constants (velocities in units/s, timers in ms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub acceleration: f32,
    /// Fraction of `acceleration` available while airborne
    pub air_control: f32,
    /// Per-tick velocity multiplier on the ground with no input
    pub friction: f32,
    /// Per-tick velocity multiplier while skidding
    pub skid_friction: f32,
    pub max_speed: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,

    pub jump_force: f32,
    /// Second jump uses `double_jump_force * 0.85`
    pub double_jump_force: f32,
    /// Vertical velocity multiplier applied once when jump is released early
    pub jump_cut: f32,
    pub coyote_time: f32,
    pub jump_buffer: f32,

    pub wall_slide_speed: f32,
    pub wall_jump_force_x: f32,
    pub wall_jump_force_y: f32,

    /// Opposing speed that turns a run into a skid
    pub skid_threshold: f32,
    /// Speed under which a skid ends
    pub skid_exit_speed: f32,

    pub attack_duration: f32,
    pub invincibility: f32,
    pub stomp_bounce: f32,
    pub attack_bounce: f32,
    pub launcher_force: f32,
    /// Landing speed that triggers a camera shake
    pub hard_landing_speed: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            acceleration: 1200.0,
            air_control: 0.8,
            friction: 0.85,
            skid_friction: 0.9,
            max_speed: 250.0,
            gravity: 1200.0,
            max_fall_speed: 600.0,

            jump_force: 380.0,
            double_jump_force: 380.0,
            jump_cut: 0.5,
            coyote_time: 100.0,
            jump_buffer: 80.0,

            wall_slide_speed: 80.0,
            wall_jump_force_x: 280.0,
            wall_jump_force_y: 340.0,

            skid_threshold: 50.0,
            skid_exit_speed: 30.0,

            attack_duration: 300.0,
            invincibility: 1500.0,
            stomp_bounce: 250.0,
            attack_bounce: 300.0,
            launcher_force: 800.0,
            hard_landing_speed: 300.0,
        }
    }
}

/// Camera follow constants (factors are applied once per tick)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Lower = smoother/laggier
    pub lag: f32,
    pub look_ahead: f32,
    pub look_ahead_smooth: f32,
    /// Horizontal speed past which look-ahead kicks in
    pub look_ahead_threshold: f32,
    /// Hold time (ms) on up/down before the camera peeks
    pub peek_threshold: f32,
    pub peek_distance: f32,
    pub peek_smooth: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            lag: 0.08,
            look_ahead: 100.0,
            look_ahead_smooth: 0.05,
            look_ahead_threshold: 10.0,
            peek_threshold: 500.0,
            peek_distance: 150.0,
            peek_smooth: 0.1,
        }
    }
}

/// Complete tuning table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub camera: CameraTuning,
}

impl Tuning {
    /// Parse a tuning document; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
