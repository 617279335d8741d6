//! Per-tick input commands (deterministic)
//!
//! Produced once per fixed tick by the platform layer and read, never
//! written, by the simulation.

use serde::{Deserialize, Serialize};

/// Held buttons and just-pressed edges for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump_held: bool,
    pub jump_just_pressed: bool,
    pub attack_just_pressed: bool,
    /// Pause toggle (edge)
    pub pause: bool,
    /// Menu confirm (edge)
    pub confirm: bool,
}

impl InputSnapshot {
    /// Horizontal intent: -1, 0 or 1 (right wins when both are held)
    pub fn horizontal(&self) -> f32 {
        if self.right {
            1.0
        } else if self.left {
            -1.0
        } else {
            0.0
        }
    }

    pub fn any_horizontal(&self) -> bool {
        self.left || self.right
    }
}
