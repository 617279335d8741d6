//! Held actions and just-pressed edges
//!
//! Edges are computed against the previous snapshot, so each press is seen
//! by exactly one fixed tick no matter how many display frames it spans.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::sim::InputSnapshot;

/// Stick deflection below this is treated as centered
pub const STICK_DEAD_ZONE: f32 = 0.3;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Action: u8 {
        const LEFT    = 1 << 0;
        const RIGHT   = 1 << 1;
        const UP      = 1 << 2;
        const DOWN    = 1 << 3;
        const JUMP    = 1 << 4;
        const ATTACK  = 1 << 5;
        const PAUSE   = 1 << 6;
        const CONFIRM = 1 << 7;
    }
}

/// Keyboard bindings by `KeyboardEvent.code`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyMap {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub jump: Vec<String>,
    pub attack: Vec<String>,
    pub pause: Vec<String>,
    pub confirm: Vec<String>,
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            left: codes(&["ArrowLeft", "KeyA"]),
            right: codes(&["ArrowRight", "KeyD"]),
            up: codes(&["ArrowUp", "KeyW"]),
            down: codes(&["ArrowDown", "KeyS"]),
            jump: codes(&["Space", "KeyW", "ArrowUp", "KeyK"]),
            attack: codes(&["KeyX", "KeyJ"]),
            pause: codes(&["Escape", "KeyP"]),
            confirm: codes(&["Enter", "Space"]),
        }
    }
}

impl KeyMap {
    /// Every action bound to `code` (a key may drive several)
    pub fn actions_for(&self, code: &str) -> Action {
        let bindings = [
            (&self.left, Action::LEFT),
            (&self.right, Action::RIGHT),
            (&self.up, Action::UP),
            (&self.down, Action::DOWN),
            (&self.jump, Action::JUMP),
            (&self.attack, Action::ATTACK),
            (&self.pause, Action::PAUSE),
            (&self.confirm, Action::CONFIRM),
        ];
        bindings
            .into_iter()
            .filter(|(keys, _)| keys.iter().any(|k| k == code))
            .fold(Action::empty(), |acc, (_, action)| acc | action)
    }
}

/// Collects device events between ticks
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    keymap: KeyMap,
    keys_down: BTreeSet<String>,
    /// Gamepad buttons
    pad: Action,
    /// Gamepad stick, already dead-zoned
    stick: Action,
    previous: Action,
}

impl InputTracker {
    pub fn new(keymap: KeyMap) -> Self {
        Self {
            keymap,
            ..Default::default()
        }
    }

    pub fn set_keymap(&mut self, keymap: KeyMap) {
        self.keymap = keymap;
    }

    pub fn key_down(&mut self, code: &str) {
        self.keys_down.insert(code.to_string());
    }

    pub fn key_up(&mut self, code: &str) {
        self.keys_down.remove(code);
    }

    /// Gamepad button state
    pub fn set_held(&mut self, action: Action, held: bool) {
        self.pad.set(action, held);
    }

    /// Horizontal stick position in [-1, 1]
    pub fn set_axis(&mut self, x: f32) {
        self.stick = if x < -STICK_DEAD_ZONE {
            Action::LEFT
        } else if x > STICK_DEAD_ZONE {
            Action::RIGHT
        } else {
            Action::empty()
        };
    }

    /// Drop everything held (focus lost)
    pub fn release_all(&mut self) {
        self.keys_down.clear();
        self.pad = Action::empty();
        self.stick = Action::empty();
    }

    /// Everything currently held from any device
    pub fn held(&self) -> Action {
        let keys = self
            .keys_down
            .iter()
            .fold(Action::empty(), |acc, code| acc | self.keymap.actions_for(code));
        keys | self.pad | self.stick
    }

    /// Produce this tick's snapshot and advance the edge baseline
    pub fn snapshot(&mut self) -> InputSnapshot {
        let held = self.held();
        let pressed = held & !self.previous;
        self.previous = held;

        InputSnapshot {
            left: held.contains(Action::LEFT),
            right: held.contains(Action::RIGHT),
            up: held.contains(Action::UP),
            down: held.contains(Action::DOWN),
            jump_held: held.contains(Action::JUMP),
            jump_just_pressed: pressed.contains(Action::JUMP),
            attack_just_pressed: pressed.contains(Action::ATTACK),
            pause: pressed.contains(Action::PAUSE),
            confirm: pressed.contains(Action::CONFIRM),
        }
    }
}
