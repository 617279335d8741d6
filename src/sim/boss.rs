//! Boss encounter: the great horned owl
//!
//! A four-state flight pattern independent of the player's controller.
//! Every hit forces a stagger, and a stagger always resolves into feather
//! rain before the owl returns to hovering.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::events::GameEvent;

pub const BOSS_SIZE: f32 = 96.0;
pub const BOSS_MAX_HEALTH: u8 = 10;

const HOVER_DURATION: f32 = 3000.0;
const SWOOP_DURATION: f32 = 2000.0;
const STAGGER_DURATION: f32 = 1000.0;
const FEATHER_RAIN_DURATION: f32 = 4000.0;
const FEATHER_INTERVAL: f32 = 200.0;

const BOB_AMPLITUDE: f32 = 30.0;
/// Bob phase advance per ms
const BOB_RATE: f32 = 0.005;
/// Swoop steering per tick
const SWOOP_STEER: f32 = 0.5;
/// Sink per tick while staggered
const STAGGER_SINK: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossState {
    Hover,
    Swoop,
    Stagger,
    FeatherRain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub pos: Vec2,
    pub health: u8,
    /// Velocity in units per tick (swoop only)
    vel: Vec2,
    state: BossState,
    /// Time spent in the current state (ms)
    timer: f32,
    /// Hover baseline
    anchor_y: f32,
    bob_phase: f32,
    feather_timer: f32,
}

impl Boss {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            health: BOSS_MAX_HEALTH,
            vel: Vec2::ZERO,
            state: BossState::Hover,
            timer: 0.0,
            anchor_y: pos.y,
            bob_phase: 0.0,
            feather_timer: 0.0,
        }
    }

    pub fn state(&self) -> BossState {
        self.state
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos.x, self.pos.y, BOSS_SIZE, BOSS_SIZE)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(BOSS_SIZE / 2.0)
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    /// Advance the flight pattern; `target` is the player's position
    pub fn update(&mut self, dt: f32, target: Vec2, events: &mut Vec<GameEvent>) {
        self.timer += dt;
        self.bob_phase += dt * BOB_RATE;

        match self.state {
            BossState::Hover => {
                self.pos.y = self.anchor_y + self.bob_phase.sin() * BOB_AMPLITUDE;
                if self.timer > HOVER_DURATION {
                    self.enter_state(BossState::Swoop);
                }
            }
            BossState::Swoop => {
                let dir = (target - self.pos).normalize_or_zero();
                self.vel += dir * SWOOP_STEER;
                self.pos += self.vel;

                if self.timer > SWOOP_DURATION {
                    self.vel = Vec2::ZERO;
                    self.enter_state(BossState::Hover);
                }
            }
            BossState::Stagger => {
                self.pos.y += STAGGER_SINK;
                if self.timer > STAGGER_DURATION {
                    self.enter_state(BossState::FeatherRain);
                }
            }
            BossState::FeatherRain => {
                self.feather_timer -= dt;
                if self.feather_timer <= 0.0 {
                    self.feather_timer = FEATHER_INTERVAL;
                    events.push(GameEvent::Feathers {
                        pos: Vec2::new(self.center().x, self.pos.y),
                    });
                }
                if self.timer > FEATHER_RAIN_DURATION {
                    self.enter_state(BossState::Hover);
                }
            }
        }
    }

    /// Register a hit. Returns true when this hit defeats the boss.
    pub fn take_damage(&mut self) -> bool {
        self.health = self.health.saturating_sub(1);
        self.vel = Vec2::ZERO;
        self.enter_state(BossState::Stagger);
        if self.health == 0 {
            log::info!("Boss defeated!");
        }
        self.health == 0
    }

    fn enter_state(&mut self, next: BossState) {
        if next == BossState::Hover {
            // Resume bobbing from wherever the last attack left us
            self.anchor_y = self.pos.y - self.bob_phase.sin() * BOB_AMPLITUDE;
        }
        if next == BossState::FeatherRain {
            self.feather_timer = 0.0;
        }
        self.state = next;
        self.timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FIXED_STEP_MS;

    fn run_for(boss: &mut Boss, ms: f32, target: Vec2, events: &mut Vec<GameEvent>) {
        let ticks = (ms / FIXED_STEP_MS).ceil() as u32;
        for _ in 0..ticks {
            boss.update(FIXED_STEP_MS, target, events);
        }
    }

    #[test]
    fn test_five_hits_stagger_then_feather_rain() {
        let mut boss = Boss::new(Vec2::new(2800.0, 100.0));
        assert_eq!(boss.health, 10);
        for _ in 0..5 {
            assert!(!boss.take_damage());
            assert_eq!(boss.state(), BossState::Stagger);
        }
        assert_eq!(boss.health, 5);

        let mut events = Vec::new();
        // Just under the stagger duration: still staggered
        run_for(&mut boss, 950.0, Vec2::ZERO, &mut events);
        assert_eq!(boss.state(), BossState::Stagger);
        assert!(events.is_empty());
        run_for(&mut boss, 100.0, Vec2::ZERO, &mut events);
        assert_eq!(boss.state(), BossState::FeatherRain);

        run_for(&mut boss, 1000.0, Vec2::ZERO, &mut events);
        assert!(events.iter().all(|e| matches!(e, GameEvent::Feathers { .. })));
        assert!(events.len() >= 5);
    }

    #[test]
    fn test_hover_swoop_cycle() {
        let mut boss = Boss::new(Vec2::new(500.0, 100.0));
        let mut events = Vec::new();
        run_for(&mut boss, 3100.0, Vec2::new(100.0, 400.0), &mut events);
        assert_eq!(boss.state(), BossState::Swoop);

        let before = boss.pos;
        run_for(&mut boss, 500.0, Vec2::new(100.0, 400.0), &mut events);
        // Heading toward the player (down-left)
        assert!(boss.pos.x < before.x);
        assert!(boss.pos.y > before.y);

        run_for(&mut boss, 1600.0, Vec2::new(100.0, 400.0), &mut events);
        assert_eq!(boss.state(), BossState::Hover);
    }

    #[test]
    fn test_swoop_onto_target_does_not_produce_nan() {
        let mut boss = Boss::new(Vec2::new(0.0, 0.0));
        boss.enter_state(BossState::Swoop);
        let mut events = Vec::new();
        boss.update(FIXED_STEP_MS, Vec2::ZERO, &mut events);
        assert!(boss.pos.is_finite());
    }

    #[test]
    fn test_tenth_hit_defeats() {
        let mut boss = Boss::new(Vec2::ZERO);
        for _ in 0..9 {
            assert!(!boss.take_damage());
        }
        assert!(boss.take_damage());
        assert!(boss.is_defeated());
        // Extra hits never underflow
        boss.take_damage();
        assert_eq!(boss.health, 0);
    }
}
