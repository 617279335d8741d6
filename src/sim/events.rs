//! Discrete gameplay events
//!
//! The simulation never calls audio, particles or persistence directly. It
//! records what happened during a tick and the engine dispatches each event
//! to every observer exactly once after the tick completes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// How a jump was initiated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpKind {
    Ground,
    /// Jump honored inside the coyote window after leaving a ledge
    Coyote,
    Double,
    Wall,
}

/// Progress snapshot attached to save-worthy events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub coins: u32,
    pub score: u64,
    pub level: u32,
    pub health: u8,
}

/// Something observable happened inside a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jump { pos: Vec2, kind: JumpKind },
    Land { pos: Vec2, impact_speed: f32 },
    Stomp { pos: Vec2 },
    CoinCollect { pos: Vec2, progress: Progress },
    Damage { health: u8 },
    BossHit { pos: Vec2, health: u8 },
    BossDefeated { pos: Vec2 },
    Checkpoint { pos: Vec2, progress: Progress },
    Launch { pos: Vec2 },
    GoalReached,
    GameOver,
    /// Footstep/skid/landing dust
    Dust { pos: Vec2, count: u32 },
    /// Wall-slide friction sparks
    Sparks { pos: Vec2 },
    /// Boss feather-rain attack cue
    Feathers { pos: Vec2 },
}

/// Collaborator notified of simulation events.
///
/// Every hook defaults to a no-op so observers only implement what they need.
#[allow(unused_variables)]
pub trait GameObserver {
    fn on_jump(&mut self, pos: Vec2, kind: JumpKind) {}
    fn on_land(&mut self, pos: Vec2, impact_speed: f32) {}
    fn on_stomp(&mut self, pos: Vec2) {}
    fn on_coin_collect(&mut self, pos: Vec2, progress: &Progress) {}
    fn on_damage(&mut self, health: u8) {}
    fn on_boss_hit(&mut self, pos: Vec2, health: u8) {}
    fn on_boss_defeated(&mut self, pos: Vec2) {}
    fn on_checkpoint(&mut self, pos: Vec2, progress: &Progress) {}
    fn on_launch(&mut self, pos: Vec2) {}
    fn on_goal(&mut self) {}
    fn on_game_over(&mut self) {}
    fn on_dust(&mut self, pos: Vec2, count: u32) {}
    fn on_sparks(&mut self, pos: Vec2) {}
    fn on_feathers(&mut self, pos: Vec2) {}
}

impl GameEvent {
    /// Route this event to the matching observer hook
    pub fn dispatch(&self, observer: &mut dyn GameObserver) {
        match *self {
            GameEvent::Jump { pos, kind } => observer.on_jump(pos, kind),
            GameEvent::Land { pos, impact_speed } => observer.on_land(pos, impact_speed),
            GameEvent::Stomp { pos } => observer.on_stomp(pos),
            GameEvent::CoinCollect { pos, ref progress } => observer.on_coin_collect(pos, progress),
            GameEvent::Damage { health } => observer.on_damage(health),
            GameEvent::BossHit { pos, health } => observer.on_boss_hit(pos, health),
            GameEvent::BossDefeated { pos } => observer.on_boss_defeated(pos),
            GameEvent::Checkpoint { pos, ref progress } => observer.on_checkpoint(pos, progress),
            GameEvent::Launch { pos } => observer.on_launch(pos),
            GameEvent::GoalReached => observer.on_goal(),
            GameEvent::GameOver => observer.on_game_over(),
            GameEvent::Dust { pos, count } => observer.on_dust(pos, count),
            GameEvent::Sparks { pos } => observer.on_sparks(pos),
            GameEvent::Feathers { pos } => observer.on_feathers(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        jumps: u32,
        coins: u32,
        last_score: u64,
    }

    impl GameObserver for Counter {
        fn on_jump(&mut self, _pos: Vec2, _kind: JumpKind) {
            self.jumps += 1;
        }

        fn on_coin_collect(&mut self, _pos: Vec2, progress: &Progress) {
            self.coins += 1;
            self.last_score = progress.score;
        }
    }

    #[test]
    fn test_dispatch_routes_to_hooks() {
        let progress = Progress {
            coins: 1,
            score: 100,
            level: 1,
            health: 3,
        };
        let events = [
            GameEvent::Jump {
                pos: Vec2::ZERO,
                kind: JumpKind::Ground,
            },
            GameEvent::CoinCollect {
                pos: Vec2::ONE,
                progress,
            },
            GameEvent::GameOver,
        ];

        let mut counter = Counter::default();
        for event in &events {
            event.dispatch(&mut counter);
        }
        assert_eq!(counter.jumps, 1);
        assert_eq!(counter.coins, 1);
        assert_eq!(counter.last_score, 100);
    }
}
