//! Player controller
//!
//! An explicit state machine: each tick the current state picks which
//! acceleration and branches apply, then the same integration runs for every
//! state (acceleration -> velocity -> friction -> speed clamp -> position).
//!
//! Contact flags are written by the world step after the controller runs and
//! are only read here, one tick later. The controller never sets them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Contacts};
use super::events::{GameEvent, JumpKind};
use super::input::InputSnapshot;
use crate::consts::{PLAYER_HEIGHT, PLAYER_MAX_HEALTH, PLAYER_WIDTH};
use crate::tuning::PlayerTuning;

// Squash & stretch targets (x, y)
const JUMP_SQUASH: Vec2 = Vec2::new(1.3, 0.7);
const PEAK_STRETCH: Vec2 = Vec2::new(0.9, 1.1);
const LAND_SQUASH: Vec2 = Vec2::new(1.4, 0.6);
const SCALE_LERP: f32 = 0.2;
const SCALE_RELAX: f32 = 0.15;
/// |vy| under which the jump apex stretch applies
const APEX_SPEED: f32 = 50.0;
/// Interval (ms) between run dust puffs and wall-slide sparks
const CUE_INTERVAL: f32 = 100.0;
const DOUBLE_JUMP_SCALE: f32 = 0.85;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Idle,
    Run,
    /// Ascending; `cut` records that the early-release dampening was spent
    Jump { cut: bool },
    Fall,
    Skid,
    WallSlide,
}

impl PlayerState {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerState::Idle => "idle",
            PlayerState::Run => "run",
            PlayerState::Jump { .. } => "jump",
            PlayerState::Fall => "fall",
            PlayerState::Skid => "skid",
            PlayerState::WallSlide => "wallSlide",
        }
    }

    pub fn is_jump(&self) -> bool {
        matches!(self, PlayerState::Jump { .. })
    }
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Horizontal acceleration accumulator, cleared every tick
    pub ax: f32,
    pub size: Vec2,
    pub facing_right: bool,
    pub health: u8,
    /// Visual scale (decorative)
    pub scale: Vec2,
    target_scale: Vec2,

    state: PlayerState,
    contacts: Contacts,
    in_water: bool,

    coyote_timer: f32,
    jump_buffer_timer: f32,
    can_double_jump: bool,
    attack_timer: f32,
    attack_landed: bool,
    invincibility_timer: f32,
    /// Vertical speed after the last integration, before world resolution
    fall_speed: f32,
    cue_timer: f32,
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            ax: 0.0,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            facing_right: true,
            health: PLAYER_MAX_HEALTH,
            scale: Vec2::ONE,
            target_scale: Vec2::ONE,
            state: PlayerState::Idle,
            contacts: Contacts::default(),
            in_water: false,
            coyote_timer: 0.0,
            jump_buffer_timer: 0.0,
            can_double_jump: false,
            attack_timer: 0.0,
            attack_landed: false,
            invincibility_timer: 0.0,
            fall_speed: 0.0,
            cue_timer: 0.0,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    /// Bottom-center of the body
    pub fn feet(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size.x / 2.0, self.pos.y + self.size.y)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn contacts(&self) -> Contacts {
        self.contacts
    }

    pub fn grounded(&self) -> bool {
        self.contacts.grounded
    }

    pub fn in_water(&self) -> bool {
        self.in_water
    }

    pub fn coyote_timer(&self) -> f32 {
        self.coyote_timer
    }

    pub fn jump_buffer_timer(&self) -> f32 {
        self.jump_buffer_timer
    }

    pub fn can_double_jump(&self) -> bool {
        self.can_double_jump
    }

    /// Vertical speed from the last integration, before the world pushed back
    pub fn fall_speed(&self) -> f32 {
        self.fall_speed
    }

    pub fn is_attacking(&self) -> bool {
        self.attack_timer > 0.0
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility_timer > 0.0
    }

    /// Record contact flags for the next controller update (world step only)
    pub(crate) fn set_contacts(&mut self, contacts: Contacts, in_water: bool) {
        self.contacts = contacts;
        self.in_water = in_water;
    }

    /// Claim the current attack's single hit; false if already spent
    pub(crate) fn claim_attack_hit(&mut self) -> bool {
        if self.is_attacking() && !self.attack_landed {
            self.attack_landed = true;
            true
        } else {
            false
        }
    }

    pub(crate) fn grant_invincibility(&mut self, ms: f32) {
        self.invincibility_timer = ms;
    }

    /// Place the body back at `spawn`, motionless and airborne
    pub fn respawn(&mut self, spawn: Vec2) {
        self.pos = spawn;
        self.vel = Vec2::ZERO;
        self.ax = 0.0;
        self.contacts = Contacts::default();
        self.in_water = false;
        self.coyote_timer = 0.0;
        self.jump_buffer_timer = 0.0;
        self.attack_timer = 0.0;
        self.scale = Vec2::ONE;
        self.target_scale = Vec2::ONE;
        self.enter_state(PlayerState::Fall);
    }

    /// Advance the controller by one fixed tick
    pub fn update(
        &mut self,
        input: &InputSnapshot,
        tuning: &PlayerTuning,
        dt: f32,
        events: &mut Vec<GameEvent>,
    ) {
        if input.attack_just_pressed && !self.is_attacking() {
            self.attack_timer = tuning.attack_duration;
            self.attack_landed = false;
        }

        let was_jump = self.state.is_jump();
        match self.state {
            PlayerState::Idle => self.update_idle(input, tuning, events),
            PlayerState::Run => self.update_run(input, tuning, dt, events),
            PlayerState::Jump { cut } => self.update_jump(input, tuning, cut),
            PlayerState::Fall => self.update_fall(input, tuning, events),
            PlayerState::Skid => self.update_skid(input, tuning, events),
            PlayerState::WallSlide => self.update_wall_slide(input, tuning, dt, events),
        }

        let jumped = !was_jump && self.state.is_jump();
        self.integrate(input, tuning, dt, jumped);
        self.update_squash_stretch();
    }

    // === STATE UPDATES ===

    fn update_idle(&mut self, input: &InputSnapshot, t: &PlayerTuning, events: &mut Vec<GameEvent>) {
        if self.wants_to_jump(input) && self.can_ground_jump() {
            self.do_jump(t, events);
            return;
        }
        if !self.grounded() {
            self.enter_state(PlayerState::Fall);
            return;
        }
        if input.any_horizontal() {
            self.enter_state(PlayerState::Run);
            return;
        }

        self.vel.x *= t.friction;
    }

    fn update_run(
        &mut self,
        input: &InputSnapshot,
        t: &PlayerTuning,
        dt: f32,
        events: &mut Vec<GameEvent>,
    ) {
        if self.wants_to_jump(input) && self.can_ground_jump() {
            self.do_jump(t, events);
            return;
        }
        if !self.grounded() {
            self.enter_state(PlayerState::Fall);
            return;
        }
        if !input.any_horizontal() {
            self.enter_state(PlayerState::Idle);
            return;
        }
        if (input.left && self.vel.x > t.skid_threshold)
            || (input.right && self.vel.x < -t.skid_threshold)
        {
            self.enter_state(PlayerState::Skid);
            return;
        }

        let dir = input.horizontal();
        self.ax = dir * t.acceleration;
        self.facing_right = dir > 0.0;

        self.cue_timer += dt;
        if self.cue_timer > CUE_INTERVAL {
            self.cue_timer = 0.0;
            events.push(GameEvent::Dust {
                pos: self.feet(),
                count: 2,
            });
        }
    }

    fn update_jump(&mut self, input: &InputSnapshot, t: &PlayerTuning, cut: bool) {
        if self.contacts.on_wall() && self.vel.y > 0.0 {
            self.enter_state(PlayerState::WallSlide);
            return;
        }
        if self.vel.y >= 0.0 {
            self.enter_state(PlayerState::Fall);
            return;
        }

        // Variable jump height: one-time dampening on early release
        if !cut && !input.jump_held {
            self.vel.y *= t.jump_cut;
            self.state = PlayerState::Jump { cut: true };
        }

        self.apply_air_control(input, t);

        if self.vel.y.abs() < APEX_SPEED {
            self.target_scale = PEAK_STRETCH;
        }
    }

    fn update_fall(&mut self, input: &InputSnapshot, t: &PlayerTuning, events: &mut Vec<GameEvent>) {
        if self.grounded() {
            self.do_land(events);
            // A buffered press fires on the landing tick itself
            if self.wants_to_jump(input) {
                self.do_jump(t, events);
            }
            return;
        }

        if (self.contacts.left_wall && input.left) || (self.contacts.right_wall && input.right) {
            self.enter_state(PlayerState::WallSlide);
            return;
        }

        if self.wants_to_jump(input) {
            if self.coyote_timer > 0.0 {
                self.do_jump(t, events);
                return;
            }
            if self.can_double_jump {
                self.can_double_jump = false;
                self.jump_buffer_timer = 0.0;
                self.vel.y = -t.double_jump_force * DOUBLE_JUMP_SCALE;
                self.target_scale = JUMP_SQUASH;
                events.push(GameEvent::Jump {
                    pos: self.feet(),
                    kind: JumpKind::Double,
                });
                self.enter_state(PlayerState::Jump { cut: false });
                return;
            }
        }

        self.apply_air_control(input, t);
    }

    fn update_skid(&mut self, input: &InputSnapshot, t: &PlayerTuning, events: &mut Vec<GameEvent>) {
        self.vel.x *= t.skid_friction;
        events.push(GameEvent::Dust {
            pos: self.feet(),
            count: 1,
        });

        if self.wants_to_jump(input) && self.can_ground_jump() {
            self.do_jump(t, events);
            return;
        }
        if !self.grounded() {
            self.enter_state(PlayerState::Fall);
            return;
        }
        if self.vel.x.abs() < t.skid_exit_speed {
            if input.any_horizontal() {
                self.enter_state(PlayerState::Run);
            } else {
                self.enter_state(PlayerState::Idle);
            }
        }
    }

    fn update_wall_slide(
        &mut self,
        input: &InputSnapshot,
        t: &PlayerTuning,
        dt: f32,
        events: &mut Vec<GameEvent>,
    ) {
        self.vel.y = self.vel.y.min(t.wall_slide_speed);

        if self.grounded() {
            self.enter_state(PlayerState::Idle);
            return;
        }

        let on_left = self.contacts.left_wall;
        if self.wants_to_jump(input) {
            self.vel.x = if on_left {
                t.wall_jump_force_x
            } else {
                -t.wall_jump_force_x
            };
            self.vel.y = -t.wall_jump_force_y;
            self.facing_right = on_left;
            self.coyote_timer = 0.0;
            self.jump_buffer_timer = 0.0;
            let wall_x = if on_left {
                self.pos.x
            } else {
                self.pos.x + self.size.x
            };
            events.push(GameEvent::Jump {
                pos: Vec2::new(wall_x, self.pos.y + self.size.y / 2.0),
                kind: JumpKind::Wall,
            });
            self.enter_state(PlayerState::Jump { cut: false });
            return;
        }

        if (self.contacts.left_wall && !input.left) || (self.contacts.right_wall && !input.right) {
            self.enter_state(PlayerState::Fall);
            return;
        }
        if !self.contacts.on_wall() {
            self.enter_state(PlayerState::Fall);
            return;
        }

        // Keep pressing into the wall so contact persists
        self.apply_air_control(input, t);

        self.cue_timer += dt;
        if self.cue_timer > CUE_INTERVAL {
            self.cue_timer = 0.0;
            let spark_x = if on_left {
                self.pos.x
            } else {
                self.pos.x + self.size.x
            };
            events.push(GameEvent::Sparks {
                pos: Vec2::new(spark_x, self.pos.y + self.size.y * 0.7),
            });
        }
    }

    // === HELPERS ===

    fn enter_state(&mut self, next: PlayerState) {
        self.on_state_exit(self.state);
        self.state = next;
        self.on_state_enter(next);
    }

    fn on_state_enter(&mut self, state: PlayerState) {
        match state {
            PlayerState::Idle => self.ax = 0.0,
            PlayerState::WallSlide => self.can_double_jump = true,
            _ => {}
        }
    }

    fn on_state_exit(&mut self, state: PlayerState) {
        if matches!(state, PlayerState::Run | PlayerState::WallSlide) {
            self.cue_timer = 0.0;
        }
    }

    fn wants_to_jump(&self, input: &InputSnapshot) -> bool {
        input.jump_just_pressed || self.jump_buffer_timer > 0.0
    }

    fn can_ground_jump(&self) -> bool {
        self.grounded() || self.coyote_timer > 0.0
    }

    fn do_jump(&mut self, t: &PlayerTuning, events: &mut Vec<GameEvent>) {
        let kind = if self.grounded() {
            JumpKind::Ground
        } else {
            JumpKind::Coyote
        };
        self.vel.y = -t.jump_force;
        self.coyote_timer = 0.0;
        self.jump_buffer_timer = 0.0;
        self.target_scale = JUMP_SQUASH;
        events.push(GameEvent::Jump {
            pos: self.feet(),
            kind,
        });
        self.enter_state(PlayerState::Jump { cut: false });
    }

    fn do_land(&mut self, events: &mut Vec<GameEvent>) {
        self.target_scale = LAND_SQUASH;
        events.push(GameEvent::Land {
            pos: self.feet(),
            impact_speed: self.fall_speed,
        });
        self.enter_state(PlayerState::Idle);
    }

    fn apply_air_control(&mut self, input: &InputSnapshot, t: &PlayerTuning) {
        let dir = input.horizontal();
        self.ax = dir * t.acceleration * t.air_control;
        if dir != 0.0 {
            self.facing_right = dir > 0.0;
        }
    }

    /// Fixed-order integration shared by every state
    fn integrate(&mut self, input: &InputSnapshot, t: &PlayerTuning, dt: f32, jumped: bool) {
        let dt_sec = dt / 1000.0;
        let grounded = self.grounded();

        self.vel.x += self.ax * dt_sec;
        if grounded && !input.any_horizontal() {
            self.vel.x *= t.friction;
        }
        self.vel.x = self.vel.x.clamp(-t.max_speed, t.max_speed);

        // Gravity always pulls so resting bodies keep re-touching the ground
        let water = if self.in_water { 0.5 } else { 1.0 };
        let max_fall = if self.state == PlayerState::WallSlide {
            t.wall_slide_speed
        } else {
            t.max_fall_speed * water
        };
        self.vel.y = (self.vel.y + t.gravity * water * dt_sec).min(max_fall);

        self.pos += self.vel * dt_sec;
        self.fall_speed = self.vel.y;

        if grounded {
            self.can_double_jump = true;
        }
        // A jump taken this tick already closed both windows
        if !jumped {
            if grounded {
                self.coyote_timer = t.coyote_time;
            } else {
                self.coyote_timer -= dt;
            }

            if input.jump_just_pressed {
                self.jump_buffer_timer = t.jump_buffer;
            } else {
                self.jump_buffer_timer -= dt;
            }
        }

        if self.attack_timer > 0.0 {
            self.attack_timer -= dt;
        }
        if self.invincibility_timer > 0.0 {
            self.invincibility_timer -= dt;
        }

        self.ax = 0.0;
    }

    fn update_squash_stretch(&mut self) {
        self.scale += (self.target_scale - self.scale) * SCALE_LERP;
        self.target_scale += (Vec2::ONE - self.target_scale) * SCALE_RELAX;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FIXED_STEP_MS;

    const DT: f32 = FIXED_STEP_MS;

    fn grounded() -> Contacts {
        Contacts {
            grounded: true,
            ..Default::default()
        }
    }

    fn press_jump() -> InputSnapshot {
        InputSnapshot {
            jump_held: true,
            jump_just_pressed: true,
            ..Default::default()
        }
    }

    fn hold_jump() -> InputSnapshot {
        InputSnapshot {
            jump_held: true,
            ..Default::default()
        }
    }

    /// Run one controller tick with the given contacts already recorded
    fn step(player: &mut Player, contacts: Contacts, input: InputSnapshot) -> Vec<GameEvent> {
        let mut events = Vec::new();
        player.set_contacts(contacts, false);
        player.update(&input, &PlayerTuning::default(), DT, &mut events);
        events
    }

    fn standing() -> Player {
        let mut player = Player::new(Vec2::ZERO);
        step(&mut player, grounded(), InputSnapshot::default());
        player.vel.y = 0.0;
        player
    }

    #[test]
    fn test_ground_jump_sets_full_force() {
        let mut player = standing();
        let events = step(&mut player, grounded(), press_jump());

        assert!(player.state().is_jump());
        let gravity_step = 1200.0 * DT / 1000.0;
        assert!((player.vel.y - (-380.0 + gravity_step)).abs() < 1e-3);
        assert_eq!(player.coyote_timer(), 0.0);
        assert!(matches!(
            events.as_slice(),
            [GameEvent::Jump {
                kind: JumpKind::Ground,
                ..
            }]
        ));
    }

    #[test]
    fn test_friction_decays_without_sign_flip() {
        let mut player = standing();
        player.vel.x = 200.0;
        let mut prev = player.vel.x;
        for _ in 0..60 {
            step(&mut player, grounded(), InputSnapshot::default());
            assert!(player.vel.x >= 0.0);
            assert!(player.vel.x < prev || player.vel.x == 0.0);
            prev = player.vel.x;
        }
        assert!(player.vel.x < 0.01);
        assert_eq!(player.state(), PlayerState::Idle);
    }

    #[test]
    fn test_coyote_window() {
        // Leaves the ledge on the first tick without ground contact. The window
        // is COYOTE_TIME / FIXED_STEP = 6 ticks; the 7th is too late.
        for (late_ticks, should_jump) in [(0, true), (3, true), (5, true), (6, true), (7, false)] {
            let mut player = standing();
            player.can_double_jump = false;
            for _ in 0..late_ticks {
                step(&mut player, Contacts::default(), InputSnapshot::default());
                player.can_double_jump = false;
            }
            let vy_before = player.vel.y;
            let events = step(&mut player, Contacts::default(), press_jump());

            if should_jump {
                assert!(player.state().is_jump(), "tick {late_ticks} should jump");
                assert!(player.vel.y < -350.0);
                assert!(matches!(
                    events.as_slice(),
                    [GameEvent::Jump { .. }]
                ));
            } else {
                assert_eq!(player.state(), PlayerState::Fall, "tick {late_ticks}");
                assert!(player.vel.y > vy_before);
            }
        }
    }

    #[test]
    fn test_coyote_jump_beats_double_jump() {
        let mut player = standing();
        step(&mut player, Contacts::default(), InputSnapshot::default());
        assert!(player.can_double_jump());
        let events = step(&mut player, Contacts::default(), press_jump());
        assert!(matches!(
            events.as_slice(),
            [GameEvent::Jump {
                kind: JumpKind::Coyote,
                ..
            }]
        ));
        // Double jump is still in the bank
        assert!(player.can_double_jump());
    }

    #[test]
    fn test_double_jump_is_single_use() {
        let mut player = standing();
        step(&mut player, grounded(), press_jump());
        // Ascend until falling
        while player.state().is_jump() {
            step(&mut player, Contacts::default(), hold_jump());
        }
        assert_eq!(player.state(), PlayerState::Fall);
        // Let the coyote window lapse
        for _ in 0..8 {
            step(&mut player, Contacts::default(), hold_jump());
        }

        let events = step(&mut player, Contacts::default(), press_jump());
        assert!(matches!(
            events.as_slice(),
            [GameEvent::Jump {
                kind: JumpKind::Double,
                ..
            }]
        ));
        assert!(!player.can_double_jump());
        let expected = -380.0 * 0.85 + 1200.0 * DT / 1000.0;
        assert!((player.vel.y - expected).abs() < 1e-3);

        while player.state().is_jump() {
            step(&mut player, Contacts::default(), hold_jump());
        }
        let events = step(&mut player, Contacts::default(), press_jump());
        assert!(events.is_empty());
        assert_eq!(player.state(), PlayerState::Fall);

        // Touching ground restores it
        step(&mut player, grounded(), InputSnapshot::default());
        assert!(player.can_double_jump());
    }

    #[test]
    fn test_jump_buffer_fires_on_landing_tick() {
        let mut player = standing();
        player.state = PlayerState::Fall;
        player.contacts = Contacts::default();
        player.coyote_timer = 0.0;
        player.can_double_jump = false;
        player.vel.y = 300.0;

        // Press two ticks before touching down
        step(&mut player, Contacts::default(), press_jump());
        assert_eq!(player.state(), PlayerState::Fall);
        assert!(player.jump_buffer_timer() > 0.0);
        step(&mut player, Contacts::default(), hold_jump());

        player.vel.y = 0.0;
        let events = step(&mut player, grounded(), hold_jump());
        assert!(player.state().is_jump());
        assert!(player.vel.y < -350.0);
        assert!(matches!(events[0], GameEvent::Land { .. }));
        assert!(matches!(
            events[1],
            GameEvent::Jump {
                kind: JumpKind::Ground,
                ..
            }
        ));
        assert!(player.jump_buffer_timer() <= 0.0);
    }

    #[test]
    fn test_expired_buffer_does_not_jump() {
        let mut player = standing();
        player.state = PlayerState::Fall;
        player.coyote_timer = 0.0;
        player.can_double_jump = false;

        step(&mut player, Contacts::default(), press_jump());
        for _ in 0..6 {
            step(&mut player, Contacts::default(), hold_jump());
        }
        step(&mut player, grounded(), hold_jump());
        assert_eq!(player.state(), PlayerState::Idle);
    }

    #[test]
    fn test_jump_cut_applies_once() {
        let mut player = standing();
        step(&mut player, grounded(), press_jump());
        let vy = player.vel.y;

        step(&mut player, Contacts::default(), InputSnapshot::default());
        let gravity_step = 1200.0 * DT / 1000.0;
        let cut_vy = vy * 0.5 + gravity_step;
        assert!((player.vel.y - cut_vy).abs() < 1e-3);
        assert_eq!(player.state(), PlayerState::Jump { cut: true });

        step(&mut player, Contacts::default(), InputSnapshot::default());
        assert!((player.vel.y - (cut_vy + gravity_step)).abs() < 1e-3);
    }

    #[test]
    fn test_run_then_skid_on_reversal() {
        let mut player = standing();
        let right = InputSnapshot {
            right: true,
            ..Default::default()
        };
        step(&mut player, grounded(), right);
        assert_eq!(player.state(), PlayerState::Run);
        for _ in 0..20 {
            step(&mut player, grounded(), right);
        }
        assert!(player.vel.x > 50.0);
        assert!(player.facing_right);

        let left = InputSnapshot {
            left: true,
            ..Default::default()
        };
        step(&mut player, grounded(), left);
        assert_eq!(player.state(), PlayerState::Skid);
        for _ in 0..30 {
            step(&mut player, grounded(), left);
        }
        assert_eq!(player.state(), PlayerState::Run);
    }

    #[test]
    fn test_jump_enters_wall_slide_only_when_descending() {
        let mut player = standing();
        step(&mut player, grounded(), press_jump());
        let wall = Contacts {
            right_wall: true,
            ..Default::default()
        };
        let right = InputSnapshot {
            right: true,
            jump_held: true,
            ..Default::default()
        };

        // Still rising: the wall is ignored
        step(&mut player, wall, right);
        assert!(player.state().is_jump());

        player.vel.y = 50.0;
        step(&mut player, wall, right);
        assert_eq!(player.state(), PlayerState::WallSlide);
        assert!(player.can_double_jump());
    }

    #[test]
    fn test_player_state_survives_serde() {
        let mut player = standing();
        step(&mut player, grounded(), press_jump());
        let wall = Contacts {
            left_wall: true,
            ..Default::default()
        };
        step(&mut player, wall, hold_jump());

        let json = serde_json::to_string(&player).unwrap();
        let restored: Player = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.state(), player.state());
        assert_eq!(restored.contacts(), wall);
        assert!((restored.pos - player.pos).length() < 1e-4);
        assert!((restored.vel - player.vel).length() < 1e-4);
        assert!((restored.coyote_timer() - player.coyote_timer()).abs() < 1e-4);
    }

    #[test]
    fn test_wall_slide_and_wall_jump() {
        let mut player = standing();
        player.state = PlayerState::Fall;
        player.can_double_jump = false;
        player.coyote_timer = 0.0;
        player.vel.y = 200.0;
        let wall = Contacts {
            left_wall: true,
            ..Default::default()
        };
        let left = InputSnapshot {
            left: true,
            ..Default::default()
        };

        step(&mut player, wall, left);
        assert_eq!(player.state(), PlayerState::WallSlide);
        assert!(player.can_double_jump());

        step(&mut player, wall, left);
        assert!(player.vel.y <= 80.0);

        let jump = InputSnapshot {
            left: true,
            jump_held: true,
            jump_just_pressed: true,
            ..Default::default()
        };
        let events = step(&mut player, wall, jump);
        assert!(player.state().is_jump());
        assert!(player.vel.x > 0.0);
        assert!(player.facing_right);
        assert!(matches!(
            events.as_slice(),
            [GameEvent::Jump {
                kind: JumpKind::Wall,
                ..
            }]
        ));
    }

    #[test]
    fn test_releasing_wall_falls() {
        let mut player = standing();
        player.state = PlayerState::WallSlide;
        let wall = Contacts {
            right_wall: true,
            ..Default::default()
        };
        step(&mut player, wall, InputSnapshot::default());
        assert_eq!(player.state(), PlayerState::Fall);
    }

    #[test]
    fn test_attack_single_hit_per_swing() {
        let mut player = standing();
        let attack = InputSnapshot {
            attack_just_pressed: true,
            ..Default::default()
        };
        step(&mut player, grounded(), attack);
        assert!(player.is_attacking());
        assert!(player.claim_attack_hit());
        assert!(!player.claim_attack_hit());

        for _ in 0..20 {
            step(&mut player, grounded(), InputSnapshot::default());
        }
        assert!(!player.is_attacking());
        assert!(!player.claim_attack_hit());
    }

    #[test]
    fn test_squash_relaxes_to_unit_scale() {
        let mut player = standing();
        step(&mut player, grounded(), press_jump());
        assert!(player.scale.x > 1.0 && player.scale.y < 1.0);
        for _ in 0..120 {
            step(&mut player, grounded(), InputSnapshot::default());
        }
        assert!((player.scale - Vec2::ONE).length() < 0.01);
    }
}
