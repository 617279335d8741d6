//! Fixed-timestep driver
//!
//! The engine owns every simulation collaborator and advances them in
//! lockstep: one input snapshot, one scene update and at most one world step
//! per fixed tick. Events from a step are dispatched once to particles,
//! audio, autosave and any registered observers before the next tick.

use glam::Vec2;

use crate::audio::{AudioChannels, SoundEffect};
use crate::persistence::{Autosave, SaveData};
use crate::platform::InputTracker;
use crate::settings::Settings;
use crate::sim::{
    BossState, Entity, FixedTimestep, GameObserver, InputSnapshot, Level, ParticleFx,
    ParticlePool, PlayerState, SceneChange, SceneDirector, SceneId, World, WorldPhase, tick,
};
use crate::tuning::Tuning;
use crate::{Result, lerp};

pub use crate::sim::FrameReport;

const ALL_SCENES: [SceneId; 5] = [
    SceneId::Title,
    SceneId::Game,
    SceneId::Pause,
    SceneId::GameOver,
    SceneId::Victory,
];

/// Boss pose for the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossView {
    pub pos: Vec2,
    pub state: BossState,
    pub health: u8,
}

/// Read-only snapshot for the render collaborator
#[derive(Debug, Clone)]
pub struct RenderView<'a> {
    pub scene: Option<SceneId>,
    /// Interpolated between the last two ticks by `alpha`
    pub player_pos: Vec2,
    /// -1, 0 or 1 per axis
    pub player_vel_sign: Vec2,
    pub player_state: PlayerState,
    pub player_scale: Vec2,
    pub facing_right: bool,
    pub invincible: bool,
    /// Camera top-left including shake
    pub camera_offset: Vec2,
    pub boss: Option<BossView>,
    pub entities: &'a [Entity],
    pub particles: &'a ParticlePool,
    pub mosaic: f32,
    pub alpha: f32,
    pub score: u64,
    pub coins: u32,
    pub health: u8,
}

fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

pub struct Engine {
    clock: FixedTimestep,
    scenes: SceneDirector,
    pub world: World,
    pub tuning: Tuning,
    pub particles: ParticleFx,
    pub audio: AudioChannels,
    settings: Settings,
    /// Level entered from the title screen
    level: Level,
    observers: Vec<Box<dyn GameObserver>>,
    autosave: Option<Autosave>,
    /// Progress to restore on the next game entry
    pending_restore: Option<SaveData>,
    prev_player_pos: Vec2,
    alpha: f32,
}

impl Engine {
    /// Engine on the title screen with the built-in level queued
    pub fn new(seed: u64, settings: Settings) -> Self {
        let mut scenes = SceneDirector::default();
        for id in ALL_SCENES {
            scenes.register(id);
        }

        let mut engine = Self {
            clock: FixedTimestep::default(),
            scenes,
            world: World::new(seed),
            tuning: Tuning::default(),
            particles: ParticleFx::new(settings.max_particles(), seed ^ 0x9e37_79b9),
            audio: AudioChannels::default(),
            settings: Settings::default(),
            level: Level::duncan_forest(),
            observers: Vec::new(),
            autosave: None,
            pending_restore: None,
            prev_player_pos: Vec2::ZERO,
            alpha: 0.0,
        };
        engine.apply_settings(settings);
        // Title is registered above, so this cannot fail
        if let Ok(Some(change)) = engine.scenes.switch_to(SceneId::Title, false) {
            engine.enter(change);
        }
        engine
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn GameObserver>) {
        self.observers.push(observer);
    }

    pub fn set_autosave(&mut self, autosave: Autosave) {
        self.autosave = Some(autosave);
    }

    pub fn autosave(&self) -> Option<&Autosave> {
        self.autosave.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Push preferences into the camera, audio and particle pool
    pub fn apply_settings(&mut self, settings: Settings) {
        self.world
            .camera
            .set_shake_enabled(settings.effective_screen_shake());
        self.audio.apply_settings(&settings);

        let cap = settings.max_particles();
        if cap != self.particles.pool.capacity() {
            log::info!("Particle pool resized to {cap}");
            self.particles.pool = ParticlePool::new(cap);
        }
        self.particles.enabled = settings.particles;
        self.settings = settings;
    }

    pub fn scene(&self) -> Option<SceneId> {
        self.scenes.current()
    }

    pub fn is_transitioning(&self) -> bool {
        self.scenes.is_transitioning()
    }

    pub fn is_paused(&self) -> bool {
        self.scenes.current() == Some(SceneId::Pause)
    }

    /// Switch scenes, applying the change at once or at the transition midpoint
    pub fn switch_scene(&mut self, id: SceneId, with_transition: bool) -> Result<()> {
        if let Some(change) = self.scenes.switch_to(id, with_transition)? {
            self.enter(change);
        }
        Ok(())
    }

    /// Start a game from the autosave slot, if it holds one
    pub fn continue_from_save(&mut self) -> bool {
        let Some(save) = self.autosave.as_ref().and_then(|a| a.load()) else {
            return false;
        };
        log::info!("Continuing from save (score {}, coins {})", save.score, save.coins);
        self.pending_restore = Some(save);
        self.request(SceneId::Game);
        true
    }

    pub fn start(&mut self, now_ms: f64) {
        self.clock.start(now_ms);
    }

    pub fn stop(&mut self) {
        self.clock.stop();
    }

    /// Run every fixed tick owed since the last display frame
    pub fn frame(&mut self, now_ms: f64, input: &mut InputTracker) -> FrameReport {
        if !self.clock.is_running() {
            self.clock.start(now_ms);
            return FrameReport::default();
        }

        let mut clock = std::mem::take(&mut self.clock);
        let report = clock.frame(now_ms, |dt| self.step(dt, input));
        self.clock = clock;
        self.alpha = report.alpha;
        report
    }

    fn step(&mut self, dt: f32, input: &mut InputTracker) {
        let snap = input.snapshot();

        if let Some(change) = self.scenes.update(dt) {
            self.enter(change);
        }

        match self.scenes.current() {
            Some(SceneId::Title) => {
                if snap.confirm || snap.jump_just_pressed {
                    self.request(SceneId::Game);
                }
            }
            Some(SceneId::Game) => self.step_game(&snap, dt),
            Some(SceneId::Pause) => {
                if snap.pause || snap.confirm {
                    self.request_now(SceneId::Game);
                }
            }
            Some(SceneId::GameOver | SceneId::Victory) => {
                if snap.confirm {
                    self.request(SceneId::Title);
                }
            }
            None => {}
        }

        // Paused: every timer holds, including effects and voices
        if !self.is_paused() {
            self.particles.update(dt);
            self.audio.update(dt);
        }
    }

    fn step_game(&mut self, snap: &InputSnapshot, dt: f32) {
        if snap.pause && !self.scenes.is_transitioning() {
            self.request_now(SceneId::Pause);
            return;
        }

        self.prev_player_pos = self.world.player.pos;
        tick(&mut self.world, snap, &self.tuning, dt);
        self.dispatch_events();

        match self.world.phase {
            WorldPhase::Playing => {}
            WorldPhase::LevelComplete => self.request(SceneId::Victory),
            WorldPhase::GameOver => self.request(SceneId::GameOver),
        }
    }

    fn dispatch_events(&mut self) {
        let events = self.world.drain_events();
        if events.is_empty() {
            return;
        }
        if let Some(autosave) = self.autosave.as_mut() {
            autosave.totems = self.world.totems.found_ids();
        }

        for event in &events {
            event.dispatch(&mut self.particles);
            event.dispatch(&mut self.audio);
            if let Some(autosave) = self.autosave.as_mut() {
                event.dispatch(autosave);
            }
            for observer in self.observers.iter_mut() {
                event.dispatch(observer.as_mut());
            }
        }
    }

    fn request(&mut self, id: SceneId) {
        if let Err(e) = self.switch_scene(id, true) {
            log::warn!("Scene request dropped: {e}");
        }
    }

    fn request_now(&mut self, id: SceneId) {
        if let Err(e) = self.switch_scene(id, false) {
            log::warn!("Scene request dropped: {e}");
        }
    }

    fn enter(&mut self, change: SceneChange) {
        match (change.from, change.to) {
            // Resuming keeps the running level
            (Some(SceneId::Pause), SceneId::Game) => {}
            (_, SceneId::Game) => self.start_level(),
            (_, SceneId::Title) => {
                self.world.unload_level();
                self.particles.pool.clear();
                self.audio.stop_all();
            }
            _ => {}
        }
    }

    fn start_level(&mut self) {
        self.world.reset_progress();
        if let Some(save) = self.pending_restore.take() {
            self.world.score = save.score;
            self.world.coins = save.coins;
            self.world.totems.restore(&save.totems);
        }
        self.world.load_level(self.level.clone());
        self.prev_player_pos = self.world.player.pos;
        self.particles.pool.clear();
        self.audio.stop_all();
        self.audio.play(SoundEffect::Theme);
    }

    /// Snapshot of everything a renderer needs this display frame
    pub fn render_view(&self) -> RenderView<'_> {
        let player = &self.world.player;
        let player_pos = Vec2::new(
            lerp(self.prev_player_pos.x, player.pos.x, self.alpha),
            lerp(self.prev_player_pos.y, player.pos.y, self.alpha),
        );

        RenderView {
            scene: self.scenes.current(),
            player_pos,
            player_vel_sign: Vec2::new(sign(player.vel.x), sign(player.vel.y)),
            player_state: player.state(),
            player_scale: player.scale,
            facing_right: player.facing_right,
            invincible: player.is_invincible(),
            camera_offset: self.world.camera.render_offset(),
            boss: self.world.boss.as_ref().map(|b| BossView {
                pos: b.pos,
                state: b.state(),
                health: b.health,
            }),
            entities: self
                .world
                .level
                .as_ref()
                .map_or(&[][..], |l| l.entities.as_slice()),
            particles: &self.particles.pool,
            mosaic: self.scenes.mosaic(),
            alpha: self.alpha,
            score: self.world.score,
            coins: self.world.coins,
            health: player.health,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::persistence::{MemorySaveStore, SaveStore};
    use crate::platform::KeyMap;
    use crate::sim::EntityKind;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    struct Harness {
        engine: Engine,
        input: InputTracker,
        now: f64,
    }

    impl Harness {
        fn new() -> Self {
            let mut harness = Self {
                engine: Engine::new(42, Settings::default()),
                input: InputTracker::new(KeyMap::default()),
                now: 0.0,
            };
            // Starts the clock
            harness.engine.frame(0.0, &mut harness.input);
            harness
        }

        fn frames(&mut self, n: usize) {
            for _ in 0..n {
                self.now += FRAME_MS;
                self.engine.frame(self.now, &mut self.input);
            }
        }

        fn tap(&mut self, code: &str) {
            self.input.key_down(code);
            self.frames(2);
            self.input.key_up(code);
            self.frames(1);
        }

        fn enter_game(&mut self) {
            self.tap("Enter");
            self.frames(40);
            assert_eq!(self.engine.scene(), Some(SceneId::Game));
        }
    }

    #[derive(Default)]
    struct LandCounter {
        lands: Rc<Cell<u32>>,
    }

    impl GameObserver for LandCounter {
        fn on_land(&mut self, _pos: Vec2, _impact_speed: f32) {
            self.lands.set(self.lands.get() + 1);
        }
    }

    #[test]
    fn test_starts_on_title_without_level() {
        let mut h = Harness::new();
        assert_eq!(h.engine.scene(), Some(SceneId::Title));
        h.frames(10);
        assert!(h.engine.world.level.is_none());
        assert_eq!(h.engine.world.time_ticks, 0);
    }

    #[test]
    fn test_confirm_transitions_into_game() {
        let mut h = Harness::new();
        h.tap("Enter");
        assert!(h.engine.is_transitioning());
        assert_eq!(h.engine.scene(), Some(SceneId::Title));
        assert!(h.engine.render_view().mosaic > 1.0);

        h.frames(40);
        assert_eq!(h.engine.scene(), Some(SceneId::Game));
        assert!(!h.engine.is_transitioning());
        assert!(h.engine.world.level.is_some());
        assert_eq!(h.engine.render_view().mosaic, 1.0);
        assert!(h.engine.audio.is_playing(SoundEffect::Theme));
    }

    #[test]
    fn test_observer_sees_each_event_once() {
        let mut h = Harness::new();
        let counter = LandCounter::default();
        let lands = counter.lands.clone();
        h.engine.add_observer(Box::new(counter));

        h.enter_game();
        h.frames(60);
        assert!(h.engine.world.player.grounded());
        assert_eq!(lands.get(), 1);
        assert!(h.engine.world.events.is_empty());
    }

    #[test]
    fn test_pause_freezes_world_and_resumes_in_place() {
        let mut h = Harness::new();
        h.enter_game();
        h.frames(30);

        h.tap("Escape");
        assert!(h.engine.is_paused());
        let frozen_at = h.engine.world.time_ticks;
        let pos = h.engine.world.player.pos;
        h.frames(20);
        assert_eq!(h.engine.world.time_ticks, frozen_at);

        h.tap("Escape");
        assert_eq!(h.engine.scene(), Some(SceneId::Game));
        assert!(h.engine.world.time_ticks > frozen_at);
        // Level was not re-entered
        assert!((h.engine.world.player.pos.y - pos.y).abs() < 1.0);
    }

    #[test]
    fn test_pause_freezes_effects_and_voices() {
        let mut h = Harness::new();
        h.enter_game();
        h.tap("Escape");
        assert!(h.engine.is_paused());

        h.engine.particles.dust(Vec2::new(100.0, 400.0), 5);
        h.engine.audio.play(SoundEffect::Land);
        let particles = h.engine.particles.pool.active_count();
        let voices = h.engine.audio.active_count();
        assert!(particles > 0);

        h.frames(60);
        assert_eq!(h.engine.particles.pool.active_count(), particles);
        assert_eq!(h.engine.audio.active_count(), voices);
        assert!(h.engine.audio.is_playing(SoundEffect::Land));

        h.tap("Escape");
        h.frames(60);
        assert!(!h.engine.audio.is_playing(SoundEffect::Land));
    }

    #[test]
    fn test_game_over_then_back_to_title() {
        let mut h = Harness::new();
        h.enter_game();
        h.engine.world.player.health = 1;
        h.engine.world.player.pos.y = 2000.0;
        h.frames(2);
        assert_eq!(h.engine.world.phase, WorldPhase::GameOver);

        h.frames(40);
        assert_eq!(h.engine.scene(), Some(SceneId::GameOver));

        h.tap("Enter");
        h.frames(40);
        assert_eq!(h.engine.scene(), Some(SceneId::Title));
        assert!(h.engine.world.level.is_none());
        assert_eq!(h.engine.audio.active_count(), 0);
    }

    #[test]
    fn test_coin_pickup_autosaves() {
        let mut h = Harness::new();
        h.engine
            .set_autosave(Autosave::new(Box::new(MemorySaveStore::new()), 0));
        h.enter_game();

        let coin = h
            .engine
            .world
            .level
            .as_ref()
            .and_then(|l| l.entities.iter().find(|e| e.kind == EntityKind::Coin))
            .map(|e| e.pos())
            .unwrap();
        h.engine.world.player.pos = coin - Vec2::new(5.0, 10.0);
        h.engine.world.player.vel = Vec2::ZERO;
        h.frames(3);

        assert_eq!(h.engine.world.coins, 1);
        let saved = h.engine.autosave().unwrap().load().unwrap();
        assert_eq!(saved.coins, 1);
        assert_eq!(saved.score, crate::consts::COIN_SCORE);
        assert!(saved.totems.contains(&"hockey".to_string()));
    }

    #[test]
    fn test_continue_restores_progress() {
        let mut store = MemorySaveStore::new();
        store
            .save(
                0,
                &SaveData {
                    coins: 4,
                    score: 700,
                    level: 1,
                    health: 3,
                    totems: vec!["owl".to_string()],
                    last_saved: 0.0,
                },
            )
            .unwrap();

        let mut h = Harness::new();
        h.engine.set_autosave(Autosave::new(Box::new(store), 0));
        assert!(h.engine.continue_from_save());
        h.frames(40);

        assert_eq!(h.engine.scene(), Some(SceneId::Game));
        assert_eq!(h.engine.world.score, 700);
        assert_eq!(h.engine.world.coins, 4);
        assert!(h.engine.world.totems.is_found("owl"));
    }

    #[test]
    fn test_continue_without_save() {
        let mut h = Harness::new();
        assert!(!h.engine.continue_from_save());
        h.engine
            .set_autosave(Autosave::new(Box::new(MemorySaveStore::new()), 0));
        assert!(!h.engine.continue_from_save());
        assert!(!h.engine.is_transitioning());
    }

    #[test]
    fn test_settings_reach_collaborators() {
        let mut engine = Engine::new(1, Settings::default());
        assert_eq!(engine.particles.pool.capacity(), 500);

        engine.apply_settings(Settings {
            reduced_motion: true,
            quality: crate::QualityPreset::Low,
            muted: true,
            ..Default::default()
        });
        assert_eq!(engine.particles.pool.capacity(), 100);
        assert_eq!(engine.audio.volume(SoundEffect::Jump), 0.0);

        engine.world.camera.shake(10.0, 200.0);
        assert!(!engine.world.camera.is_shaking());
    }

    #[test]
    fn test_render_view_interpolates() {
        let mut h = Harness::new();
        h.enter_game();
        h.engine.prev_player_pos = Vec2::new(0.0, 0.0);
        h.engine.world.player.pos = Vec2::new(10.0, 20.0);
        h.engine.alpha = 0.5;

        let view = h.engine.render_view();
        assert_eq!(view.player_pos, Vec2::new(5.0, 10.0));
        assert_eq!(view.scene, Some(SceneId::Game));
        assert!(!view.entities.is_empty());
        assert!(view.boss.is_some());
        assert_eq!(view.health, crate::consts::PLAYER_MAX_HEALTH);
    }
}
