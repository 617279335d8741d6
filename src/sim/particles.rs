//! Pooled visual particles
//!
//! Every slot is allocated up front. When the pool is full a spawn request is
//! dropped; particles are decoration and losing some is never an error.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::f32::consts::TAU;

use super::events::{GameObserver, JumpKind, Progress};

/// Gravity applied when a spawn doesn't say otherwise (units/s²)
pub const DEFAULT_PARTICLE_GRAVITY: f32 = 300.0;
/// Lifetime used when a spawn doesn't say otherwise (ms)
pub const DEFAULT_PARTICLE_LIFE: f32 = 500.0;
/// Per-tick size factor for shrinking particles
const SHRINK_RATE: f32 = 0.98;

// Palette (0xRRGGBB)
const DIRT: u32 = 0x8B7355;
const DEBRIS: u32 = 0x654321;
const SMOKE: u32 = 0xCCCCCC;
const SPARK: u32 = 0xFFA500;
const GOLD: [u32; 4] = [0xFFD700, 0xFFFF00, 0xFFA500, 0xFFFFFF];
const PUFF: [u32; 4] = [0xFFFFFF, 0xDDDDDD, 0xAAAAAA, 0x888888];
const FEATHER: [u32; 3] = [0x6B4F3A, 0x8C6A4F, 0xD8C3A5];

/// Spawn parameters; anything not set takes the defaults
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSpawn {
    pub pos: Vec2,
    pub vel: Vec2,
    pub accel: Vec2,
    pub life: f32,
    pub size: f32,
    pub color: u32,
    pub fade_out: bool,
    pub shrink: bool,
    pub rotation: f32,
    pub rotation_speed: f32,
}

impl Default for ParticleSpawn {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            accel: Vec2::new(0.0, DEFAULT_PARTICLE_GRAVITY),
            life: DEFAULT_PARTICLE_LIFE,
            size: 4.0,
            color: 0xFFFFFF,
            fade_out: true,
            shrink: false,
            rotation: 0.0,
            rotation_speed: 0.0,
        }
    }
}

/// A live particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub accel: Vec2,
    /// Remaining life (ms)
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub color: u32,
    pub alpha: f32,
    pub rotation: f32,
    rotation_speed: f32,
    fade_out: bool,
    shrink: bool,
}

/// Fixed-capacity particle storage
#[derive(Debug, Clone)]
pub struct ParticlePool {
    slots: Vec<Option<Particle>>,
    /// Indices of empty slots
    free: Vec<usize>,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            free: (0..capacity).rev().collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Activate a slot; returns false when the pool is exhausted
    pub fn spawn(&mut self, spawn: ParticleSpawn) -> bool {
        let Some(index) = self.free.pop() else {
            return false;
        };
        self.slots[index] = Some(Particle {
            pos: spawn.pos,
            vel: spawn.vel,
            accel: spawn.accel,
            life: spawn.life,
            max_life: spawn.life,
            size: spawn.size,
            color: spawn.color,
            alpha: 1.0,
            rotation: spawn.rotation,
            rotation_speed: spawn.rotation_speed,
            fade_out: spawn.fade_out,
            shrink: spawn.shrink,
        });
        true
    }

    pub fn update(&mut self, dt: f32) {
        let dt_sec = dt / 1000.0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(p) = slot.as_mut() else {
                continue;
            };

            p.vel += p.accel * dt_sec;
            p.pos += p.vel * dt_sec;
            p.rotation += p.rotation_speed * dt_sec;
            p.life -= dt;

            if p.fade_out {
                p.alpha = (p.life / p.max_life).max(0.0);
            }
            if p.shrink {
                p.size *= SHRINK_RATE;
            }

            if p.life <= 0.0 {
                *slot = None;
                self.free.push(index);
            }
        }
    }

    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.take().is_some() {
                self.free.push(index);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.slots.iter().flatten()
    }
}

/// Preset emitters driven by gameplay events
#[derive(Debug, Clone)]
pub struct ParticleFx {
    pub pool: ParticlePool,
    pub enabled: bool,
    rng: Pcg32,
}

impl ParticleFx {
    pub fn new(capacity: usize, seed: u64) -> Self {
        Self {
            pool: ParticlePool::new(capacity),
            enabled: true,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.pool.update(dt);
    }

    fn spawn(&mut self, spawn: ParticleSpawn) {
        if self.enabled {
            self.pool.spawn(spawn);
        }
    }

    /// Uniform sample in [-half, half]
    fn spread(&mut self, half: f32) -> f32 {
        self.rng.random_range(-half..=half)
    }

    fn pick(&mut self, palette: &[u32]) -> u32 {
        palette[self.rng.random_range(0..palette.len())]
    }

    /// Running / landing puff
    pub fn dust(&mut self, pos: Vec2, count: u32) {
        for _ in 0..count {
            let spawn = ParticleSpawn {
                pos: Vec2::new(pos.x + self.spread(10.0), pos.y),
                vel: Vec2::new(self.spread(15.0), -self.rng.random_range(20.0..60.0)),
                accel: Vec2::new(0.0, 50.0),
                life: self.rng.random_range(300.0..500.0),
                size: self.rng.random_range(3.0..6.0),
                color: DIRT,
                ..Default::default()
            };
            self.spawn(spawn);
        }
    }

    /// Hard landing debris, half to each side
    pub fn impact(&mut self, pos: Vec2) {
        for side in [-1.0, 1.0] {
            for _ in 0..4 {
                let spawn = ParticleSpawn {
                    pos: Vec2::new(pos.x + side * 10.0, pos.y),
                    vel: Vec2::new(
                        side * self.rng.random_range(50.0..100.0),
                        -self.rng.random_range(30.0..60.0),
                    ),
                    accel: Vec2::new(0.0, 400.0),
                    life: self.rng.random_range(200.0..300.0),
                    size: self.rng.random_range(2.0..4.0),
                    color: DEBRIS,
                    ..Default::default()
                };
                self.spawn(spawn);
            }
        }
    }

    /// Take-off smoke that drifts upward
    pub fn jump(&mut self, pos: Vec2) {
        for _ in 0..6 {
            let spawn = ParticleSpawn {
                pos: Vec2::new(pos.x + self.spread(8.0), pos.y),
                vel: Vec2::new(self.spread(10.0), -self.rng.random_range(10.0..30.0)),
                accel: Vec2::new(0.0, -20.0),
                life: self.rng.random_range(250.0..400.0),
                size: self.rng.random_range(4.0..8.0),
                color: SMOKE,
                shrink: true,
                ..Default::default()
            };
            self.spawn(spawn);
        }
    }

    /// Coin ring that floats up
    pub fn glitter(&mut self, pos: Vec2) {
        for i in 0..12 {
            let angle = TAU * i as f32 / 12.0;
            let speed = self.rng.random_range(40.0..80.0);
            let spawn = ParticleSpawn {
                pos,
                vel: Vec2::from_angle(angle) * speed - Vec2::new(0.0, 30.0),
                accel: Vec2::new(0.0, -50.0),
                life: self.rng.random_range(400.0..600.0),
                size: self.rng.random_range(2.0..5.0),
                color: self.pick(&GOLD),
                rotation: self.rng.random_range(0.0..TAU),
                rotation_speed: self.spread(5.0),
                ..Default::default()
            };
            self.spawn(spawn);
        }
    }

    pub fn sparks(&mut self, pos: Vec2) {
        for _ in 0..3 {
            let spawn = ParticleSpawn {
                pos: Vec2::new(pos.x, pos.y + self.rng.random_range(0.0..20.0)),
                vel: Vec2::new(self.spread(10.0), self.rng.random_range(30.0..60.0)),
                accel: Vec2::new(0.0, 100.0),
                life: self.rng.random_range(150.0..250.0),
                size: self.rng.random_range(2.0..4.0),
                color: SPARK,
                ..Default::default()
            };
            self.spawn(spawn);
        }
    }

    /// Enemy defeat burst
    pub fn explosion(&mut self, pos: Vec2) {
        for i in 0..16 {
            let angle = TAU * i as f32 / 16.0;
            let speed = self.rng.random_range(60.0..120.0);
            let spawn = ParticleSpawn {
                pos,
                vel: Vec2::from_angle(angle) * speed,
                accel: Vec2::new(0.0, 200.0),
                life: self.rng.random_range(400.0..600.0),
                size: self.rng.random_range(4.0..8.0),
                color: self.pick(&PUFF),
                shrink: true,
                rotation: self.rng.random_range(0.0..TAU),
                rotation_speed: self.spread(4.0),
                ..Default::default()
            };
            self.spawn(spawn);
        }
    }

    /// Slow, swaying fall from the owl's feather rain
    pub fn feathers(&mut self, pos: Vec2) {
        for _ in 0..5 {
            let spawn = ParticleSpawn {
                pos: Vec2::new(pos.x + self.spread(48.0), pos.y),
                vel: Vec2::new(self.spread(30.0), self.rng.random_range(20.0..50.0)),
                accel: Vec2::new(0.0, 60.0),
                life: self.rng.random_range(800.0..1200.0),
                size: self.rng.random_range(4.0..7.0),
                color: self.pick(&FEATHER),
                rotation: self.rng.random_range(0.0..TAU),
                rotation_speed: self.spread(3.0),
                ..Default::default()
            };
            self.spawn(spawn);
        }
    }
}

impl GameObserver for ParticleFx {
    fn on_jump(&mut self, pos: Vec2, kind: JumpKind) {
        match kind {
            JumpKind::Wall => self.sparks(pos),
            _ => self.jump(pos),
        }
    }

    fn on_land(&mut self, pos: Vec2, impact_speed: f32) {
        self.dust(pos, 5);
        if impact_speed > 300.0 {
            self.impact(pos);
        }
    }

    fn on_stomp(&mut self, pos: Vec2) {
        self.explosion(pos);
    }

    fn on_coin_collect(&mut self, pos: Vec2, _progress: &Progress) {
        self.glitter(pos);
    }

    fn on_boss_hit(&mut self, pos: Vec2, _health: u8) {
        self.impact(pos);
        self.feathers(pos);
    }

    fn on_boss_defeated(&mut self, pos: Vec2) {
        self.explosion(pos);
        self.feathers(pos);
    }

    fn on_launch(&mut self, pos: Vec2) {
        self.impact(pos);
        self.jump(pos);
    }

    fn on_dust(&mut self, pos: Vec2, count: u32) {
        self.dust(pos, count);
    }

    fn on_sparks(&mut self, pos: Vec2) {
        self.sparks(pos);
    }

    fn on_feathers(&mut self, pos: Vec2) {
        self.feathers(pos);
    }
}
