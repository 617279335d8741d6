//! Voice allocation for sound effects
//!
//! The hardware budget is 8 simultaneous voices. When every voice is busy a
//! new sound evicts the oldest voice of the lowest priority, unless it is
//! itself no more important than that voice, in which case it is dropped.
//! Synthesis is the host's job: it drains `started()` each frame.

use glam::Vec2;

use crate::consts::AUDIO_CHANNELS;
use crate::settings::Settings;
use crate::sim::{GameObserver, JumpKind, Progress};

/// Voice priority, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AudioPriority {
    Music,
    Environment,
    Enemy,
    Player,
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    Jump,
    DoubleJump,
    WallJump,
    Land,
    /// Landing fast enough to shake the camera
    HeavyLand,
    Stomp,
    Coin,
    Damage,
    Checkpoint,
    /// Hockey stick launch
    Launch,
    BossHit,
    BossDefeated,
    /// Feather rain swoosh
    Feathers,
    LevelComplete,
    GameOver,
    /// Background theme (loops)
    Theme,
}

impl SoundEffect {
    pub fn priority(self) -> AudioPriority {
        use SoundEffect::*;
        match self {
            Theme => AudioPriority::Music,
            Feathers | LevelComplete | GameOver => AudioPriority::Environment,
            Stomp | BossHit | BossDefeated => AudioPriority::Enemy,
            Jump | DoubleJump | WallJump | Land | HeavyLand | Coin | Damage | Checkpoint
            | Launch => AudioPriority::Player,
        }
    }

    /// Nominal length in ms; `None` loops until stopped
    pub fn duration(self) -> Option<f32> {
        use SoundEffect::*;
        match self {
            Theme => None,
            Land => Some(80.0),
            Jump | DoubleJump | WallJump | Coin => Some(150.0),
            HeavyLand | Stomp | Feathers => Some(200.0),
            Damage | Checkpoint | Launch | BossHit => Some(300.0),
            BossDefeated | LevelComplete | GameOver => Some(1200.0),
        }
    }
}

/// A busy voice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub id: u64,
    pub effect: SoundEffect,
    pub priority: AudioPriority,
    /// Remaining time (ms); `None` for loops
    remaining: Option<f32>,
}

/// Fixed pool of voices with priority eviction
#[derive(Debug, Clone)]
pub struct AudioChannels {
    voices: Vec<Voice>,
    capacity: usize,
    next_id: u64,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    /// Sounds started since the host last drained them, with their volume
    started: Vec<(u64, SoundEffect, f32)>,
}

impl Default for AudioChannels {
    fn default() -> Self {
        Self::new(AUDIO_CHANNELS)
    }
}

impl AudioChannels {
    pub fn new(capacity: usize) -> Self {
        Self {
            voices: Vec::with_capacity(capacity),
            capacity,
            next_id: 1,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.5,
            muted: false,
            started: Vec::new(),
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.master_volume = settings.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = settings.music_volume.clamp(0.0, 1.0);
        self.muted = settings.muted;
    }

    pub fn active_count(&self) -> usize {
        self.voices.len()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn is_playing(&self, effect: SoundEffect) -> bool {
        self.voices.iter().any(|v| v.effect == effect)
    }

    /// Effective volume for an effect
    pub fn volume(&self, effect: SoundEffect) -> f32 {
        if self.muted {
            return 0.0;
        }
        let bus = match effect.priority() {
            AudioPriority::Music => self.music_volume,
            _ => self.sfx_volume,
        };
        self.master_volume * bus
    }

    /// Request a voice. Returns its id, or `None` if the sound was dropped.
    pub fn play(&mut self, effect: SoundEffect) -> Option<u64> {
        let priority = effect.priority();

        if self.voices.len() >= self.capacity {
            let lowest = self.voices.iter().map(|v| v.priority).min()?;
            if priority <= lowest {
                log::debug!("Dropped {effect:?} ({priority:?}): all voices busy");
                return None;
            }
            let index = self.voices.iter().position(|v| v.priority == lowest)?;
            let evicted = self.voices.remove(index);
            log::debug!("Evicted {:?} for {effect:?}", evicted.effect);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.voices.push(Voice {
            id,
            effect,
            priority,
            remaining: effect.duration(),
        });
        // An undrained queue keeps only the newest starts
        if self.started.len() >= self.capacity {
            self.started.remove(0);
        }
        self.started.push((id, effect, self.volume(effect)));
        Some(id)
    }

    pub fn stop(&mut self, effect: SoundEffect) {
        self.voices.retain(|v| v.effect != effect);
    }

    pub fn stop_all(&mut self) {
        self.voices.clear();
    }

    /// Free voices whose sound has finished
    pub fn update(&mut self, dt: f32) {
        for voice in self.voices.iter_mut() {
            if let Some(remaining) = voice.remaining.as_mut() {
                *remaining -= dt;
            }
        }
        self.voices
            .retain(|v| v.remaining.is_none_or(|remaining| remaining > 0.0));
    }

    /// Sounds the host should start now: (voice id, effect, volume)
    pub fn started(&mut self) -> Vec<(u64, SoundEffect, f32)> {
        std::mem::take(&mut self.started)
    }
}

impl GameObserver for AudioChannels {
    fn on_jump(&mut self, _pos: Vec2, kind: JumpKind) {
        self.play(match kind {
            JumpKind::Ground | JumpKind::Coyote => SoundEffect::Jump,
            JumpKind::Double => SoundEffect::DoubleJump,
            JumpKind::Wall => SoundEffect::WallJump,
        });
    }

    fn on_land(&mut self, _pos: Vec2, impact_speed: f32) {
        if impact_speed > 300.0 {
            self.play(SoundEffect::HeavyLand);
        } else {
            self.play(SoundEffect::Land);
        }
    }

    fn on_stomp(&mut self, _pos: Vec2) {
        self.play(SoundEffect::Stomp);
    }

    fn on_coin_collect(&mut self, _pos: Vec2, _progress: &Progress) {
        self.play(SoundEffect::Coin);
    }

    fn on_damage(&mut self, _health: u8) {
        self.play(SoundEffect::Damage);
    }

    fn on_boss_hit(&mut self, _pos: Vec2, _health: u8) {
        self.play(SoundEffect::BossHit);
    }

    fn on_boss_defeated(&mut self, _pos: Vec2) {
        self.play(SoundEffect::BossDefeated);
    }

    fn on_checkpoint(&mut self, _pos: Vec2, _progress: &Progress) {
        self.play(SoundEffect::Checkpoint);
    }

    fn on_launch(&mut self, _pos: Vec2) {
        self.play(SoundEffect::Launch);
    }

    fn on_goal(&mut self) {
        self.stop(SoundEffect::Theme);
        self.play(SoundEffect::LevelComplete);
    }

    fn on_game_over(&mut self) {
        self.stop(SoundEffect::Theme);
        self.play(SoundEffect::GameOver);
    }

    fn on_feathers(&mut self, _pos: Vec2) {
        self.play(SoundEffect::Feathers);
    }
}
