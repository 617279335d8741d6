//! Westcat - A side-scrolling platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player controller, collisions, world step, scheduler)
//! - `engine`: Fixed-timestep driver wiring the simulation to its collaborators
//! - `platform`: Input device abstraction (held actions, edge detection)
//! - `persistence`: Save slots on disk or LocalStorage
//! - `audio`: Voice allocation with priority eviction
//! - `tuning`: Data-driven movement and camera balance
//! - `settings`: Player preferences

pub mod audio;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use engine::{Engine, FrameReport};
pub use error::{Error, Result};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz logic)
    pub const FIXED_STEP_MS: f32 = 1000.0 / 60.0;
    /// Maximum ticks per display frame to prevent spiral of death
    pub const MAX_FRAME_SKIP: u32 = 5;

    /// Internal resolution (camera viewport)
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Scene transition length (ms); the switch happens at the halfway point
    pub const TRANSITION_DURATION_MS: f32 = 600.0;
    /// Peak mosaic block size added on top of 1 at mid-transition
    pub const MOSAIC_MAX: f32 = 16.0;

    /// Default particle pool size
    pub const PARTICLE_POOL_SIZE: usize = 500;
    /// Simultaneous audio voices
    pub const AUDIO_CHANNELS: usize = 8;
    /// Number of save slots
    pub const SAVE_SLOTS: u8 = 3;

    /// Player body size
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;
    /// Player health on scene entry
    pub const PLAYER_MAX_HEALTH: u8 = 3;

    /// Entity hitbox (coins, enemies, goal, launchers, checkpoints)
    pub const ENTITY_SIZE: f32 = 20.0;
    /// Score awarded per coin
    pub const COIN_SCORE: u64 = 100;
    /// Score awarded per stomp
    pub const STOMP_SCORE: u64 = 200;
    /// Distance below the level's lower edge that counts as a fall-out
    pub const FALL_MARGIN: f32 = 100.0;
}

/// Clamp a value between min and max
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// WASM entry point: route logs to the browser console
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Westcat (web) core loaded");
}
