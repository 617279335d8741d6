//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (entities last to first)
//! - No rendering, audio or platform dependencies; collaborators observe
//!   the events each tick produces

pub mod boss;
pub mod camera;
pub mod collision;
pub mod events;
pub mod input;
pub mod particles;
pub mod player;
pub mod scene;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use boss::{Boss, BossState};
pub use camera::Camera;
pub use collision::{Aabb, CollisionResult, Contacts, Side, check_slope, overlaps, resolve};
pub use events::{GameEvent, GameObserver, JumpKind, Progress};
pub use input::InputSnapshot;
pub use particles::{ParticleFx, ParticlePool, ParticleSpawn};
pub use player::{Player, PlayerState};
pub use scene::{SceneChange, SceneDirector, SceneId};
pub use scheduler::{FixedTimestep, FrameReport};
pub use state::{
    Entity, EntityKind, Level, Platform, PlatformKind, TotemRegistry, World, WorldPhase,
};
pub use tick::tick;
