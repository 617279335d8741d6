//! World state and level data
//!
//! Level geometry and entity records are plain serde data so levels can be
//! authored as JSON. Everything the world step mutates lives in `World`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::Boss;
use super::camera::Camera;
use super::collision::{Aabb, SlopeDir};
use super::events::{GameEvent, Progress};
use super::player::Player;
use crate::consts::*;
use crate::Result;

/// Enemy patrol speed (units/s)
pub const PATROL_SPEED: f32 = 25.0;
/// Enemy patrol half-width around its spawn
pub const PATROL_RANGE: f32 = 64.0;

/// Platform behaviour tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlatformKind {
    Ground,
    /// Solid only when landed on from above while falling
    #[serde(alias = "platform")]
    OneWay,
    /// Spikes: damage on overlap
    Hazard,
    SlopeLeft,
    SlopeRight,
    Water,
}

impl PlatformKind {
    pub fn slope_dir(self) -> Option<SlopeDir> {
        match self {
            PlatformKind::SlopeLeft => Some(SlopeDir::Left),
            PlatformKind::SlopeRight => Some(SlopeDir::Right),
            _ => None,
        }
    }
}

/// Immutable level geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(rename = "type")]
    pub kind: PlatformKind,
}

impl Platform {
    pub const fn new(x: f32, y: f32, width: f32, height: f32, kind: PlatformKind) -> Self {
        Self {
            x,
            y,
            width,
            height,
            kind,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Coin,
    Enemy,
    Goal,
    /// The hockey stick launcher
    #[serde(alias = "hockey_launcher")]
    Launcher,
    Checkpoint,
}

/// Mutable level entry (removed on collect/defeat)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Spawn position
    pub x: f32,
    pub y: f32,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Patrol displacement from the spawn x
    #[serde(skip)]
    pub offset: f32,
    #[serde(skip)]
    heading_left: bool,
    /// Checkpoints fire once; launchers once per touch
    #[serde(skip)]
    pub triggered: bool,
}

impl Entity {
    pub fn new(kind: EntityKind, x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            kind,
            offset: 0.0,
            heading_left: false,
            triggered: false,
        }
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x + self.offset, self.y)
    }

    pub fn center(&self) -> Vec2 {
        self.pos() + Vec2::splat(ENTITY_SIZE / 2.0)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos(), Vec2::splat(ENTITY_SIZE))
    }

    /// Walk back and forth around the spawn point (enemies only)
    pub fn patrol(&mut self, dt: f32) {
        if self.kind != EntityKind::Enemy {
            return;
        }
        let step = PATROL_SPEED * dt / 1000.0;
        if self.heading_left {
            self.offset -= step;
            if self.offset <= -PATROL_RANGE {
                self.offset = -PATROL_RANGE;
                self.heading_left = false;
            }
        } else {
            self.offset += step;
            if self.offset >= PATROL_RANGE {
                self.offset = PATROL_RANGE;
                self.heading_left = true;
            }
        }
    }
}

fn default_spawn() -> Vec2 {
    Vec2::new(100.0, 400.0)
}

fn default_level_number() -> u32 {
    1
}

/// Level description as provided by the level data collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    #[serde(default = "default_level_number")]
    pub number: u32,
    pub width: f32,
    pub height: f32,
    #[serde(default = "default_spawn")]
    pub spawn: Vec2,
    pub platforms: Vec<Platform>,
    pub entities: Vec<Entity>,
    /// Boss arena position, if this level has one
    #[serde(default)]
    pub boss: Option<Vec2>,
}

impl Level {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Built-in first level
    pub fn duncan_forest() -> Self {
        use PlatformKind::*;

        Self {
            name: "Duncan Forest".to_string(),
            number: 1,
            width: 3200.0,
            height: 600.0,
            spawn: default_spawn(),
            platforms: vec![
                Platform::new(0.0, 536.0, 600.0, 64.0, Ground),
                Platform::new(700.0, 536.0, 700.0, 64.0, Ground),
                Platform::new(1500.0, 536.0, 800.0, 64.0, Ground),
                Platform::new(2400.0, 536.0, 800.0, 64.0, Ground),
                // Floating
                Platform::new(300.0, 400.0, 128.0, 32.0, OneWay),
                Platform::new(500.0, 320.0, 96.0, 32.0, OneWay),
                Platform::new(800.0, 380.0, 128.0, 32.0, OneWay),
                Platform::new(1000.0, 280.0, 160.0, 32.0, OneWay),
            ],
            entities: vec![
                Entity::new(EntityKind::Coin, 350.0, 360.0),
                Entity::new(EntityKind::Coin, 550.0, 280.0),
                Entity::new(EntityKind::Enemy, 1000.0, 240.0),
                Entity::new(EntityKind::Checkpoint, 1550.0, 516.0),
                Entity::new(EntityKind::Launcher, 2000.0, 516.0),
                Entity::new(EntityKind::Goal, 3000.0, 472.0),
            ],
            boss: Some(Vec2::new(2800.0, 100.0)),
        }
    }
}

/// A collectible totem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totem {
    pub id: String,
    pub name: String,
    pub found: bool,
}

/// Per-world totem bestiary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotemRegistry {
    totems: Vec<Totem>,
}

impl Default for TotemRegistry {
    fn default() -> Self {
        let totem = |id: &str, name: &str, found| Totem {
            id: id.to_string(),
            name: name.to_string(),
            found,
        };
        Self {
            totems: vec![
                totem("owl", "The Cedar Owl", false),
                totem("salmon", "Spirit of the Cowichan River", false),
                totem("hockey", "World's Largest Hockey Stick", true),
            ],
        }
    }
}

impl TotemRegistry {
    /// Mark a totem found; unknown ids are ignored
    pub fn find(&mut self, id: &str) {
        if let Some(totem) = self.totems.iter_mut().find(|t| t.id == id) {
            if !totem.found {
                log::info!("Totem found: {}", totem.name);
            }
            totem.found = true;
        }
    }

    pub fn is_found(&self, id: &str) -> bool {
        self.totems.iter().any(|t| t.id == id && t.found)
    }

    pub fn collected_count(&self) -> usize {
        self.totems.iter().filter(|t| t.found).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Totem> {
        self.totems.iter()
    }

    /// Found flags by id, for saving
    pub fn found_ids(&self) -> Vec<String> {
        self.totems
            .iter()
            .filter(|t| t.found)
            .map(|t| t.id.clone())
            .collect()
    }

    /// Restore found flags from a save
    pub fn restore(&mut self, found: &[String]) {
        for id in found {
            self.find(id);
        }
    }
}

/// Outcome of the current level run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldPhase {
    Playing,
    /// Goal reached
    LevelComplete,
    /// Out of health
    GameOver,
}

/// Everything the world step owns
#[derive(Debug, Clone)]
pub struct World {
    pub seed: u64,
    /// None until a level is entered; the step refuses to run without one
    pub level: Option<Level>,
    pub player: Player,
    pub boss: Option<Boss>,
    pub camera: Camera,
    pub totems: TotemRegistry,
    pub score: u64,
    pub coins: u32,
    /// Where the player reappears after damage
    pub respawn: Vec2,
    pub phase: WorldPhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events produced by the last tick
    pub events: Vec<GameEvent>,
    pub(crate) missing_level_warned: bool,
}

impl World {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            level: None,
            player: Player::new(default_spawn()),
            boss: None,
            camera: Camera::new(Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT), seed),
            totems: TotemRegistry::default(),
            score: 0,
            coins: 0,
            respawn: default_spawn(),
            phase: WorldPhase::Playing,
            time_ticks: 0,
            events: Vec::new(),
            missing_level_warned: false,
        }
    }

    /// Enter a level: fresh player and boss, camera bounded and snapped
    pub fn load_level(&mut self, level: Level) {
        log::info!(
            "Entering level {} \"{}\" ({}x{}, {} platforms, {} entities)",
            level.number,
            level.name,
            level.width,
            level.height,
            level.platforms.len(),
            level.entities.len()
        );

        self.player = Player::new(level.spawn);
        self.respawn = level.spawn;
        self.boss = level.boss.map(Boss::new);
        self.camera
            .set_bounds(Vec2::ZERO, Vec2::new(level.width, level.height));
        self.camera.snap_to(self.player.center());
        self.phase = WorldPhase::Playing;
        self.events.clear();
        self.missing_level_warned = false;
        self.level = Some(level);
    }

    pub fn unload_level(&mut self) {
        if let Some(level) = self.level.take() {
            log::info!("Leaving level \"{}\"", level.name);
        }
        self.boss = None;
        self.camera.clear_bounds();
        self.events.clear();
        self.missing_level_warned = false;
    }

    /// Start a fresh run (score, coins and totems reset)
    pub fn reset_progress(&mut self) {
        self.score = 0;
        self.coins = 0;
        self.totems = TotemRegistry::default();
    }

    pub fn level_number(&self) -> u32 {
        self.level.as_ref().map_or(0, |l| l.number)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            coins: self.coins,
            score: self.score,
            level: self.level_number(),
            health: self.player.health,
        }
    }

    /// Hand this tick's events to the caller
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_json_uses_defaults() {
        let json = r#"{
            "name": "Test",
            "width": 800,
            "height": 600,
            "platforms": [
                { "x": 0, "y": 536, "width": 800, "height": 64, "type": "ground" },
                { "x": 300, "y": 400, "width": 128, "height": 32, "type": "platform" },
                { "x": 500, "y": 500, "width": 64, "height": 36, "type": "slopeRight" }
            ],
            "entities": [
                { "x": 350, "y": 360, "type": "coin" },
                { "x": 600, "y": 516, "type": "hockey_launcher" }
            ]
        }"#;
        let level = Level::from_json(json).unwrap();
        assert_eq!(level.number, 1);
        assert_eq!(level.spawn, Vec2::new(100.0, 400.0));
        assert_eq!(level.platforms[1].kind, PlatformKind::OneWay);
        assert_eq!(level.platforms[2].kind.slope_dir(), Some(SlopeDir::Right));
        assert_eq!(level.entities[1].kind, EntityKind::Launcher);
        assert!(level.boss.is_none());
    }

    #[test]
    fn test_bad_level_is_an_error() {
        assert!(Level::from_json(r#"{ "name": "x" }"#).is_err());
    }

    #[test]
    fn test_patrol_stays_in_range() {
        let mut enemy = Entity::new(EntityKind::Enemy, 1000.0, 240.0);
        let mut saw_left = false;
        for _ in 0..2000 {
            enemy.patrol(FIXED_STEP_MS);
            assert!(enemy.offset.abs() <= PATROL_RANGE);
            saw_left |= enemy.offset < -PATROL_RANGE + 1.0;
        }
        assert!(saw_left);

        let mut coin = Entity::new(EntityKind::Coin, 0.0, 0.0);
        coin.patrol(FIXED_STEP_MS);
        assert_eq!(coin.pos(), Vec2::ZERO);
    }

    #[test]
    fn test_totem_registry() {
        let mut totems = TotemRegistry::default();
        assert_eq!(totems.collected_count(), 1);
        totems.find("owl");
        totems.find("owl");
        totems.find("bigfoot");
        assert_eq!(totems.collected_count(), 2);

        let mut restored = TotemRegistry::default();
        restored.restore(&totems.found_ids());
        assert!(restored.is_found("owl"));
        assert!(!restored.is_found("salmon"));
    }

    #[test]
    fn test_load_level_resets_run_state() {
        let mut world = World::new(1);
        assert_eq!(world.level_number(), 0);
        world.load_level(Level::duncan_forest());
        assert_eq!(world.player.pos, Vec2::new(100.0, 400.0));
        assert!(world.boss.is_some());
        assert_eq!(world.progress().health, PLAYER_MAX_HEALTH);
        assert_eq!(world.progress().level, 1);

        world.unload_level();
        assert!(world.level.is_none());
        assert!(world.boss.is_none());
    }
}
