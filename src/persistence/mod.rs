//! Save slots
//!
//! Features:
//! - One JSON document per slot (`westcat_save_<slot>`)
//! - File, in-memory and LocalStorage backends behind one trait
//! - Missing, corrupt or out-of-range slots load as "no save"
//! - Autosave on coin pickup and checkpoints only, never on a timer

use std::collections::HashMap;
use std::path::PathBuf;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::SAVE_SLOTS;
use crate::sim::{GameObserver, Progress};
use crate::{Error, Result};

/// Key prefix shared by every backend
pub const KEY_PREFIX: &str = "westcat_save_";

/// Persisted progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    pub coins: u32,
    pub score: u64,
    pub level: u32,
    #[serde(default)]
    pub health: u8,
    /// Ids of totems found so far
    #[serde(default)]
    pub totems: Vec<String>,
    /// Unix timestamp (ms) of the write
    #[serde(default)]
    pub last_saved: f64,
}

impl SaveData {
    pub fn from_progress(progress: &Progress, totems: Vec<String>) -> Self {
        Self {
            coins: progress.coins,
            score: progress.score,
            level: progress.level,
            health: progress.health,
            totems,
            last_saved: 0.0,
        }
    }
}

/// Current time as a Unix timestamp in ms
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64() * 1000.0)
}

fn slot_key(slot: u8) -> String {
    format!("{KEY_PREFIX}{slot}")
}

/// Raw slot storage plus the shared save/load policy
pub trait SaveStore {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, json: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Write `data` to `slot`, stamping the save time
    fn save(&mut self, slot: u8, data: &SaveData) -> Result<()> {
        if slot >= SAVE_SLOTS {
            return Err(Error::InvalidSlot(slot));
        }
        let stamped = SaveData {
            last_saved: now_ms(),
            ..data.clone()
        };
        self.write(&slot_key(slot), &serde_json::to_string(&stamped)?)?;
        log::info!("Saved to slot {slot} (score {}, coins {})", data.score, data.coins);
        Ok(())
    }

    /// Read a slot; anything unreadable counts as no save
    fn load(&self, slot: u8) -> Option<SaveData> {
        if slot >= SAVE_SLOTS {
            log::warn!("Save slot {slot} is out of range");
            return None;
        }
        let json = match self.read(&slot_key(slot)) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to read save slot {slot}: {e}");
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(data) => {
                log::info!("Loaded save slot {slot}");
                Some(data)
            }
            Err(e) => {
                log::warn!("Failed to load save slot {slot}: {e}");
                None
            }
        }
    }

    fn delete(&mut self, slot: u8) -> Result<()> {
        if slot >= SAVE_SLOTS {
            return Err(Error::InvalidSlot(slot));
        }
        self.remove(&slot_key(slot))
    }

    fn has_save(&self, slot: u8) -> bool {
        slot < SAVE_SLOTS && matches!(self.read(&slot_key(slot)), Ok(Some(_)))
    }
}

/// One `<key>.json` file per slot in a directory
#[derive(Debug, Clone)]
pub struct FileSaveStore {
    dir: PathBuf,
}

impl FileSaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SaveStore for FileSaveStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, json: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        // Write-then-rename so a crash never leaves half a save
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, self.path(key))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Volatile store for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemorySaveStore {
    entries: HashMap<String, String>,
}

impl MemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemorySaveStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, json: &str) -> Result<()> {
        self.entries.insert(key.to_string(), json.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalSaveStore;

#[cfg(target_arch = "wasm32")]
impl LocalSaveStore {
    fn storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(Error::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl SaveStore for LocalSaveStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|_| Error::StorageUnavailable)
    }

    fn write(&mut self, key: &str, json: &str) -> Result<()> {
        Self::storage()?
            .set_item(key, json)
            .map_err(|_| Error::StorageUnavailable)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        Self::storage()?
            .remove_item(key)
            .map_err(|_| Error::StorageUnavailable)
    }
}

/// Writes progress to a slot on coin pickups and checkpoints
pub struct Autosave {
    store: Box<dyn SaveStore>,
    slot: u8,
    /// Found totem ids, kept current by the engine
    pub totems: Vec<String>,
    /// Last write failure, if any
    pub last_error: Option<String>,
}

impl Autosave {
    pub fn new(store: Box<dyn SaveStore>, slot: u8) -> Self {
        Self {
            store,
            slot,
            totems: Vec::new(),
            last_error: None,
        }
    }

    pub fn store(&self) -> &dyn SaveStore {
        self.store.as_ref()
    }

    pub fn load(&self) -> Option<SaveData> {
        self.store.load(self.slot)
    }

    fn write(&mut self, progress: &Progress) {
        let data = SaveData::from_progress(progress, self.totems.clone());
        match self.store.save(self.slot, &data) {
            Ok(()) => self.last_error = None,
            Err(e) => {
                log::error!("Autosave to slot {} failed: {e}", self.slot);
                self.last_error = Some(e.to_string());
            }
        }
    }
}

impl GameObserver for Autosave {
    fn on_coin_collect(&mut self, _pos: Vec2, progress: &Progress) {
        self.write(progress);
    }

    fn on_checkpoint(&mut self, _pos: Vec2, progress: &Progress) {
        self.write(progress);
    }
}
