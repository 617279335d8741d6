//! Crate error type
//!
//! Only content/programming defects and save I/O surface as errors. Pool
//! exhaustion, voice overflow and unreadable saves are handled by policy.

use thiserror::Error;

use crate::sim::SceneId;

#[derive(Debug, Error)]
pub enum Error {
    /// Transition target was never registered with the scene director
    #[error("scene {0:?} is not registered")]
    UnknownScene(SceneId),
    #[error("save slot {0} is out of range")]
    InvalidSlot(u8),
    #[error("save file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(target_arch = "wasm32")]
    #[error("LocalStorage unavailable")]
    StorageUnavailable,
}

pub type Result<T> = std::result::Result<T, Error>;
