//! Scene registry and mosaic transitions
//!
//! A transition pixelates out, switches scenes at its midpoint, then
//! pixelates back in. Its timer advances inside the fixed tick like every
//! other simulation timer.

use serde::{Deserialize, Serialize};

use crate::consts::{MOSAIC_MAX, TRANSITION_DURATION_MS};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneId {
    Title,
    Game,
    Pause,
    GameOver,
    Victory,
}

/// A completed scene switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneChange {
    pub from: Option<SceneId>,
    pub to: SceneId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Transition {
    target: SceneId,
    timer: f32,
    switched: bool,
}

#[derive(Debug, Clone)]
pub struct SceneDirector {
    registered: Vec<SceneId>,
    current: Option<SceneId>,
    transition: Option<Transition>,
    duration: f32,
    mosaic: f32,
}

impl Default for SceneDirector {
    fn default() -> Self {
        Self::new(TRANSITION_DURATION_MS)
    }
}

impl SceneDirector {
    pub fn new(duration: f32) -> Self {
        Self {
            registered: Vec::new(),
            current: None,
            transition: None,
            duration,
            mosaic: 1.0,
        }
    }

    pub fn register(&mut self, id: SceneId) {
        if !self.registered.contains(&id) {
            self.registered.push(id);
        }
    }

    pub fn is_registered(&self, id: SceneId) -> bool {
        self.registered.contains(&id)
    }

    pub fn current(&self) -> Option<SceneId> {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Pixelation block size for the renderer (1 = none)
    pub fn mosaic(&self) -> f32 {
        self.mosaic
    }

    /// Request a scene change.
    ///
    /// Without a transition the switch happens now and is returned. With one,
    /// the switch is reported by `update` at the transition midpoint. A second
    /// transition request while one is running is ignored.
    pub fn switch_to(&mut self, id: SceneId, with_transition: bool) -> Result<Option<SceneChange>> {
        if !self.is_registered(id) {
            log::error!("Scene not found: {id:?}");
            return Err(Error::UnknownScene(id));
        }

        if !with_transition {
            return Ok(Some(self.perform_switch(id)));
        }
        if self.transition.is_some() {
            log::debug!("Transition to {id:?} ignored: another is in progress");
            return Ok(None);
        }

        log::info!("Transition to {id:?} started");
        self.transition = Some(Transition {
            target: id,
            timer: 0.0,
            switched: false,
        });
        Ok(None)
    }

    /// Advance the running transition; returns the switch when it happens
    pub fn update(&mut self, dt: f32) -> Option<SceneChange> {
        let mut transition = self.transition?;
        let half = self.duration / 2.0;
        let mut change = None;

        transition.timer += dt;
        if transition.timer >= half && !transition.switched {
            transition.switched = true;
            change = Some(self.perform_switch(transition.target));
        }

        if transition.timer >= self.duration {
            self.transition = None;
            self.mosaic = 1.0;
        } else {
            let progress = 1.0 - (transition.timer - half).abs() / half;
            self.mosaic = 1.0 + progress * MOSAIC_MAX;
            self.transition = Some(transition);
        }

        change
    }

    fn perform_switch(&mut self, to: SceneId) -> SceneChange {
        let from = self.current.replace(to);
        log::info!("Scene switch: {from:?} -> {to:?}");
        SceneChange { from, to }
    }
}
