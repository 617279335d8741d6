//! Platform abstraction layer
//!
//! Turns host device events into the per-tick `InputSnapshot` the simulation
//! reads. Keyboard codes go through a remappable `KeyMap`; gamepads report
//! buttons and a stick axis directly.

pub mod input;

pub use input::{Action, InputTracker, KeyMap, STICK_DEAD_ZONE};
