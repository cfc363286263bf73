//! BitCup Services Layer
//!
//! Platform abstraction for settings, saved cup state, and texture lookup.

pub mod save;
pub mod settings;
pub mod textures;
