//! Settings management
//!
//! Overlay tuning persisted as JSON next to the executable. Settings carry a
//! version; files older than the current version are discarded wholesale and
//! rewritten with defaults rather than migrated.

use bitcup_core::{DenomTable, Tuning};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Bumped whenever defaults change in a way that should override old files.
pub const SETTINGS_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings serialization: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Overlay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub version: u32,
    pub drop_delay: f32,
    pub velocity_amp: f32,
    pub combine_bits: bool,
    pub save_bits: bool,
    pub mass_1: f32,
    pub mass_100: f32,
    pub mass_1000: f32,
    pub mass_5000: f32,
    pub mass_10000: f32,
    pub force_1: f32,
    pub force_100: f32,
    pub force_1000: f32,
    pub force_5000: f32,
    pub force_10000: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            drop_delay: 0.25,
            velocity_amp: 0.5,
            combine_bits: false,
            save_bits: false,
            mass_1: 1.0,
            mass_100: 1.5,
            mass_1000: 2.0,
            mass_5000: 2.5,
            mass_10000: 3.0,
            force_1: 0.0,
            force_100: 500.0,
            force_1000: 1000.0,
            force_5000: 1400.0,
            force_10000: 2400.0,
        }
    }
}

impl Settings {
    /// Load from `path`, falling back to defaults when the file is missing,
    /// unparseable, or carries an outdated version.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                tracing::info!(?path, %err, "no settings file, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str::<Settings>(&text) {
            Ok(settings) if settings.version >= SETTINGS_VERSION => settings,
            Ok(settings) => {
                tracing::warn!(
                    found = settings.version,
                    current = SETTINGS_VERSION,
                    "outdated settings version, using defaults"
                );
                Self::default()
            }
            Err(err) => {
                tracing::warn!(%err, "unparseable settings file, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        tracing::info!(?path, "settings saved");
        Ok(())
    }

    /// Project into the engine's tuning tables.
    pub fn tuning(&self) -> Tuning {
        Tuning {
            drop_delay: self.drop_delay,
            velocity_amp: self.velocity_amp,
            combine_bits: self.combine_bits,
            mass: DenomTable::new([
                self.mass_1,
                self.mass_100,
                self.mass_1000,
                self.mass_5000,
                self.mass_10000,
            ]),
            force_bonus: DenomTable::new([
                self.force_1,
                self.force_100,
                self.force_1000,
                self.force_5000,
                self.force_10000,
            ]),
        }
    }
}
