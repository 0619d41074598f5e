//! Player feedback preferences
//!
//! Persisted separately from tuning; tuning is how the game feels, settings are
//! what the player chose to tone down.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Feedback settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Visual Effects ===
    /// Camera shake on impacts and damage
    pub screen_shake: bool,
    /// Full-screen hit flashes
    pub screen_flash: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Accessibility ===
    /// Reduced motion (no shake, no flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_shake: true,
            screen_flash: true,

            master_volume: 0.8,
            sfx_volume: 1.0,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective screen flash (respects reduced_motion)
    pub fn effective_screen_flash(&self) -> bool {
        self.screen_flash && !self.reduced_motion
    }

    /// Volume multiplier for sound effects
    pub fn effective_sfx_volume(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Load settings from a JSON file, defaults if missing or unreadable
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if let Ok(json) = std::fs::read_to_string(path) {
            if let Ok(settings) = serde_json::from_str(&json) {
                log::info!("Loaded settings from {}", path.display());
                return settings;
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
