//! Session settings
//!
//! Every field has a default, so a partial JSON document is a valid settings
//! file. Native builds read the file named by `DICE_PARTY_SETTINGS`; the web
//! build keeps settings in LocalStorage.

use serde::{Deserialize, Serialize};

/// Failure to read or parse a settings document
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "settings IO error: {}", e),
            Self::Json(e) => write!(f, "settings JSON error: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Canvas ===
    pub width: f32,
    pub height: f32,

    /// RNG seed; a random one is drawn when absent
    pub seed: Option<u64>,

    // === Timing (ms) ===
    pub ball_turn_ms: f64,
    pub farming_turn_ms: f64,
    pub fishing_turn_ms: f64,
    /// Physics/animation step
    pub fast_tick_ms: f64,
    /// How long a notice stays up
    pub notice_duration_ms: f64,
    /// Pause between tearing one mode down and starting the next
    pub mode_switch_buffer_ms: f64,

    /// Keep animating ball projectiles outside the ball game
    pub cross_mode_ball_physics: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            seed: None,

            ball_turn_ms: 10_000.0,
            farming_turn_ms: 10_000.0,
            fishing_turn_ms: 1_000.0,
            fast_tick_ms: 1000.0 / 60.0,
            notice_duration_ms: 2_000.0,
            mode_switch_buffer_ms: 100.0,

            cross_mode_ball_physics: true,
        }
    }
}

impl Settings {
    /// Environment variable naming the native settings file
    pub const ENV_VAR: &'static str = "DICE_PARTY_SETTINGS";

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "dice_party_settings";

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Turn period for a mode
    pub fn turn_ms(&self, mode: crate::sim::GameMode) -> f64 {
        use crate::sim::GameMode;
        match mode {
            GameMode::Ball => self.ball_turn_ms,
            GameMode::Farming => self.farming_turn_ms,
            GameMode::Fishing => self.fishing_turn_ms,
        }
    }

    /// Read a settings file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings from the file named by `DICE_PARTY_SETTINGS` (native)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::ENV_VAR) else {
            log::info!("Using default settings");
            return Self::default();
        };

        match Self::from_path(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path);
                settings
            }
            Err(e) => {
                log::warn!("Failed to load settings from {}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Write settings back to the file named by `DICE_PARTY_SETTINGS` (native)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        let Ok(path) = std::env::var(Self::ENV_VAR) else {
            return;
        };
        match self.to_json() {
            Ok(json) => match std::fs::write(&path, json) {
                Ok(()) => log::info!("Settings saved to {}", path),
                Err(e) => log::warn!("Failed to save settings: {}", e),
            },
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }
}
