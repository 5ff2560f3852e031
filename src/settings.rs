//! Player preferences
//!
//! Persisted in LocalStorage as one JSON object. Every numeric field is a
//! 0-1 slider percent.

use serde::{Deserialize, Serialize};

use crate::sim::{Colour, PlayerParams};

/// Value every slider starts at
pub const DEFAULT_SLIDER: f32 = 0.5;
/// Number of sliders drawing from the shared stat budget
pub const SHARED_SLIDER_COUNT: usize = 3;
/// Total the shared sliders may add up to
pub const MAX_SHARED: f32 = DEFAULT_SLIDER * SHARED_SLIDER_COUNT as f32;
pub const DEFAULT_PLAYER_COLOUR: &str = "#0000FF";

fn default_slider() -> f32 {
    DEFAULT_SLIDER
}

fn default_colour() -> String {
    DEFAULT_PLAYER_COLOUR.to_string()
}

/// Saved player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Settings {
    #[serde(default = "default_slider")]
    pub player_size: f32,
    #[serde(default = "default_slider")]
    pub player_speed: f32,
    #[serde(default = "default_slider")]
    pub player_inv_time: f32,
    /// Stored inverted: `1 - slider`
    #[serde(default = "default_slider")]
    pub player_charges_needed: f32,
    /// Hex string as typed by the player
    #[serde(default = "default_colour")]
    pub player_colour: String,
    #[serde(default)]
    pub challenges_completed: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_size: DEFAULT_SLIDER,
            player_speed: DEFAULT_SLIDER,
            player_inv_time: DEFAULT_SLIDER,
            player_charges_needed: DEFAULT_SLIDER,
            player_colour: default_colour(),
            challenges_completed: 0,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "SaveState";

    /// Parse a stored blob; anything unreadable yields the defaults
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring unreadable saved settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parameters for a new player built from these settings
    pub fn player_params(&self) -> PlayerParams {
        PlayerParams {
            size: self.player_size,
            speed: self.player_speed,
            inv_time: self.player_inv_time,
            charges_needed: self.player_charges_needed,
            colour: Colour::from_hex(&self.player_colour),
        }
    }

    /// The charges slider as the player sees it
    pub fn charges_slider(&self) -> f32 {
        1.0 - self.player_charges_needed
    }

    /// Whether speed, invulnerability time and the charges slider fit in the
    /// shared budget together
    pub fn fits_shared_budget(speed: f32, inv_time: f32, charges_slider: f32) -> bool {
        speed + inv_time + charges_slider <= MAX_SHARED
    }

    /// Unused share of the stat budget, 0-1
    pub fn stats_meter_remaining(&self) -> f32 {
        let used = self.player_speed + self.player_inv_time + self.charges_slider();
        1.0 - used / MAX_SHARED
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
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
            let _ = storage.set_item(Self::STORAGE_KEY, &self.to_json());
            log::debug!("Settings saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::info!("Using default settings");
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        log::debug!("Settings not persisted on native ({})", Self::STORAGE_KEY);
    }
}
