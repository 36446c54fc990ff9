//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration for a multiplayer session host or peer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Session/network settings.
    pub network: NetworkConfig,
    /// Movement and reconciliation tuning.
    pub movement: MovementConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Session/network configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address the host transport binds to.
    pub server_address: String,
    /// Port the host transport binds to.
    pub server_port: u16,
    /// Lobby password. Empty means no authentication.
    pub password: String,
    /// Maximum number of connected players.
    pub max_players: u32,
    /// Outbound state sync rate (Hz).
    pub net_tick_rate: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            server_address: "127.0.0.1".to_string(),
            server_port: 26950,
            password: String::new(),
            max_players: 4,
            net_tick_rate: 60,
        }
    }
}

/// Movement and reconciliation tuning.
///
/// The defaults preserve the observed gameplay constants: an 8-unit
/// deviance threshold before a hard resync and an even blend between the
/// correction delta and the simulated step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MovementConfig {
    /// Walk speed in units/second.
    pub base_speed: f32,
    /// Sprint speed in units/second.
    pub sprint_speed: f32,
    /// Vertical acceleration in units/second².
    pub gravity: f32,
    /// Distance beyond which a remote player teleports instead of blending.
    pub max_deviance: f32,
    /// Weight of the simulated step vs. the correction delta (0 = snap to
    /// the replicated position each tick, 1 = ignore corrections). The
    /// blend is not tick-rate normalized; retune when changing tick rate.
    pub correction_blend: f32,
    /// Speed multiplier for heavy armor, applied only at night.
    pub heavy_armor_night_multiplier: f32,
    /// Speed multiplier for the racing horse perk.
    pub racing_horse_multiplier: f32,
    /// Ring radius for spawn-slot offsets around the spawn origin.
    pub spawn_ring_radius: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            base_speed: 6.0,
            sprint_speed: 9.0,
            gravity: -9.81,
            max_deviance: 8.0,
            correction_blend: 0.5,
            heavy_armor_night_multiplier: 0.6,
            racing_horse_multiplier: 1.6,
            spawn_ring_radius: 2.5,
        }
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn"). Empty uses the
    /// built-in default.
    pub log_level: String,
}

impl Config {
    /// Loads configuration from a RON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&content).map_err(ConfigError::ParseError)
    }

    /// Loads configuration, falling back to defaults if the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves configuration to a RON file, pretty-printed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(ConfigError::SerializeError)?;
        std::fs::write(path, content).map_err(ConfigError::WriteError)
    }
}
