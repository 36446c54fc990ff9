//! Typed configuration for the Rampart multiplayer layer, persisted as RON.

mod config;
mod error;

pub use config::{Config, DebugConfig, MovementConfig, NetworkConfig};
pub use error::ConfigError;
