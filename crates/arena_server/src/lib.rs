//! # Arena Dedicated Server
//!
//! Headless harness around [`arena_core`]: loads configuration and
//! ability content from RON files, wires a gateway, and drives the
//! engine tick loop. No rendering; transport integration plugs in
//! behind the [`BroadcastGateway`](arena_core::net::BroadcastGateway)
//! trait.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use arena_core::config::EngineConfig;
use arena_core::data::AbilityBook;
use arena_core::math::Fixed;
use arena_core::net::{BroadcastGateway, CastAnnouncement};
use arena_core::projectile::Projectile;
use arena_core::units::UnitId;

/// Errors raised while bringing the server up.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration document failed to parse.
    #[error("Failed to parse config '{path}': {message}")]
    ConfigParse {
        /// Path that failed.
        path: String,
        /// Error message.
        message: String,
    },

    /// Content loading failed inside the engine.
    #[error(transparent)]
    Engine(#[from] arena_core::error::EngineError),
}

/// Server configuration, loaded from RON at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Simulation tick length in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u32,
    /// When false, every computed cooldown is zero (practice mode).
    #[serde(default = "enabled")]
    pub cooldowns_enabled: bool,
    /// When false, casts neither check nor deduct mana.
    #[serde(default = "enabled")]
    pub mana_costs_enabled: bool,
}

const fn default_tick_ms() -> u32 {
    // 30 Hz, the cadence clients interpolate against
    33
}

const fn enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            cooldowns_enabled: true,
            mana_costs_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Parse a RON configuration document.
    pub fn from_ron_str(label: &str, source: &str) -> Result<Self, ServerError> {
        ron::from_str(source).map_err(|e| ServerError::ConfigParse {
            path: label.to_string(),
            message: e.to_string(),
        })
    }

    /// Load configuration from a RON file.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let source = std::fs::read_to_string(path).map_err(|e| ServerError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_ron_str(&path.display().to_string(), &source)
    }

    /// The engine flags this configuration selects.
    #[must_use]
    pub const fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            cooldowns_enabled: self.cooldowns_enabled,
            mana_costs_enabled: self.mana_costs_enabled,
        }
    }
}

/// Load an ability content file into a book.
pub fn load_ability_book(path: &Path) -> Result<AbilityBook, ServerError> {
    let source = std::fs::read_to_string(path).map_err(|e| ServerError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let book = AbilityBook::from_ron_str(&path.display().to_string(), &source)?;
    tracing::info!(path = %path.display(), abilities = book.len(), "ability content loaded");
    Ok(book)
}

/// Gateway that logs every notification through `tracing`.
///
/// Stands in for the network layer during headless runs; a transport
/// implementation replaces it without touching the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingGateway;

impl BroadcastGateway for TracingGateway {
    fn notify_cast(&mut self, announcement: &CastAnnouncement) {
        tracing::debug!(
            caster = announcement.caster,
            slot = announcement.slot,
            ability_id = announcement.ability_id,
            cast_net_id = announcement.cast_net_id,
            "cast announced"
        );
    }

    fn notify_cooldown(&mut self, unit: UnitId, slot: u8, current: Fixed, max: Fixed) {
        tracing::debug!(unit, slot, %current, %max, "cooldown update");
    }

    fn notify_projectile_spawn(&mut self, projectile: &Projectile) {
        tracing::debug!(
            net_id = projectile.net_id,
            name = %projectile.name,
            owner = projectile.owner,
            "projectile spawned"
        );
    }

    fn notify_spell_animation(&mut self, target: UnitId, animation: &str) {
        tracing::debug!(target, animation, "spell animation");
    }
}
