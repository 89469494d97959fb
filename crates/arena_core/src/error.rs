//! Error types for the ability engine.
//!
//! Expected cast failures (insufficient mana, wrong state, out of range)
//! are not errors; [`cast`](crate::ability::AbilityInstance::cast) reports
//! them with a plain `bool`. These types cover the fallible surfaces:
//! content loading and facade lookups.

use thiserror::Error;

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level error type for the ability engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No ability template exists for the given name.
    #[error("Unknown ability: {0}")]
    UnknownAbility(String),

    /// Content file parsing error.
    #[error("Failed to parse ability data '{path}': {message}")]
    DataParseError {
        /// Path or label of the document that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Invalid unit identifier.
    #[error("Unknown unit ID: {0}")]
    UnknownUnit(u32),

    /// Ability slot outside the declared range, or not populated.
    #[error("Invalid ability slot: {0}")]
    InvalidSlot(u8),

    /// No registered projectile carries the given network id.
    #[error("Unknown projectile: {0}")]
    UnknownProjectile(u32),
}
