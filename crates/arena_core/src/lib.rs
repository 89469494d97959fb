//! # Arena Core
//!
//! Server-authoritative ability casting & resolution engine for a
//! real-time multiplayer action game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No transport (the gateway is a trait seam)
//! - No floating-point math (uses fixed-point)
//!
//! Clients send cast requests; the engine validates mana, range and
//! state, drives per-slot cast/channel/cooldown timers every tick,
//! spawns projectiles, and notifies the broadcast gateway only after
//! the state mutation a notification describes.
//!
//! ## Crate Structure
//!
//! - [`ability`] - The per-slot cast state machine
//! - [`behavior`] - Per-ability extension points and registry
//! - [`data`] - Ability template content
//! - [`engine`] - Facade, tick loop and unit storage
//! - [`net`] - Id allocation and the gateway contract
//! - [`projectile`] - Spawned missile/laser entities
//! - [`units`] - Units, stat blocks and slots
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ability;
pub mod behavior;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod math;
pub mod net;
pub mod projectile;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ability::{
        AbilityInstance, AbilityState, CastTarget, PASSIVE_SLOT, PRIMARY_SLOTS,
    };
    pub use crate::behavior::{AbilityBehavior, BehaviorRegistry, NoopBehavior};
    pub use crate::config::EngineConfig;
    pub use crate::data::{AbilityBook, AbilityData, TargetingMode, MAX_ABILITY_LEVEL};
    pub use crate::engine::{Engine, EngineCtx, EngineEvent, NoopVisualEffects, VisualEffects};
    pub use crate::error::{EngineError, Result};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::net::{BroadcastGateway, CastAnnouncement, NetId, NetIdAllocator, NullGateway};
    pub use crate::projectile::{FollowTarget, GameObject, Laser, ObjectRegistry, Projectile};
    pub use crate::units::{StatBlock, Unit, UnitId, UnitRef};
}
