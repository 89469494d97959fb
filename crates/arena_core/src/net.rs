//! Network-facing seams: id allocation, name hashing and the broadcast
//! gateway contract.
//!
//! The engine only ever *calls* the gateway; packet encoding and
//! per-client delivery live outside this crate. Every notification is
//! emitted synchronously, after the state mutation it describes.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};
use crate::projectile::Projectile;
use crate::units::UnitId;

/// Unique identifier for a networked entity or event.
pub type NetId = u32;

/// Process-wide monotonic id source for networked entities.
///
/// Ids are strictly increasing, never reused and never reset within a
/// session. Single simulation thread only; no interior locking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetIdAllocator {
    next: NetId,
}

impl NetIdAllocator {
    /// First id handed out. Low values are reserved for static map
    /// objects assigned at load time.
    pub const FIRST_DYNAMIC_ID: NetId = 0x4000_0000;

    /// Create a fresh allocator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: Self::FIRST_DYNAMIC_ID,
        }
    }

    /// Hand out the next id.
    pub fn allocate(&mut self) -> NetId {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for NetIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic hash of an ability name.
///
/// The stable identifier clients use for their lookup tables; the
/// algorithm (lowercased ELF-style hash) is part of the client contract
/// and must not change.
#[must_use]
pub fn hash_name(name: &str) -> u32 {
    let mut hash: u32 = 0;
    for c in name.chars().flat_map(char::to_lowercase) {
        hash = (c as u32).wrapping_add(hash.wrapping_mul(16));
        let overflow = hash & 0xF000_0000;
        if overflow != 0 {
            hash ^= overflow ^ (overflow >> 24);
        }
    }
    hash
}

/// Payload of the cast-announcement notification.
///
/// Carries both network ids allocated at cast time so clients can
/// correlate the later projectile spawn with this cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastAnnouncement {
    /// Casting unit.
    pub caster: UnitId,
    /// Slot the cast came from.
    pub slot: u8,
    /// Stable ability identifier ([`hash_name`] of the ability name).
    pub ability_id: u32,
    /// First cast coordinate pair.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// First cast coordinate pair.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
    /// Second cast coordinate pair (drag/vector casts).
    #[serde(with = "fixed_serde")]
    pub x2: Fixed,
    /// Second cast coordinate pair (drag/vector casts).
    #[serde(with = "fixed_serde")]
    pub y2: Fixed,
    /// Net id of the cast event itself.
    pub cast_net_id: NetId,
    /// Net id reserved for the projectile this cast may spawn.
    pub reserved_proj_net_id: NetId,
}

/// State-change notifications broadcast to connected clients.
///
/// All sends are fire-and-forget and at-most-once per call; delivery
/// and per-client ordering are the gateway's problem.
pub trait BroadcastGateway {
    /// A cast was accepted and committed server-side.
    fn notify_cast(&mut self, announcement: &CastAnnouncement);

    /// A slot's cooldown changed (entry, clear or override).
    fn notify_cooldown(&mut self, unit: UnitId, slot: u8, current: Fixed, max: Fixed);

    /// A projectile entity was spawned.
    fn notify_projectile_spawn(&mut self, projectile: &Projectile);

    /// Play a spell animation on a unit.
    fn notify_spell_animation(&mut self, target: UnitId, animation: &str);
}

/// Gateway that drops every notification. Used by headless simulations
/// and tests that don't inspect traffic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGateway;

impl BroadcastGateway for NullGateway {
    fn notify_cast(&mut self, _announcement: &CastAnnouncement) {}
    fn notify_cooldown(&mut self, _unit: UnitId, _slot: u8, _current: Fixed, _max: Fixed) {}
    fn notify_projectile_spawn(&mut self, _projectile: &Projectile) {}
    fn notify_spell_animation(&mut self, _target: UnitId, _animation: &str) {}
}
