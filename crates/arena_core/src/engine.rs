//! The engine facade the protocol layer talks to.
//!
//! All `cast`/override calls triggered by client requests and all
//! per-tick updates run on the single simulation thread, in sequence;
//! no operation here blocks or suspends. Notifications leave through
//! the [`BroadcastGateway`] synchronously, always after the state
//! mutation they describe.

use std::collections::HashMap;

use crate::ability::CastTarget;
use crate::behavior::BehaviorRegistry;
use crate::config::EngineConfig;
use crate::data::AbilityBook;
use crate::error::{EngineError, Result};
use crate::math::{Fixed, Vec2Fixed};
use crate::net::{BroadcastGateway, NetIdAllocator};
use crate::projectile::ObjectRegistry;
use crate::units::{Unit, UnitId, UnitRef};

/// Visual-effects collaborator.
///
/// The engine requests particles; rendering and replication are
/// someone else's job.
pub trait VisualEffects {
    /// Attach a particle effect to a target unit on behalf of `owner`.
    fn add_particle_target(&mut self, owner: UnitId, effect: &str, target: UnitId);
}

/// Visual-effects implementation that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopVisualEffects;

impl VisualEffects for NoopVisualEffects {
    fn add_particle_target(&mut self, _owner: UnitId, _effect: &str, _target: UnitId) {}
}

/// Fire-and-forget events published for external subscribers
/// (UI notifications, achievement tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// An ability gained a level.
    AbilityLeveled {
        /// Owning unit.
        unit: UnitId,
        /// Slot of the leveled ability.
        slot: u8,
        /// New level.
        level: u8,
    },
}

/// Mutable collaborators threaded through ability code.
///
/// Bundles everything a cast or tick may touch besides the units
/// themselves, so unit and ability borrows stay disjoint from the
/// engine's shared state.
pub struct EngineCtx<'a> {
    /// Immutable simulation flags.
    pub config: &'a EngineConfig,
    /// Network id source.
    pub ids: &'a mut NetIdAllocator,
    /// Client notification sink.
    pub gateway: &'a mut dyn BroadcastGateway,
    /// World-side store for spawned projectiles/lasers.
    pub objects: &'a mut ObjectRegistry,
    /// Particle collaborator.
    pub vfx: &'a mut dyn VisualEffects,
    /// Event channel for external subscribers.
    pub events: &'a mut Vec<EngineEvent>,
}

/// Storage for all simulated units.
///
/// `HashMap` for O(1) lookup by id, with deterministic iteration via
/// sorted keys when ticking.
#[derive(Debug, Default)]
pub struct UnitStorage {
    units: HashMap<UnitId, Unit>,
    next_id: UnitId,
}

impl UnitStorage {
    /// Create empty unit storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            units: HashMap::new(),
            next_id: 1,
        }
    }

    /// Create a unit at a position and return its id.
    pub fn spawn(&mut self, position: Vec2Fixed) -> UnitId {
        let id = self.next_id;
        self.next_id += 1;
        self.units.insert(id, Unit::new(id, position));
        id
    }

    /// Get a unit by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Get a mutable unit by id.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Remove a unit from storage, taking ownership.
    pub fn take(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    /// Put a unit back into storage.
    pub fn put_back(&mut self, unit: Unit) {
        self.units.insert(unit.id, unit);
    }

    /// Check if a unit exists.
    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Sorted unit ids for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self.units.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// The ability casting & resolution engine.
///
/// Owns the authoritative unit/ability state, the network id
/// allocator and the spawned-object registry. The gateway and the
/// visual-effects collaborator are external and passed into each
/// entry point by the caller.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    ids: NetIdAllocator,
    units: UnitStorage,
    objects: ObjectRegistry,
    events: Vec<EngineEvent>,
}

impl Engine {
    /// Create an engine with the given immutable configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ids: NetIdAllocator::new(),
            units: UnitStorage::new(),
            objects: ObjectRegistry::new(),
            events: Vec::new(),
        }
    }

    /// The immutable configuration the engine was built with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Unit storage, read-only.
    #[must_use]
    pub const fn units(&self) -> &UnitStorage {
        &self.units
    }

    /// Mutable unit storage, for world-simulation collaborators
    /// (movement, stat modifiers).
    pub fn units_mut(&mut self) -> &mut UnitStorage {
        &mut self.units
    }

    /// Spawned-object registry, read-only.
    #[must_use]
    pub const fn objects(&self) -> &ObjectRegistry {
        &self.objects
    }

    /// Spawn a unit with no abilities bound.
    pub fn spawn_unit(&mut self, position: Vec2Fixed) -> UnitId {
        let id = self.units.spawn(position);
        tracing::debug!(unit = id, "unit spawned");
        id
    }

    /// Bind an ability from the content book to a unit slot.
    pub fn bind_ability(
        &mut self,
        unit: UnitId,
        slot: u8,
        name: &str,
        book: &AbilityBook,
        behaviors: &BehaviorRegistry,
    ) -> Result<()> {
        let template = book.get(name)?;
        let behavior = behaviors.bind(name);
        let target = self
            .units
            .get_mut(unit)
            .ok_or(EngineError::UnknownUnit(unit))?;
        target.add_ability(slot, template, behavior);
        Ok(())
    }

    /// Bind an item-granted ability; returns the ability slot used.
    pub fn grant_item_ability(
        &mut self,
        unit: UnitId,
        item_slot: u8,
        name: &str,
        book: &AbilityBook,
        behaviors: &BehaviorRegistry,
    ) -> Result<u8> {
        let template = book.get(name)?;
        let behavior = behaviors.bind(name);
        let target = self
            .units
            .get_mut(unit)
            .ok_or(EngineError::UnknownUnit(unit))?;
        Ok(target.grant_item_ability(item_slot, template, behavior))
    }

    fn with_ctx<R>(
        &mut self,
        gateway: &mut dyn BroadcastGateway,
        vfx: &mut dyn VisualEffects,
        f: impl FnOnce(&mut UnitStorage, &mut EngineCtx<'_>) -> R,
    ) -> R {
        let mut ctx = EngineCtx {
            config: &self.config,
            ids: &mut self.ids,
            gateway,
            objects: &mut self.objects,
            vfx,
            events: &mut self.events,
        };
        f(&mut self.units, &mut ctx)
    }

    /// Handle a validated client cast request.
    ///
    /// Resolves the designated target's position (when one is named)
    /// and drives the slot's state machine. Returns false for every
    /// validation failure, including unknown units and empty slots.
    pub fn cast_request(
        &mut self,
        unit: UnitId,
        slot: u8,
        target: CastTarget,
        gateway: &mut dyn BroadcastGateway,
        vfx: &mut dyn VisualEffects,
    ) -> bool {
        let target_pos = target
            .unit
            .and_then(|id| self.units.get(id).map(|u| u.position));
        self.with_ctx(gateway, vfx, |units, ctx| match units.get_mut(unit) {
            Some(caster) => caster.cast(slot, target, target_pos, ctx),
            None => false,
        })
    }

    /// Advance the whole engine by one simulation tick.
    ///
    /// Every ability instance of every unit is updated, regardless of
    /// state, in sorted unit order.
    pub fn tick(
        &mut self,
        delta_ms: u32,
        gateway: &mut dyn BroadcastGateway,
        vfx: &mut dyn VisualEffects,
    ) {
        let ids = self.units.sorted_ids();
        self.with_ctx(gateway, vfx, |units, ctx| {
            for id in ids {
                if let Some(unit) = units.get_mut(id) {
                    unit.update(delta_ms, ctx);
                }
            }
        });
    }

    /// Level up an ability slot.
    pub fn level_up(
        &mut self,
        unit: UnitId,
        slot: u8,
        gateway: &mut dyn BroadcastGateway,
        vfx: &mut dyn VisualEffects,
    ) -> Result<()> {
        self.with_ctx(gateway, vfx, |units, ctx| {
            units
                .get_mut(unit)
                .ok_or(EngineError::UnknownUnit(unit))?
                .level_up(slot, ctx)
        })
    }

    /// Administrative cooldown override (items, other abilities).
    pub fn set_cooldown(
        &mut self,
        unit: UnitId,
        slot: u8,
        value: Fixed,
        gateway: &mut dyn BroadcastGateway,
        vfx: &mut dyn VisualEffects,
    ) -> Result<()> {
        self.with_ctx(gateway, vfx, |units, ctx| {
            units
                .get_mut(unit)
                .ok_or(EngineError::UnknownUnit(unit))?
                .set_cooldown(slot, value, ctx)
        })
    }

    /// Administrative override lowering a slot's remaining cooldown.
    pub fn lower_cooldown(
        &mut self,
        unit: UnitId,
        slot: u8,
        delta: Fixed,
        gateway: &mut dyn BroadcastGateway,
        vfx: &mut dyn VisualEffects,
    ) -> Result<()> {
        self.with_ctx(gateway, vfx, |units, ctx| {
            units
                .get_mut(unit)
                .ok_or(EngineError::UnknownUnit(unit))?
                .lower_cooldown(slot, delta, ctx)
        })
    }

    /// A projectile registered a hit on a unit; apply the owning
    /// ability's effects to it.
    ///
    /// The back-reference from the projectile to its ability is a
    /// lookup, not ownership: if the owning unit or slot has since
    /// gone away, the hit resolves to an error and nothing is applied.
    /// Hits routed back at the caster itself are ignored.
    pub fn resolve_hit(
        &mut self,
        projectile_net_id: u32,
        target: UnitId,
        gateway: &mut dyn BroadcastGateway,
        vfx: &mut dyn VisualEffects,
    ) -> Result<()> {
        let projectile = self
            .objects
            .projectile(projectile_net_id)
            .cloned()
            .ok_or(EngineError::UnknownProjectile(projectile_net_id))?;
        let caster_id = projectile.source.unit;
        if caster_id == target {
            tracing::debug!(projectile = projectile_net_id, "self-hit ignored");
            return Ok(());
        }
        self.with_ctx(gateway, vfx, |units, ctx| {
            let mut hit_unit = units.take(target).ok_or(EngineError::UnknownUnit(target))?;
            let result = match units.get_mut(caster_id) {
                Some(caster) => {
                    let mut target_ref = UnitRef {
                        id: hit_unit.id,
                        position: hit_unit.position,
                        stats: &mut hit_unit.stats,
                    };
                    caster.apply_ability_effects(
                        projectile.source.slot,
                        &mut target_ref,
                        Some(&projectile),
                        ctx,
                    )
                }
                None => Err(EngineError::UnknownUnit(caster_id)),
            };
            units.put_back(hit_unit);
            result
        })
    }

    /// Drain the published events accumulated since the last call.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}
