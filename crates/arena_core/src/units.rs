//! Units and their ability slots.
//!
//! A unit exclusively owns one [`AbilityInstance`] per populated slot.
//! The stat block (mana, reduction fractions, casting flag) is owned by
//! the unit and read/written directly by the ability engine; the single
//! simulation thread is the only race-prevention mechanism.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::ability::{AbilityInstance, CastTarget};
use crate::behavior::AbilityBehavior;
use crate::data::AbilityData;
use crate::engine::EngineCtx;
use crate::error::{EngineError, Result};
use crate::math::{Fixed, Vec2Fixed};

/// Unique unit identifier within a session.
pub type UnitId = u32;

/// First slot used by item-granted abilities (item slot + this offset).
pub const ITEM_SLOT_OFFSET: u8 = 6;

/// Resource and modifier block owned by a unit.
///
/// External effects (items, buffs) mutate these values; the ability
/// engine reads them on every cast and cooldown computation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatBlock {
    /// Current mana.
    pub current_mana: Fixed,
    /// Maximum mana.
    pub max_mana: Fixed,
    /// Multiplicative cooldown reduction fraction (0..1).
    pub cooldown_reduction: Fixed,
    /// Multiplicative mana-cost reduction fraction (0..1).
    pub cost_reduction: Fixed,
    /// Mana cost shown to the client for each primary slot, refreshed
    /// on level-up.
    pub displayed_mana_cost: [Fixed; 4],
    /// Set while a cast timer is running.
    pub is_casting: bool,
}

/// Borrowed view of a unit handed to ability code and behavior hooks.
///
/// Carries the identity and position by value and the stat block by
/// mutable reference, so an ability instance and its owner's stats can
/// be borrowed at the same time.
#[derive(Debug)]
pub struct UnitRef<'a> {
    /// Unit identifier.
    pub id: UnitId,
    /// Current world position.
    pub position: Vec2Fixed,
    /// Mutable stat block.
    pub stats: &'a mut StatBlock,
}

/// A simulated unit with its ability slots.
#[derive(Debug)]
pub struct Unit {
    /// Unit identifier.
    pub id: UnitId,
    /// Current world position.
    pub position: Vec2Fixed,
    /// Resource and modifier block.
    pub stats: StatBlock,
    abilities: BTreeMap<u8, AbilityInstance>,
}

impl Unit {
    /// Create a unit with no abilities bound.
    #[must_use]
    pub fn new(id: UnitId, position: Vec2Fixed) -> Self {
        Self {
            id,
            position,
            stats: StatBlock::default(),
            abilities: BTreeMap::new(),
        }
    }

    /// Bind an ability to a slot, running its activation hook.
    ///
    /// Replaces any previous occupant of the slot without running the
    /// old behavior's deactivation hook (the caller removes first when
    /// that matters).
    pub fn add_ability(
        &mut self,
        slot: u8,
        template: Arc<AbilityData>,
        behavior: Box<dyn AbilityBehavior>,
    ) {
        let mut instance = AbilityInstance::new(template, slot, behavior);
        let mut owner = UnitRef {
            id: self.id,
            position: self.position,
            stats: &mut self.stats,
        };
        instance.activate(&mut owner);
        self.abilities.insert(slot, instance);
    }

    /// Unbind the ability in a slot, running its deactivation hook.
    pub fn remove_ability(&mut self, slot: u8) -> Option<AbilityInstance> {
        let mut instance = self.abilities.remove(&slot)?;
        let mut owner = UnitRef {
            id: self.id,
            position: self.position,
            stats: &mut self.stats,
        };
        instance.deactivate(&mut owner);
        Some(instance)
    }

    /// Bind an item-granted ability; returns the ability slot used.
    ///
    /// Item slot N maps to ability slot N + [`ITEM_SLOT_OFFSET`], the
    /// interface the item economy plugs into.
    pub fn grant_item_ability(
        &mut self,
        item_slot: u8,
        template: Arc<AbilityData>,
        behavior: Box<dyn AbilityBehavior>,
    ) -> u8 {
        let slot = item_slot + ITEM_SLOT_OFFSET;
        self.add_ability(slot, template, behavior);
        slot
    }

    /// Ability bound to a slot, if any.
    #[must_use]
    pub fn ability(&self, slot: u8) -> Option<&AbilityInstance> {
        self.abilities.get(&slot)
    }

    /// Mutable ability bound to a slot, if any.
    pub fn ability_mut(&mut self, slot: u8) -> Option<&mut AbilityInstance> {
        self.abilities.get_mut(&slot)
    }

    /// Iterate bound abilities in slot order.
    pub fn abilities(&self) -> impl Iterator<Item = &AbilityInstance> {
        self.abilities.values()
    }

    /// Attempt to cast the ability in `slot`.
    ///
    /// Returns false for unpopulated slots, mirroring every other
    /// validation failure.
    pub fn cast(
        &mut self,
        slot: u8,
        target: CastTarget,
        target_pos: Option<Vec2Fixed>,
        ctx: &mut EngineCtx<'_>,
    ) -> bool {
        let id = self.id;
        let position = self.position;
        let stats = &mut self.stats;
        match self.abilities.get_mut(&slot) {
            Some(ability) => {
                let mut owner = UnitRef {
                    id,
                    position,
                    stats,
                };
                ability.cast(&mut owner, target, target_pos, ctx)
            }
            None => false,
        }
    }

    /// Advance every ability instance by one tick, in slot order.
    pub fn update(&mut self, delta_ms: u32, ctx: &mut EngineCtx<'_>) {
        let id = self.id;
        let position = self.position;
        let stats = &mut self.stats;
        for ability in self.abilities.values_mut() {
            let mut owner = UnitRef {
                id,
                position,
                stats: &mut *stats,
            };
            ability.update(delta_ms, &mut owner, ctx);
        }
    }

    /// Level up the ability in `slot`.
    pub fn level_up(&mut self, slot: u8, ctx: &mut EngineCtx<'_>) -> Result<()> {
        let id = self.id;
        let position = self.position;
        let stats = &mut self.stats;
        let ability = self
            .abilities
            .get_mut(&slot)
            .ok_or(EngineError::InvalidSlot(slot))?;
        let mut owner = UnitRef {
            id,
            position,
            stats,
        };
        ability.level_up(&mut owner, ctx);
        Ok(())
    }

    /// Administrative cooldown override on the ability in `slot`.
    ///
    /// `value <= 0` forces `Ready` with zero cooldown; otherwise forces
    /// `Cooldown` with the given remaining time, silently discarding
    /// any in-progress cast or channel timer. The state is committed
    /// first, then a cooldown notification is emitted for *any* slot,
    /// unlike the automatic cooldown-entry path which only notifies
    /// primary slots.
    pub fn set_cooldown(&mut self, slot: u8, value: Fixed, ctx: &mut EngineCtx<'_>) -> Result<()> {
        let id = self.id;
        let stats = &mut self.stats;
        let ability = self
            .abilities
            .get_mut(&slot)
            .ok_or(EngineError::InvalidSlot(slot))?;
        if value <= Fixed::ZERO {
            ability.force_ready();
            ctx.gateway.notify_cooldown(id, slot, Fixed::ZERO, Fixed::ZERO);
        } else {
            ability.force_cooldown(value);
            let max = ability.cooldown_duration(ctx.config, stats);
            ctx.gateway.notify_cooldown(id, slot, value, max);
        }
        Ok(())
    }

    /// Apply the effects of the ability in `slot` to a hit unit.
    ///
    /// Invoked by the world when a spawned projectile or area effect
    /// registers a hit; `projectile` is `None` for instant-hit
    /// applications.
    pub fn apply_ability_effects(
        &mut self,
        slot: u8,
        target: &mut UnitRef<'_>,
        projectile: Option<&crate::projectile::Projectile>,
        ctx: &mut EngineCtx<'_>,
    ) -> Result<()> {
        let id = self.id;
        let position = self.position;
        let stats = &mut self.stats;
        let ability = self
            .abilities
            .get_mut(&slot)
            .ok_or(EngineError::InvalidSlot(slot))?;
        let mut owner = UnitRef {
            id,
            position,
            stats,
        };
        ability.apply_effects(&mut owner, target, projectile, ctx);
        Ok(())
    }

    /// Administrative override lowering a slot's remaining cooldown.
    ///
    /// Dropping to or below zero forces the slot back to `Ready`.
    pub fn lower_cooldown(&mut self, slot: u8, delta: Fixed, ctx: &mut EngineCtx<'_>) -> Result<()> {
        let current = self
            .abilities
            .get(&slot)
            .ok_or(EngineError::InvalidSlot(slot))?
            .current_cooldown();
        self.set_cooldown(slot, current - delta, ctx)
    }
}
