//! The per-slot ability state machine.
//!
//! One [`AbilityInstance`] exists per ability slot per unit and cycles
//! `Ready → Casting → (Channeling) → Cooldown → Ready` for the life of
//! the unit. Cast validation, mana deduction, network-id allocation and
//! all gateway notifications happen here, in that order: state is
//! always committed before the packet that describes it.

use std::sync::Arc;

use crate::behavior::{AbilityBehavior, NoopBehavior};
use crate::config::EngineConfig;
use crate::data::{AbilityData, MAX_ABILITY_LEVEL};
use crate::engine::{EngineCtx, EngineEvent};
use crate::math::{
    millis_fixed_to_seconds, millis_to_seconds, seconds_to_millis, Fixed, Vec2Fixed,
};
use crate::net::{hash_name, CastAnnouncement, NetId};
use crate::projectile::{AbilitySource, FollowTarget, GameObject, Laser, Projectile};
use crate::units::{StatBlock, UnitRef};

/// Number of primary ability slots (0..=3). Automatic cooldown
/// notifications are restricted to these.
pub const PRIMARY_SLOTS: u8 = 4;

/// Distinguished slot id for the passive ability.
pub const PASSIVE_SLOT: u8 = 14;

/// Phase of the cast cycle an ability instance is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AbilityState {
    /// Castable.
    #[default]
    Ready,
    /// Cast timer running.
    Casting,
    /// Cooldown timer running.
    Cooldown,
    /// Channel timer running.
    Channeling,
}

/// Target descriptor recorded at cast time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastTarget {
    /// First coordinate pair of the request.
    pub point: Vec2Fixed,
    /// Second coordinate pair (drag/vector casts).
    pub point2: Vec2Fixed,
    /// Designated unit target, if any.
    pub unit: Option<crate::units::UnitId>,
}

/// One ability bound to one slot on one unit.
///
/// Holds the live timers, the last-cast target and the two network ids
/// allocated at cast time. Exactly one timer is live at a time,
/// matching [`AbilityState`]. Timers are held in fixed-point
/// milliseconds so integer tick deltas subtract exactly however a
/// duration is split across ticks; the accessors report seconds.
pub struct AbilityInstance {
    name: String,
    template: Arc<AbilityData>,
    slot: u8,
    level: u8,
    state: AbilityState,
    current_cast_time: Fixed,
    current_cooldown: Fixed,
    current_channel_duration: Fixed,
    target: CastTarget,
    cast_net_id: NetId,
    reserved_proj_net_id: NetId,
    behavior: Box<dyn AbilityBehavior>,
}

impl std::fmt::Debug for AbilityInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbilityInstance")
            .field("name", &self.name)
            .field("slot", &self.slot)
            .field("level", &self.level)
            .field("state", &self.state)
            .field("cooldown", &self.current_cooldown())
            .finish_non_exhaustive()
    }
}

impl AbilityInstance {
    /// Bind an ability template and behavior to a slot.
    #[must_use]
    pub fn new(template: Arc<AbilityData>, slot: u8, behavior: Box<dyn AbilityBehavior>) -> Self {
        Self {
            name: template.id.clone(),
            template,
            slot,
            level: 0,
            state: AbilityState::Ready,
            current_cast_time: Fixed::ZERO,
            current_cooldown: Fixed::ZERO,
            current_channel_duration: Fixed::ZERO,
            target: CastTarget::default(),
            cast_net_id: 0,
            reserved_proj_net_id: 0,
            behavior,
        }
    }

    /// Ability name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable client-facing identifier: the deterministic hash of the
    /// ability name.
    #[must_use]
    pub fn id(&self) -> u32 {
        hash_name(&self.name)
    }

    /// Slot this instance occupies.
    #[must_use]
    pub const fn slot(&self) -> u8 {
        self.slot
    }

    /// Current level (0..=5).
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Current state-machine phase.
    #[must_use]
    pub const fn state(&self) -> AbilityState {
        self.state
    }

    /// Remaining cooldown time in seconds.
    #[must_use]
    pub fn current_cooldown(&self) -> Fixed {
        millis_fixed_to_seconds(self.current_cooldown)
    }

    /// Remaining cast time in seconds.
    #[must_use]
    pub fn current_cast_time(&self) -> Fixed {
        millis_fixed_to_seconds(self.current_cast_time)
    }

    /// Remaining channel time in seconds.
    #[must_use]
    pub fn current_channel_duration(&self) -> Fixed {
        millis_fixed_to_seconds(self.current_channel_duration)
    }

    /// Target recorded by the last successful cast.
    #[must_use]
    pub const fn target(&self) -> CastTarget {
        self.target
    }

    /// Net id of the last cast event.
    #[must_use]
    pub const fn cast_net_id(&self) -> NetId {
        self.cast_net_id
    }

    /// Net id reserved for the projectile of the last cast.
    #[must_use]
    pub const fn reserved_proj_net_id(&self) -> NetId {
        self.reserved_proj_net_id
    }

    /// Shared template reference.
    #[must_use]
    pub fn template(&self) -> &Arc<AbilityData> {
        &self.template
    }

    /// Whether a real behavior script is bound.
    #[must_use]
    pub fn is_scripted(&self) -> bool {
        self.behavior.is_scripted()
    }

    /// Keyboard label for the slot.
    #[must_use]
    pub fn slot_key(&self) -> &'static str {
        match self.slot {
            0 => "Q",
            1 => "W",
            2 => "E",
            3 => "R",
            PASSIVE_SLOT => "Passive",
            _ => "undefined",
        }
    }

    /// Run a behavior hook with the instance itself borrowable.
    ///
    /// The behavior is swapped out for the duration of the call so the
    /// hook can receive `&mut self` without aliasing it.
    fn with_behavior<R>(
        &mut self,
        f: impl FnOnce(&mut Self, &mut dyn AbilityBehavior) -> R,
    ) -> R {
        let mut behavior: Box<dyn AbilityBehavior> =
            std::mem::replace(&mut self.behavior, Box::new(NoopBehavior));
        let out = f(self, behavior.as_mut());
        self.behavior = behavior;
        out
    }

    /// Run the activation hook. Called once when the instance is bound
    /// to its slot.
    pub fn activate(&mut self, owner: &mut UnitRef<'_>) {
        self.with_behavior(|_, b| b.on_activate(owner));
    }

    /// Run the deactivation hook. Called when the instance leaves its
    /// slot.
    pub fn deactivate(&mut self, owner: &mut UnitRef<'_>) {
        self.with_behavior(|_, b| b.on_deactivate(owner));
    }

    /// Effective mana cost at the current level after the caster's cost
    /// reduction.
    #[must_use]
    pub fn effective_mana_cost(&self, stats: &StatBlock) -> Fixed {
        self.template.mana_cost(self.level) * (Fixed::ONE - stats.cost_reduction)
    }

    /// Cooldown duration the instance enters after a finished cast.
    ///
    /// Zero when cooldowns are disabled by configuration.
    #[must_use]
    pub fn cooldown_duration(&self, config: &EngineConfig, stats: &StatBlock) -> Fixed {
        if config.cooldowns_enabled {
            self.template.cooldown(self.level) * (Fixed::ONE - stats.cooldown_reduction)
        } else {
            Fixed::ZERO
        }
    }

    /// Attempt to cast.
    ///
    /// `target_pos` is the designated unit target's current position,
    /// resolved by the caller; it is only consulted for unit-targeted
    /// templates. Returns false (with no state change, no mana
    /// deduction, no id allocation and no notification) when the
    /// ability is unscripted, not `Ready`, out of range, or the caster
    /// lacks mana (equality fails). On success mana is deducted first,
    /// both network ids are allocated, the start-casting hook runs, the
    /// state transition commits, and only then is the announcement
    /// broadcast. There is no rollback path.
    pub fn cast(
        &mut self,
        owner: &mut UnitRef<'_>,
        target: CastTarget,
        target_pos: Option<Vec2Fixed>,
        ctx: &mut EngineCtx<'_>,
    ) -> bool {
        if !self.behavior.is_scripted() {
            return false;
        }
        if self.state != AbilityState::Ready {
            return false;
        }
        if self.template.targeting.requires_unit_target() {
            if let (Some(_), Some(pos)) = (target.unit, target_pos) {
                let range = self.template.cast_range(self.level);
                if !owner.position.within_range(pos, range) {
                    tracing::trace!(
                        ability = %self.name,
                        slot = self.slot,
                        "cast rejected: target out of range"
                    );
                    return false;
                }
            }
        }
        if ctx.config.mana_costs_enabled {
            let cost = self.effective_mana_cost(owner.stats);
            if cost >= owner.stats.current_mana {
                tracing::trace!(
                    ability = %self.name,
                    slot = self.slot,
                    "cast rejected: insufficient mana"
                );
                return false;
            }
            // Deducted before any further effect; irreversible.
            owner.stats.current_mana -= cost;
        }

        self.target = target;
        self.reserved_proj_net_id = ctx.ids.allocate();
        self.cast_net_id = ctx.ids.allocate();

        self.with_behavior(|ability, b| b.on_start_casting(owner, ability, ctx));

        if self.template.cast_time(self.level) > Fixed::ZERO && !self.template.is_instant() {
            self.state = AbilityState::Casting;
            self.current_cast_time = seconds_to_millis(self.template.cast_time(self.level));
        } else {
            self.finish_casting(owner, ctx);
        }

        ctx.gateway.notify_cast(&CastAnnouncement {
            caster: owner.id,
            slot: self.slot,
            ability_id: self.id(),
            x: target.point.x,
            y: target.point.y,
            x2: target.point2.x,
            y2: target.point2.y,
            cast_net_id: self.cast_net_id,
            reserved_proj_net_id: self.reserved_proj_net_id,
        });
        tracing::debug!(ability = %self.name, slot = self.slot, "cast accepted");
        true
    }

    /// Advance the state machine by one tick.
    ///
    /// Invoked every tick for every instance regardless of state. The
    /// per-tick behavior hook always runs first; a cast that completes
    /// this tick transitions onward (to `Channeling` or `Cooldown`)
    /// within the same call.
    pub fn update(&mut self, delta_ms: u32, owner: &mut UnitRef<'_>, ctx: &mut EngineCtx<'_>) {
        let delta = Fixed::from_num(delta_ms);
        self.with_behavior(|_, b| b.on_update(millis_to_seconds(delta_ms)));
        match self.state {
            AbilityState::Ready => {}
            AbilityState::Casting => {
                owner.stats.is_casting = true;
                self.current_cast_time -= delta;
                if self.current_cast_time <= Fixed::ZERO {
                    self.finish_casting(owner, ctx);
                    if self.template.channel_duration(self.level) > Fixed::ZERO {
                        self.channel();
                    }
                }
            }
            AbilityState::Cooldown => {
                self.current_cooldown -= delta;
                // Strictly negative: an exactly-exhausted timer waits
                // one more tick.
                if self.current_cooldown < Fixed::ZERO {
                    self.state = AbilityState::Ready;
                }
            }
            AbilityState::Channeling => {
                self.current_channel_duration -= delta;
                if self.current_channel_duration <= Fixed::ZERO {
                    self.finish_channeling(owner, ctx);
                }
            }
        }
    }

    /// Exit the casting phase.
    ///
    /// Runs the finish-casting hook; when no channel phase follows,
    /// enters cooldown, notifies primary slots, and clears the owner's
    /// casting flag.
    pub fn finish_casting(&mut self, owner: &mut UnitRef<'_>, ctx: &mut EngineCtx<'_>) {
        self.with_behavior(|ability, b| b.on_finish_casting(owner, ability, ctx));
        if self.template.channel_duration(self.level) <= Fixed::ZERO {
            self.state = AbilityState::Cooldown;
            self.current_cooldown =
                seconds_to_millis(self.cooldown_duration(ctx.config, owner.stats));
            if self.slot < PRIMARY_SLOTS {
                let remaining = self.current_cooldown();
                ctx.gateway
                    .notify_cooldown(owner.id, self.slot, remaining, remaining);
            }
            owner.stats.is_casting = false;
        }
    }

    /// Enter the channeling phase.
    pub fn channel(&mut self) {
        self.state = AbilityState::Channeling;
        self.current_channel_duration =
            seconds_to_millis(self.template.channel_duration(self.level));
    }

    /// Exit the channeling phase into cooldown.
    pub fn finish_channeling(&mut self, owner: &mut UnitRef<'_>, ctx: &mut EngineCtx<'_>) {
        self.state = AbilityState::Cooldown;
        self.current_cooldown =
            seconds_to_millis(self.cooldown_duration(ctx.config, owner.stats));
        if self.slot < PRIMARY_SLOTS {
            let remaining = self.current_cooldown();
            ctx.gateway
                .notify_cooldown(owner.id, self.slot, remaining, remaining);
        }
        owner.stats.is_casting = false;
    }

    /// Raise the ability one level, clamped at [`MAX_ABILITY_LEVEL`].
    ///
    /// Calls past the cap are no-ops. Primary slots refresh the unit's
    /// displayed mana cost; a level-up event is published for external
    /// subscribers.
    pub fn level_up(&mut self, owner: &mut UnitRef<'_>, ctx: &mut EngineCtx<'_>) {
        if self.level >= MAX_ABILITY_LEVEL {
            return;
        }
        self.level += 1;
        if self.slot < PRIMARY_SLOTS {
            owner.stats.displayed_mana_cost[usize::from(self.slot)] =
                self.template.mana_cost(self.level);
        }
        ctx.events.push(EngineEvent::AbilityLeveled {
            unit: owner.id,
            slot: self.slot,
            level: self.level,
        });
    }

    /// Administrative override: force `Ready` with zero cooldown.
    ///
    /// Discards any in-progress cast or channel timer.
    pub fn force_ready(&mut self) {
        self.state = AbilityState::Ready;
        self.current_cooldown = Fixed::ZERO;
    }

    /// Administrative override: force `Cooldown` with the given
    /// remaining time in seconds.
    ///
    /// Discards any in-progress cast or channel timer.
    pub fn force_cooldown(&mut self, remaining: Fixed) {
        self.state = AbilityState::Cooldown;
        self.current_cooldown = seconds_to_millis(remaining);
    }

    /// Apply this ability's effects to a unit hit by one of its
    /// projectiles or area effects.
    ///
    /// Requests the template's hit-effect visual when one is declared,
    /// then defers to the behavior. `projectile` is `None` for
    /// instant-hit applications.
    pub fn apply_effects(
        &mut self,
        owner: &mut UnitRef<'_>,
        target: &mut UnitRef<'_>,
        projectile: Option<&Projectile>,
        ctx: &mut EngineCtx<'_>,
    ) {
        if self.template.has_hit_effect() {
            ctx.vfx
                .add_particle_target(owner.id, &self.template.hit_effect, target.id);
        }
        self.with_behavior(|ability, b| b.apply_effects(owner, target, ability, projectile, ctx));
    }

    /// Broadcast a spell animation on a unit.
    pub fn spell_animation(
        &self,
        animation: &str,
        target: crate::units::UnitId,
        ctx: &mut EngineCtx<'_>,
    ) {
        tracing::trace!(ability = %self.name, animation, "spell animation");
        ctx.gateway.notify_spell_animation(target, animation);
    }

    fn spawn_projectile(
        &self,
        owner: &UnitRef<'_>,
        name: &str,
        origin: Vec2Fixed,
        target: FollowTarget,
        hit_only_target: bool,
        server_only: bool,
        ctx: &mut EngineCtx<'_>,
    ) -> NetId {
        let projectile = Projectile {
            net_id: self.reserved_proj_net_id,
            name: name.to_string(),
            position: origin,
            width: self.template.line_width(self.level),
            owner: owner.id,
            source: AbilitySource {
                unit: owner.id,
                slot: self.slot,
            },
            target,
            speed: self.template.missile_speed(self.level),
            flags: self.template.flags,
            hit_only_target,
        };
        let net_id = projectile.net_id;
        ctx.objects
            .add_object(GameObject::Projectile(projectile.clone()));
        if !server_only {
            ctx.gateway.notify_projectile_spawn(&projectile);
        }
        net_id
    }

    /// Spawn a missile from the caster's position toward a point.
    pub fn add_projectile(
        &self,
        owner: &UnitRef<'_>,
        name: &str,
        to: Vec2Fixed,
        server_only: bool,
        ctx: &mut EngineCtx<'_>,
    ) -> NetId {
        self.spawn_projectile(
            owner,
            name,
            owner.position,
            FollowTarget::Point(to),
            true,
            server_only,
            ctx,
        )
    }

    /// Spawn a missile from an explicit origin toward a point.
    pub fn add_projectile_from(
        &self,
        owner: &UnitRef<'_>,
        name: &str,
        to: Vec2Fixed,
        from: Vec2Fixed,
        server_only: bool,
        ctx: &mut EngineCtx<'_>,
    ) -> NetId {
        self.spawn_projectile(
            owner,
            name,
            from,
            FollowTarget::Point(to),
            true,
            server_only,
            ctx,
        )
    }

    /// Spawn a missile from the caster's position toward a target
    /// descriptor (which may be a moving unit).
    pub fn add_projectile_to_target(
        &self,
        owner: &UnitRef<'_>,
        name: &str,
        target: FollowTarget,
        server_only: bool,
        ctx: &mut EngineCtx<'_>,
    ) -> NetId {
        self.spawn_projectile(owner, name, owner.position, target, true, server_only, ctx)
    }

    /// Spawn a missile from an explicit origin toward a target
    /// descriptor.
    pub fn add_projectile_to_target_from(
        &self,
        owner: &UnitRef<'_>,
        name: &str,
        target: FollowTarget,
        from: Vec2Fixed,
        server_only: bool,
        ctx: &mut EngineCtx<'_>,
    ) -> NetId {
        self.spawn_projectile(owner, name, from, target, true, server_only, ctx)
    }

    /// Spawn a missile from the caster's position that affects every
    /// unit it intersects, not only the designated target.
    pub fn add_projectile_hit_all(
        &self,
        owner: &UnitRef<'_>,
        name: &str,
        target: FollowTarget,
        server_only: bool,
        ctx: &mut EngineCtx<'_>,
    ) -> NetId {
        self.spawn_projectile(owner, name, owner.position, target, false, server_only, ctx)
    }

    /// Spawn a hit-everything missile from an explicit origin.
    pub fn add_projectile_hit_all_from(
        &self,
        owner: &UnitRef<'_>,
        name: &str,
        target: FollowTarget,
        from: Vec2Fixed,
        server_only: bool,
        ctx: &mut EngineCtx<'_>,
    ) -> NetId {
        self.spawn_projectile(owner, name, from, target, false, server_only, ctx)
    }

    /// Spawn a persistent line effect from the caster's position.
    ///
    /// Lasers are server-side entities and are never announced through
    /// the gateway. `affect_after_cast` keeps the effect applying after
    /// the caster's own cast state has ended.
    pub fn add_laser(
        &self,
        owner: &UnitRef<'_>,
        to: Vec2Fixed,
        affect_after_cast: bool,
        ctx: &mut EngineCtx<'_>,
    ) -> NetId {
        let laser = Laser {
            net_id: self.reserved_proj_net_id,
            position: owner.position,
            width: self.template.line_width(self.level),
            owner: owner.id,
            source: AbilitySource {
                unit: owner.id,
                slot: self.slot,
            },
            end: to,
            flags: self.template.flags,
            affect_after_cast,
        };
        let net_id = laser.net_id;
        ctx.objects.add_object(GameObject::Laser(laser));
        net_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::AbilityBehavior;
    use crate::data::TargetingMode;
    use crate::engine::NoopVisualEffects;
    use crate::net::{NetIdAllocator, NullGateway};
    use crate::projectile::ObjectRegistry;

    struct Scripted;
    impl AbilityBehavior for Scripted {}

    fn template(channel: Option<Fixed>) -> Arc<AbilityData> {
        Arc::new(AbilityData {
            id: "test_bolt".to_string(),
            mana_cost: vec![Fixed::from_num(50)],
            cooldown: vec![Fixed::from_num(5)],
            cast_time: vec![Fixed::from_num(0.5)],
            channel_duration: channel.map_or_else(Vec::new, |c| vec![c]),
            cast_range: vec![Fixed::from_num(1000)],
            missile_speed: vec![Fixed::from_num(1200)],
            line_width: vec![Fixed::from_num(60)],
            targeting: TargetingMode::Point,
            hit_effect: String::new(),
            flags: 0,
        })
    }

    struct Harness {
        config: EngineConfig,
        ids: NetIdAllocator,
        gateway: NullGateway,
        objects: ObjectRegistry,
        vfx: NoopVisualEffects,
        events: Vec<EngineEvent>,
        stats: StatBlock,
    }

    impl Harness {
        fn new() -> Self {
            let mut stats = StatBlock::default();
            stats.max_mana = Fixed::from_num(100);
            stats.current_mana = Fixed::from_num(100);
            Self {
                config: EngineConfig::default(),
                ids: NetIdAllocator::new(),
                gateway: NullGateway,
                objects: ObjectRegistry::new(),
                vfx: NoopVisualEffects,
                events: Vec::new(),
                stats,
            }
        }

        fn run<R>(&mut self, f: impl FnOnce(&mut UnitRef<'_>, &mut EngineCtx<'_>) -> R) -> R {
            let mut ctx = EngineCtx {
                config: &self.config,
                ids: &mut self.ids,
                gateway: &mut self.gateway,
                objects: &mut self.objects,
                vfx: &mut self.vfx,
                events: &mut self.events,
            };
            let mut owner = UnitRef {
                id: 1,
                position: Vec2Fixed::ZERO,
                stats: &mut self.stats,
            };
            f(&mut owner, &mut ctx)
        }
    }

    fn scripted_instance(channel: Option<Fixed>) -> AbilityInstance {
        AbilityInstance::new(template(channel), 0, Box::new(Scripted))
    }

    #[test]
    fn test_cast_walks_through_cooldown_to_ready() {
        let mut h = Harness::new();
        let mut ability = scripted_instance(None);

        let accepted = h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx));
        assert!(accepted);
        assert_eq!(h.stats.current_mana, Fixed::from_num(50));
        assert_eq!(ability.state(), AbilityState::Casting);

        // Exactly the cast time exhausts the timer and enters cooldown
        h.run(|owner, ctx| ability.update(500, owner, ctx));
        assert_eq!(ability.state(), AbilityState::Cooldown);
        assert_eq!(ability.current_cooldown(), Fixed::from_num(5));

        // 5000 ms leaves the timer at exactly zero: not yet ready
        h.run(|owner, ctx| ability.update(5000, owner, ctx));
        assert_eq!(ability.state(), AbilityState::Cooldown);

        h.run(|owner, ctx| ability.update(1, owner, ctx));
        assert_eq!(ability.state(), AbilityState::Ready);
    }

    #[test]
    fn test_cast_rejected_on_insufficient_mana() {
        let mut h = Harness::new();
        h.stats.current_mana = Fixed::from_num(10);
        let mut ability = scripted_instance(None);

        let accepted = h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx));
        assert!(!accepted);
        assert_eq!(h.stats.current_mana, Fixed::from_num(10));
        assert_eq!(ability.state(), AbilityState::Ready);
    }

    #[test]
    fn test_cast_fails_on_exact_mana_equality() {
        let mut h = Harness::new();
        h.stats.current_mana = Fixed::from_num(50);
        let mut ability = scripted_instance(None);

        // Effective cost 50 vs mana 50: strict less-than required
        let accepted = h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx));
        assert!(!accepted);
        assert_eq!(h.stats.current_mana, Fixed::from_num(50));
    }

    #[test]
    fn test_cast_rejected_while_not_ready_leaves_no_trace() {
        let mut h = Harness::new();
        let mut ability = scripted_instance(None);

        assert!(h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx)));
        let mana_after_first = h.stats.current_mana;
        let ids_after_first = (ability.cast_net_id(), ability.reserved_proj_net_id());

        // Second cast while Casting: rejected, no mana, no fresh ids
        assert!(!h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx)));
        assert_eq!(h.stats.current_mana, mana_after_first);
        assert_eq!(
            (ability.cast_net_id(), ability.reserved_proj_net_id()),
            ids_after_first
        );
    }

    #[test]
    fn test_unscripted_ability_is_uncastable() {
        let mut h = Harness::new();
        let mut ability = AbilityInstance::new(template(None), 0, Box::new(NoopBehavior));
        assert!(!h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx)));
        assert_eq!(h.stats.current_mana, Fixed::from_num(100));
    }

    #[test]
    fn test_unit_target_out_of_range_rejected_before_mana() {
        let mut h = Harness::new();
        let data = AbilityData {
            targeting: TargetingMode::Unit,
            ..(*template(None)).clone()
        };
        let mut ability = AbilityInstance::new(Arc::new(data), 0, Box::new(Scripted));

        let target = CastTarget {
            unit: Some(2),
            ..CastTarget::default()
        };
        let far = Vec2Fixed::new(Fixed::from_num(2000), Fixed::ZERO);
        let accepted = h.run(|owner, ctx| ability.cast(owner, target, Some(far), ctx));
        assert!(!accepted);
        // No mana deduction on range failure
        assert_eq!(h.stats.current_mana, Fixed::from_num(100));
        assert_eq!(ability.state(), AbilityState::Ready);

        let near = Vec2Fixed::new(Fixed::from_num(900), Fixed::ZERO);
        assert!(h.run(|owner, ctx| ability.cast(owner, target, Some(near), ctx)));
    }

    #[test]
    fn test_instant_flag_skips_casting_phase() {
        let mut h = Harness::new();
        let data = AbilityData {
            flags: crate::data::flags::INSTANT_CAST,
            ..(*template(None)).clone()
        };
        let mut ability = AbilityInstance::new(Arc::new(data), 0, Box::new(Scripted));

        assert!(h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx)));
        assert_eq!(ability.state(), AbilityState::Cooldown);
    }

    #[test]
    fn test_zero_cast_time_skips_casting_phase() {
        let mut h = Harness::new();
        let data = AbilityData {
            cast_time: vec![Fixed::ZERO],
            ..(*template(None)).clone()
        };
        let mut ability = AbilityInstance::new(Arc::new(data), 0, Box::new(Scripted));

        assert!(h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx)));
        assert_eq!(ability.state(), AbilityState::Cooldown);
    }

    #[test]
    fn test_channel_phase_between_cast_and_cooldown() {
        let mut h = Harness::new();
        let mut ability = scripted_instance(Some(Fixed::from_num(3)));

        assert!(h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx)));
        h.run(|owner, ctx| ability.update(500, owner, ctx));
        assert_eq!(ability.state(), AbilityState::Channeling);
        assert_eq!(ability.current_channel_duration(), Fixed::from_num(3));

        h.run(|owner, ctx| ability.update(3000, owner, ctx));
        assert_eq!(ability.state(), AbilityState::Cooldown);
    }

    #[test]
    fn test_split_deltas_exhaust_timers_exactly() {
        let mut h = Harness::new();
        let mut ability = scripted_instance(None);
        assert!(h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx)));

        // 100 + 150 + 250 ms must finish a 500 ms cast with nothing
        // left over, no matter how the total is split across ticks
        h.run(|owner, ctx| ability.update(100, owner, ctx));
        h.run(|owner, ctx| ability.update(150, owner, ctx));
        assert_eq!(ability.state(), AbilityState::Casting);
        h.run(|owner, ctx| ability.update(250, owner, ctx));
        assert_eq!(ability.state(), AbilityState::Cooldown);

        // Grinding the 5 s cooldown one millisecond at a time reaches
        // exactly zero, then the next tick drives it negative
        for _ in 0..5000 {
            h.run(|owner, ctx| ability.update(1, owner, ctx));
        }
        assert_eq!(ability.state(), AbilityState::Cooldown);
        h.run(|owner, ctx| ability.update(1, owner, ctx));
        assert_eq!(ability.state(), AbilityState::Ready);
    }

    #[test]
    fn test_update_zero_delta_is_noop() {
        let mut h = Harness::new();
        let mut ability = scripted_instance(None);

        h.run(|owner, ctx| ability.update(0, owner, ctx));
        assert_eq!(ability.state(), AbilityState::Ready);

        assert!(h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx)));
        let timer = ability.current_cast_time();
        h.run(|owner, ctx| ability.update(0, owner, ctx));
        assert_eq!(ability.state(), AbilityState::Casting);
        assert_eq!(ability.current_cast_time(), timer);
    }

    #[test]
    fn test_level_up_clamps_at_max() {
        let mut h = Harness::new();
        let mut ability = scripted_instance(None);

        for _ in 0..10 {
            h.run(|owner, ctx| ability.level_up(owner, ctx));
        }
        assert_eq!(ability.level(), MAX_ABILITY_LEVEL);
        // One event per effective level, none past the cap
        assert_eq!(h.events.len(), usize::from(MAX_ABILITY_LEVEL));
    }

    #[test]
    fn test_cooldowns_disabled_means_zero_cooldown() {
        let mut h = Harness::new();
        h.config.cooldowns_enabled = false;
        let mut ability = scripted_instance(None);

        assert!(h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx)));
        h.run(|owner, ctx| ability.update(500, owner, ctx));
        assert_eq!(ability.state(), AbilityState::Cooldown);
        assert_eq!(ability.current_cooldown(), Fixed::ZERO);
        // Any positive tick drives the zero timer negative
        h.run(|owner, ctx| ability.update(1, owner, ctx));
        assert_eq!(ability.state(), AbilityState::Ready);
    }

    #[test]
    fn test_mana_costs_disabled_skips_gate_and_deduction() {
        let mut h = Harness::new();
        h.config.mana_costs_enabled = false;
        h.stats.current_mana = Fixed::ZERO;
        let mut ability = scripted_instance(None);

        assert!(h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx)));
        assert_eq!(h.stats.current_mana, Fixed::ZERO);
    }

    #[test]
    fn test_cost_reduction_scales_gate() {
        let mut h = Harness::new();
        h.stats.current_mana = Fixed::from_num(30);
        h.stats.cost_reduction = Fixed::from_num(0.5);
        let mut ability = scripted_instance(None);

        // 50 * (1 - 0.5) = 25 < 30
        assert!(h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx)));
        assert_eq!(h.stats.current_mana, Fixed::from_num(5));
    }

    #[test]
    fn test_sequential_casts_get_fresh_ids() {
        let mut h = Harness::new();
        let mut ability = scripted_instance(None);

        assert!(h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx)));
        let first = (ability.reserved_proj_net_id(), ability.cast_net_id());
        assert_ne!(first.0, first.1);

        ability.force_ready();
        h.stats.current_mana = Fixed::from_num(100);
        assert!(h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx)));
        let second = (ability.reserved_proj_net_id(), ability.cast_net_id());
        assert!(second.0 > first.1);
    }

    #[test]
    fn test_force_overrides_discard_timers() {
        let mut h = Harness::new();
        let mut ability = scripted_instance(None);

        assert!(h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx)));
        assert_eq!(ability.state(), AbilityState::Casting);

        ability.force_cooldown(Fixed::from_num(2));
        assert_eq!(ability.state(), AbilityState::Cooldown);
        assert_eq!(ability.current_cooldown(), Fixed::from_num(2));

        ability.force_ready();
        assert_eq!(ability.state(), AbilityState::Ready);
        assert_eq!(ability.current_cooldown(), Fixed::ZERO);
    }

    #[test]
    fn test_projectile_variants_use_reserved_id() {
        let mut h = Harness::new();
        let mut ability = scripted_instance(None);
        assert!(h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx)));
        let reserved = ability.reserved_proj_net_id();

        let to = Vec2Fixed::new(Fixed::from_num(100), Fixed::ZERO);
        let net_id =
            h.run(|owner, ctx| ability.add_projectile(owner, "bolt_mis", to, false, ctx));
        assert_eq!(net_id, reserved);
        assert_eq!(h.objects.len(), 1);
        let spawned = h.objects.projectile(reserved).unwrap();
        assert!(spawned.hit_only_target);

        let net_id = h.run(|owner, ctx| {
            ability.add_projectile_hit_all(owner, "bolt_mis", FollowTarget::Unit(9), false, ctx)
        });
        assert_eq!(net_id, reserved);
    }

    #[test]
    fn test_laser_registered_without_notification() {
        let mut h = Harness::new();
        let mut ability = scripted_instance(None);
        assert!(h.run(|owner, ctx| ability.cast(owner, CastTarget::default(), None, ctx)));

        let to = Vec2Fixed::new(Fixed::from_num(300), Fixed::ZERO);
        h.run(|owner, ctx| ability.add_laser(owner, to, true, ctx));
        assert_eq!(h.objects.len(), 1);
        let object = h.objects.iter().next().unwrap();
        match object {
            GameObject::Laser(l) => assert!(l.affect_after_cast),
            other => panic!("expected laser, got {other:?}"),
        }
    }

    #[test]
    fn test_slot_keys() {
        let keys: Vec<_> = [0u8, 1, 2, 3, PASSIVE_SLOT, 7]
            .iter()
            .map(|&slot| AbilityInstance::new(template(None), slot, Box::new(Scripted)).slot_key())
            .collect();
        assert_eq!(keys, ["Q", "W", "E", "R", "Passive", "undefined"]);
    }
}
