//! Per-ability behavior extension points.
//!
//! Each ability name binds to one behavior implementation through a
//! pluggable registry; the engine invokes the hooks at fixed points of
//! the cast state machine. A name with no registered behavior binds to
//! [`NoopBehavior`], which renders the ability uncastable.
//!
//! Hooks receive a [`UnitRef`] view of the owner (id, position, stat
//! block) rather than the whole unit, so the ability instance and its
//! owner can be borrowed disjointly.

use std::collections::HashMap;

use crate::ability::AbilityInstance;
use crate::engine::EngineCtx;
use crate::math::Fixed;
use crate::projectile::Projectile;
use crate::units::UnitRef;

/// Extension points invoked by the ability state machine.
///
/// Every hook has an empty default body; implementations override only
/// what they need. `apply_effects` receives the projectile when one
/// registered the hit, or `None` for instant-hit abilities.
#[allow(unused_variables)]
pub trait AbilityBehavior {
    /// The ability was bound to a unit slot.
    fn on_activate(&mut self, owner: &mut UnitRef<'_>) {}

    /// The ability is being removed from its slot.
    fn on_deactivate(&mut self, owner: &mut UnitRef<'_>) {}

    /// A cast was validated and committed; the casting phase begins.
    fn on_start_casting(
        &mut self,
        owner: &mut UnitRef<'_>,
        ability: &mut AbilityInstance,
        ctx: &mut EngineCtx<'_>,
    ) {
    }

    /// The casting phase completed; projectiles are usually spawned here.
    fn on_finish_casting(
        &mut self,
        owner: &mut UnitRef<'_>,
        ability: &mut AbilityInstance,
        ctx: &mut EngineCtx<'_>,
    ) {
    }

    /// Called every simulation tick regardless of state.
    fn on_update(&mut self, delta_seconds: Fixed) {}

    /// A projectile or area effect registered a hit on `target`.
    fn apply_effects(
        &mut self,
        owner: &mut UnitRef<'_>,
        target: &mut UnitRef<'_>,
        ability: &mut AbilityInstance,
        projectile: Option<&Projectile>,
        ctx: &mut EngineCtx<'_>,
    ) {
    }

    /// Whether this is a real script. The placeholder binding reports
    /// false, which makes `cast` reject immediately.
    fn is_scripted(&self) -> bool {
        true
    }
}

/// Placeholder behavior bound when no script exists for an ability name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBehavior;

impl AbilityBehavior for NoopBehavior {
    fn is_scripted(&self) -> bool {
        false
    }
}

/// Factory producing a fresh behavior for one ability instance.
pub type BehaviorFactory = Box<dyn Fn() -> Box<dyn AbilityBehavior>>;

/// Name-keyed behavior lookup.
///
/// Each ability instance gets its own behavior object, so scripts may
/// carry per-instance state across hook invocations.
#[derive(Default)]
pub struct BehaviorRegistry {
    factories: HashMap<String, BehaviorFactory>,
}

impl BehaviorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a behavior factory for an ability name.
    pub fn register<F, B>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> B + 'static,
        B: AbilityBehavior + 'static,
    {
        self.factories
            .insert(name.to_string(), Box::new(move || Box::new(factory())));
    }

    /// Bind a behavior for the given ability name.
    ///
    /// Missing entries yield [`NoopBehavior`] rather than failing.
    #[must_use]
    pub fn bind(&self, name: &str) -> Box<dyn AbilityBehavior> {
        match self.factories.get(name) {
            Some(factory) => factory(),
            None => Box::new(NoopBehavior),
        }
    }
}

impl std::fmt::Debug for BehaviorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorRegistry")
            .field("registered", &self.factories.len())
            .finish()
    }
}
