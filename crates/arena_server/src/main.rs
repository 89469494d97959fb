//! Arena Dedicated Server binary.
//!
//! Headless demo run: loads ability content, casts once and drives the
//! tick loop until the slot recovers. Passing a path argument loads
//! that RON content file instead of the built-in catalog.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arena_core::ability::{AbilityInstance, CastTarget};
use arena_core::behavior::{AbilityBehavior, BehaviorRegistry};
use arena_core::data::AbilityBook;
use arena_core::engine::{Engine, EngineCtx, NoopVisualEffects};
use arena_core::math::{Fixed, Vec2Fixed};
use arena_core::units::UnitRef;
use arena_server::{load_ability_book, ServerConfig, ServerError, TracingGateway};

/// Built-in demo catalog. Per-level numbers are raw I32F32 bits.
const DEMO_CONTENT: &str = r#"AbilityCatalog(
    abilities: [
        (
            id: "ember_bolt",
            mana_cost: [214748364800],
            cooldown: [21474836480],
            cast_time: [2147483648],
            cast_range: [4724464025600],
            missile_speed: [5153960755200],
            line_width: [257698037760],
        ),
    ],
)"#;

/// Fires a missile at the cast point when the cast finishes.
struct EmberBolt;

impl AbilityBehavior for EmberBolt {
    fn on_finish_casting(
        &mut self,
        owner: &mut UnitRef<'_>,
        ability: &mut AbilityInstance,
        ctx: &mut EngineCtx<'_>,
    ) {
        let to = ability.target().point;
        ability.add_projectile(owner, "ember_bolt_mis", to, false, ctx);
    }
}

fn run() -> Result<(), ServerError> {
    let config = ServerConfig::default();
    tracing::info!(tick_ms = config.tick_ms, "server configuration loaded");

    let book = match std::env::args().nth(1) {
        Some(path) => load_ability_book(std::path::Path::new(&path))?,
        None => AbilityBook::from_ron_str("builtin", DEMO_CONTENT)?,
    };

    let mut behaviors = BehaviorRegistry::new();
    behaviors.register("ember_bolt", || EmberBolt);

    let mut engine = Engine::new(config.engine_config());
    let caster = engine.spawn_unit(Vec2Fixed::ZERO);
    engine.bind_ability(caster, 0, "ember_bolt", &book, &behaviors)?;
    {
        let unit = engine
            .units_mut()
            .get_mut(caster)
            .ok_or(arena_core::error::EngineError::UnknownUnit(caster))?;
        unit.stats.max_mana = Fixed::from_num(100);
        unit.stats.current_mana = Fixed::from_num(100);
    }

    let mut gateway = TracingGateway;
    let mut vfx = NoopVisualEffects;

    let target = CastTarget {
        point: Vec2Fixed::new(Fixed::from_num(500), Fixed::ZERO),
        ..CastTarget::default()
    };
    let accepted = engine.cast_request(caster, 0, target, &mut gateway, &mut vfx);
    tracing::info!(accepted, "demo cast issued");

    // Run until the slot has cycled back to ready (cast + cooldown)
    for _ in 0..200 {
        engine.tick(config.tick_ms, &mut gateway, &mut vfx);
    }

    if let Some(unit) = engine.units().get(caster) {
        if let Some(ability) = unit.ability(0) {
            tracing::info!(
                state = ?ability.state(),
                mana = %unit.stats.current_mana,
                projectiles = engine.objects().len(),
                "demo run complete"
            );
        }
    }
    Ok(())
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Arena Dedicated Server");

    if let Err(e) = run() {
        tracing::error!(error = %e, "server startup failed");
        std::process::exit(1);
    }
}
