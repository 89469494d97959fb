//! Ability engine benchmarks for arena_core.
//!
//! Run with: `cargo bench -p arena_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use arena_core::ability::CastTarget;
use arena_core::behavior::{AbilityBehavior, BehaviorRegistry};
use arena_core::config::EngineConfig;
use arena_core::data::AbilityBook;
use arena_core::engine::{Engine, NoopVisualEffects};
use arena_core::math::Vec2Fixed;
use arena_core::net::NullGateway;
use arena_test_utils::fixtures;

struct Scripted;
impl AbilityBehavior for Scripted {}

fn setup_engine(num_casters: i32) -> Engine {
    let mut book = AbilityBook::new();
    book.insert((*fixtures::bolt("bolt")).clone());
    let mut behaviors = BehaviorRegistry::new();
    behaviors.register("bolt", || Scripted);

    let mut engine = Engine::new(EngineConfig::default());
    for i in 0..num_casters {
        let id = engine.spawn_unit(Vec2Fixed::new(fixtures::fixed(i), fixtures::fixed(0)));
        for slot in 0..4u8 {
            engine.bind_ability(id, slot, "bolt", &book, &behaviors).unwrap();
        }
        let unit = engine.units_mut().get_mut(id).unwrap();
        unit.stats.max_mana = fixtures::fixed(10_000);
        unit.stats.current_mana = fixtures::fixed(10_000);
    }
    engine
}

/// One full cast-and-recover cycle for a single slot.
pub fn cast_cycle_benchmark(c: &mut Criterion) {
    c.bench_function("cast_cycle", |b| {
        let mut engine = setup_engine(1);
        let mut gateway = NullGateway;
        let mut vfx = NoopVisualEffects;
        b.iter(|| {
            engine.cast_request(1, 0, CastTarget::default(), &mut gateway, &mut vfx);
            // 500ms cast, then past the 5s cooldown
            engine.tick(500, &mut gateway, &mut vfx);
            engine.tick(5001, &mut gateway, &mut vfx);
            black_box(engine.units().len())
        });
    });
}

/// One idle tick over a hundred casters with four slots each.
pub fn idle_tick_benchmark(c: &mut Criterion) {
    c.bench_function("idle_tick_100_casters", |b| {
        let mut engine = setup_engine(100);
        let mut gateway = NullGateway;
        let mut vfx = NoopVisualEffects;
        b.iter(|| {
            engine.tick(16, &mut gateway, &mut vfx);
            black_box(engine.units().len())
        });
    });
}

criterion_group!(benches, cast_cycle_benchmark, idle_tick_benchmark);
criterion_main!(benches);
