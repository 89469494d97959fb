//! Test fixtures and helpers.
//!
//! Pre-built ability templates and caster configurations
//! for consistent testing.

use std::sync::Arc;

use fixed::types::I32F32;

use arena_core::data::{flags, AbilityData, TargetingMode};
use arena_core::math::Vec2Fixed;
use arena_core::units::{Unit, UnitId};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// A point-targeted bolt: 50 mana, 5s cooldown, 0.5s cast time.
///
/// The numbers are chosen so a 500ms tick lands exactly on the cast
/// boundary and a 100-mana caster affords exactly one cast with no
/// remainder ambiguity.
#[must_use]
pub fn bolt(id: &str) -> Arc<AbilityData> {
    Arc::new(AbilityData {
        id: id.to_string(),
        mana_cost: vec![fixed(50), fixed(60), fixed(70), fixed(80), fixed(90), fixed(100)],
        cooldown: vec![fixed(5)],
        cast_time: vec![fixed_f(0.5)],
        channel_duration: vec![],
        cast_range: vec![fixed(1100)],
        missile_speed: vec![fixed(1200)],
        line_width: vec![fixed(60)],
        targeting: TargetingMode::Point,
        hit_effect: String::new(),
        flags: 0,
    })
}

/// Like [`bolt`] but unit-targeted, so casts validate range.
#[must_use]
pub fn targeted_bolt(id: &str) -> Arc<AbilityData> {
    let mut data = (*bolt(id)).clone();
    data.targeting = TargetingMode::Unit;
    Arc::new(data)
}

/// Like [`bolt`] but with the instant-cast flag set.
#[must_use]
pub fn instant_bolt(id: &str) -> Arc<AbilityData> {
    let mut data = (*bolt(id)).clone();
    data.flags |= flags::INSTANT_CAST;
    Arc::new(data)
}

/// Like [`bolt`] but followed by a 2s channel.
#[must_use]
pub fn channeled_bolt(id: &str) -> Arc<AbilityData> {
    let mut data = (*bolt(id)).clone();
    data.channel_duration = vec![fixed(2)];
    Arc::new(data)
}

/// A caster at the origin with 100/100 mana and no cooldown or cost
/// reduction.
#[must_use]
pub fn caster(id: UnitId) -> Unit {
    caster_at(id, Vec2Fixed::ZERO)
}

/// A caster at an arbitrary position with 100/100 mana.
#[must_use]
pub fn caster_at(id: UnitId, position: Vec2Fixed) -> Unit {
    let mut unit = Unit::new(id, position);
    unit.stats.max_mana = fixed(100);
    unit.stats.current_mana = fixed(100);
    unit
}

/// Proptest strategies for engine inputs.
pub mod strategies {
    use proptest::prelude::*;

    use arena_core::math::{Fixed, Vec2Fixed};

    /// Generate a fixed-point number in a reasonable range for positions.
    ///
    /// Range: -10000 to 10000 (typical map size)
    pub fn arb_fixed_position() -> impl Strategy<Value = Fixed> {
        (-10000i32..10000i32).prop_map(Fixed::from_num)
    }

    /// Generate a fixed-point 2D vector for positions.
    pub fn arb_vec2_position() -> impl Strategy<Value = Vec2Fixed> {
        (arb_fixed_position(), arb_fixed_position()).prop_map(|(x, y)| Vec2Fixed::new(x, y))
    }

    /// Generate a mana cost (1-200).
    pub fn arb_mana_cost() -> impl Strategy<Value = Fixed> {
        (1i32..200i32).prop_map(Fixed::from_num)
    }

    /// Generate a cooldown duration in seconds (1-60).
    pub fn arb_cooldown() -> impl Strategy<Value = Fixed> {
        (1i32..60i32).prop_map(Fixed::from_num)
    }

    /// Generate a tick delta in milliseconds (1-1000).
    pub fn arb_tick_millis() -> impl Strategy<Value = u32> {
        1u32..1000u32
    }

    /// Generate a primary ability slot (0-3).
    pub fn arb_primary_slot() -> impl Strategy<Value = u8> {
        0u8..4u8
    }
}
