//! Ability template definitions for data-driven ability content.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_vec_serde, Fixed};

/// Highest ability level. Levels run 0..=5.
pub const MAX_ABILITY_LEVEL: u8 = 5;

/// Behavior flag bits carried by an ability template.
///
/// The field is passed through to spawned projectiles unchanged; only
/// the bits below are interpreted by the engine itself, the rest belong
/// to the client contract.
pub mod flags {
    /// The ability skips the casting phase entirely.
    pub const INSTANT_CAST: u32 = 1 << 0;

    /// Client-contract bit: the missile visual affects every unit it
    /// crosses. Server-side hit filtering is chosen per spawn call.
    pub const AFFECT_ALL_TARGETS: u32 = 1 << 1;
}

/// How an ability selects its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TargetingMode {
    /// Targets a point on the ground.
    #[default]
    Point,
    /// Targets a specific unit; subject to cast-range validation.
    Unit,
    /// Area effect around the cast point.
    Area,
}

impl TargetingMode {
    /// Whether a cast with this mode must name a unit within cast range.
    #[must_use]
    pub const fn requires_unit_target(self) -> bool {
        matches!(self, TargetingMode::Unit)
    }
}

/// Data-driven ability template.
///
/// Immutable per-level numbers for one ability, loaded from content
/// files at startup and shared read-only by every instance of the
/// ability. The engine never mutates a template.
///
/// # Example RON
///
/// ```ron
/// AbilityData(
///     id: "ember_bolt",
///     mana_cost: [214748364800, 236223201280],  // raw I32F32 bits
///     cooldown: [21474836480],
///     cast_time: [2147483648],
///     channel_duration: [0],
///     cast_range: [4724464025600],
///     missile_speed: [5153960755200],
///     line_width: [214748364800],
///     targeting: Unit,
///     hit_effect: "ember_bolt_tar.troy",
///     flags: 0,
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityData {
    /// Unique string identifier; the key clients hash for lookup tables.
    pub id: String,

    /// Mana cost per level.
    #[serde(with = "fixed_vec_serde")]
    pub mana_cost: Vec<Fixed>,

    /// Base cooldown in seconds per level.
    #[serde(with = "fixed_vec_serde")]
    pub cooldown: Vec<Fixed>,

    /// Cast time in seconds per level.
    #[serde(with = "fixed_vec_serde")]
    pub cast_time: Vec<Fixed>,

    /// Channel duration in seconds per level. Zero or empty = no channel.
    #[serde(default, with = "fixed_vec_serde")]
    pub channel_duration: Vec<Fixed>,

    /// Maximum cast range per level (unit-targeted abilities only).
    #[serde(with = "fixed_vec_serde")]
    pub cast_range: Vec<Fixed>,

    /// Missile travel speed per level.
    #[serde(default, with = "fixed_vec_serde")]
    pub missile_speed: Vec<Fixed>,

    /// Collision width for missiles and lasers, per level.
    #[serde(default, with = "fixed_vec_serde")]
    pub line_width: Vec<Fixed>,

    /// Targeting mode.
    #[serde(default)]
    pub targeting: TargetingMode,

    /// Visual effect requested when the ability lands. Empty = none.
    #[serde(default)]
    pub hit_effect: String,

    /// Behavior flag bits, see [`flags`].
    #[serde(default)]
    pub flags: u32,
}

/// Look up a per-level value, clamping to the last populated entry.
///
/// Content rows are allowed to be shorter than six entries; a single
/// entry means "same at every level". Empty rows read as zero.
fn level_value(values: &[Fixed], level: u8) -> Fixed {
    match values {
        [] => Fixed::ZERO,
        _ => {
            let idx = usize::from(level).min(values.len() - 1);
            values[idx]
        }
    }
}

impl AbilityData {
    /// Mana cost at the given level.
    #[must_use]
    pub fn mana_cost(&self, level: u8) -> Fixed {
        level_value(&self.mana_cost, level)
    }

    /// Base cooldown at the given level.
    #[must_use]
    pub fn cooldown(&self, level: u8) -> Fixed {
        level_value(&self.cooldown, level)
    }

    /// Cast time at the given level.
    #[must_use]
    pub fn cast_time(&self, level: u8) -> Fixed {
        level_value(&self.cast_time, level)
    }

    /// Channel duration at the given level.
    #[must_use]
    pub fn channel_duration(&self, level: u8) -> Fixed {
        level_value(&self.channel_duration, level)
    }

    /// Cast range at the given level.
    #[must_use]
    pub fn cast_range(&self, level: u8) -> Fixed {
        level_value(&self.cast_range, level)
    }

    /// Missile speed at the given level.
    #[must_use]
    pub fn missile_speed(&self, level: u8) -> Fixed {
        level_value(&self.missile_speed, level)
    }

    /// Missile/laser collision width at the given level.
    #[must_use]
    pub fn line_width(&self, level: u8) -> Fixed {
        level_value(&self.line_width, level)
    }

    /// Whether the template declares a hit-effect visual.
    #[must_use]
    pub fn has_hit_effect(&self) -> bool {
        !self.hit_effect.is_empty()
    }

    /// Whether the ability bypasses the casting phase.
    #[must_use]
    pub const fn is_instant(&self) -> bool {
        self.flags & flags::INSTANT_CAST != 0
    }
}
