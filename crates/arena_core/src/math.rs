//! Fixed-point math utilities for deterministic simulation.
//!
//! All ability timers, resource values and ranges use fixed-point
//! arithmetic to ensure deterministic behavior across platforms.
//! Floating-point operations can produce different results on
//! different CPUs.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Milliseconds per second, as a fixed-point conversion factor.
///
/// Client requests and tick deltas arrive in milliseconds. Live timers
/// are held in fixed-point milliseconds so integer tick deltas subtract
/// exactly; 1/1000 of a second has no finite binary representation, so
/// a seconds-denominated timer would under-run when a duration is fed
/// in as several smaller deltas.
pub const MILLIS_PER_SECOND: i64 = 1000;

/// Convert a millisecond delta into fixed-point seconds. Truncates
/// toward zero for deltas that are not exact binary fractions.
#[must_use]
pub fn millis_to_seconds(millis: u32) -> Fixed {
    millis_fixed_to_seconds(Fixed::from_num(millis))
}

/// Convert fixed-point milliseconds into fixed-point seconds.
#[must_use]
pub fn millis_fixed_to_seconds(millis: Fixed) -> Fixed {
    millis / Fixed::from_num(MILLIS_PER_SECOND)
}

/// Convert fixed-point seconds into fixed-point milliseconds.
#[must_use]
pub fn seconds_to_millis(seconds: Fixed) -> Fixed {
    seconds.saturating_mul(Fixed::from_num(MILLIS_PER_SECOND))
}

/// Fixed-point 2D world position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for `Vec<Fixed>` (per-level template arrays).
pub mod fixed_vec_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a vector of fixed-point numbers as raw bits.
    pub fn serialize<S>(values: &[Fixed], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bits: Vec<i64> = values.iter().map(|v| v.to_bits()).collect();
        bits.serialize(serializer)
    }

    /// Deserialize a vector of fixed-point numbers from raw bits.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = Vec::<i64>::deserialize(deserializer)?;
        Ok(bits.into_iter().map(Fixed::from_bits).collect())
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Calculate squared distance (avoids sqrt for range comparisons).
    ///
    /// Saturates at [`Fixed::MAX`]: squaring a separation past ~46k
    /// units exceeds the 32-bit integer part.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Check whether `other` lies within `range` of this point.
    ///
    /// Compares squared distances so the hot path never takes a
    /// square root.
    #[must_use]
    pub fn within_range(self, other: Self, range: Fixed) -> bool {
        self.distance_squared(other) <= range.saturating_mul(range)
    }
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_distance_squared() {
        let a = Vec2Fixed::new(Fixed::from_num(3), Fixed::from_num(0));
        let b = Vec2Fixed::new(Fixed::from_num(0), Fixed::from_num(4));
        let dist_sq = a.distance_squared(b);
        // 3² + 4² = 25
        assert_eq!(dist_sq, Fixed::from_num(25));
    }

    #[test]
    fn test_within_range_boundary() {
        let a = Vec2Fixed::ZERO;
        let b = Vec2Fixed::new(Fixed::from_num(5), Fixed::from_num(0));
        // Exactly on the edge counts as in range
        assert!(a.within_range(b, Fixed::from_num(5)));
        assert!(!a.within_range(b, Fixed::from_num(4)));
    }

    #[test]
    fn test_millis_to_seconds_exact() {
        // 500 ms divides to exactly 0.5 in binary fixed point
        assert_eq!(millis_to_seconds(500), Fixed::from_num(0.5));
        assert_eq!(millis_to_seconds(0), Fixed::ZERO);
        assert_eq!(millis_to_seconds(5000), Fixed::from_num(5));
    }

    #[test]
    fn test_second_millisecond_round_trip() {
        for s in [Fixed::from_num(5), Fixed::from_num(0.5), Fixed::from_num(3.5)] {
            assert_eq!(millis_fixed_to_seconds(seconds_to_millis(s)), s);
        }
    }

    #[test]
    fn test_far_apart_points_saturate_instead_of_wrapping() {
        let a = Vec2Fixed::new(Fixed::from_num(100_000), Fixed::ZERO);
        let b = Vec2Fixed::new(Fixed::from_num(-100_000), Fixed::ZERO);
        assert_eq!(a.distance_squared(b), Fixed::MAX);
        assert!(!a.within_range(b, Fixed::from_num(1000)));
    }

    #[test]
    fn test_fixed_determinism() {
        // Same operations must produce identical results
        let a = Fixed::from_num(1) / Fixed::from_num(3);
        let b = Fixed::from_num(1) / Fixed::from_num(3);
        assert_eq!(a, b);

        let result1 = a * Fixed::from_num(7);
        let result2 = b * Fixed::from_num(7);
        assert_eq!(result1, result2);
    }
}
