//! Spawned projectile and line-effect entities.
//!
//! The ability instance that spawns these records does not own them;
//! lifetime belongs to the [`ObjectRegistry`]. The back-reference to
//! the source ability is a lookup key only.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::units::UnitId;

/// Back-reference from a spawned entity to the ability that created it.
///
/// Weak relation: resolving it may fail if the owning unit has since
/// despawned, and that is fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbilitySource {
    /// Unit that owns the spawning ability instance.
    pub unit: UnitId,
    /// Slot of the spawning ability instance on that unit.
    pub slot: u8,
}

/// What a projectile is flying toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FollowTarget {
    /// A fixed point on the map.
    Point(Vec2Fixed),
    /// A unit; the missile tracks it as it moves.
    Unit(UnitId),
}

/// A moving missile entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projectile {
    /// Network id, reserved at cast time by the spawning ability.
    pub net_id: u32,
    /// Missile asset name.
    pub name: String,
    /// Spawn position.
    pub position: Vec2Fixed,
    /// Collision width.
    #[serde(with = "fixed_serde")]
    pub width: Fixed,
    /// Unit that fired the missile.
    pub owner: UnitId,
    /// Source ability (lookup only, not ownership).
    pub source: AbilitySource,
    /// Travel target.
    pub target: FollowTarget,
    /// Travel speed.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Template flag bits, passed through for the client.
    pub flags: u32,
    /// When true the missile damages only its designated target;
    /// otherwise it affects every unit it intersects.
    pub hit_only_target: bool,
}

/// A persistent line effect ("laser").
///
/// Unlike missiles, lasers do not travel; they stay applied along a
/// line until removed by the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Laser {
    /// Network id, reserved at cast time by the spawning ability.
    pub net_id: u32,
    /// Origin position.
    pub position: Vec2Fixed,
    /// Collision width.
    #[serde(with = "fixed_serde")]
    pub width: Fixed,
    /// Unit that created the effect.
    pub owner: UnitId,
    /// Source ability (lookup only, not ownership).
    pub source: AbilitySource,
    /// End point of the line.
    pub end: Vec2Fixed,
    /// Template flag bits, passed through for the client.
    pub flags: u32,
    /// Keep applying effects after the caster's own cast state ended.
    pub affect_after_cast: bool,
}

/// A spawned world entity created by the ability engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameObject {
    /// Moving missile.
    Projectile(Projectile),
    /// Persistent line effect.
    Laser(Laser),
}

impl GameObject {
    /// Network id of the entity.
    #[must_use]
    pub fn net_id(&self) -> u32 {
        match self {
            GameObject::Projectile(p) => p.net_id,
            GameObject::Laser(l) => l.net_id,
        }
    }
}

/// World-side store of spawned entities.
///
/// The registry owns projectile/laser lifetime independently of the
/// ability instances that created them. Movement and collision belong
/// to the world simulation, not to this crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectRegistry {
    objects: Vec<GameObject>,
}

impl ObjectRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spawned entity.
    pub fn add_object(&mut self, object: GameObject) {
        self.objects.push(object);
    }

    /// Look up a projectile by network id.
    #[must_use]
    pub fn projectile(&self, net_id: u32) -> Option<&Projectile> {
        self.objects.iter().find_map(|o| match o {
            GameObject::Projectile(p) if p.net_id == net_id => Some(p),
            _ => None,
        })
    }

    /// Remove an entity by network id, returning it.
    pub fn remove(&mut self, net_id: u32) -> Option<GameObject> {
        let idx = self.objects.iter().position(|o| o.net_id() == net_id)?;
        Some(self.objects.remove(idx))
    }

    /// Iterate all registered entities.
    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.iter()
    }

    /// Number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projectile(net_id: u32) -> Projectile {
        Projectile {
            net_id,
            name: "bolt_mis".to_string(),
            position: Vec2Fixed::ZERO,
            width: Fixed::from_num(60),
            owner: 1,
            source: AbilitySource { unit: 1, slot: 0 },
            target: FollowTarget::Point(Vec2Fixed::ZERO),
            speed: Fixed::from_num(1200),
            flags: 0,
            hit_only_target: true,
        }
    }

    #[test]
    fn test_registry_lookup_by_net_id() {
        let mut registry = ObjectRegistry::new();
        registry.add_object(GameObject::Projectile(projectile(7)));
        registry.add_object(GameObject::Projectile(projectile(9)));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.projectile(9).unwrap().net_id, 9);
        assert!(registry.projectile(8).is_none());
    }

    #[test]
    fn test_registry_remove() {
        let mut registry = ObjectRegistry::new();
        registry.add_object(GameObject::Projectile(projectile(7)));
        let removed = registry.remove(7).unwrap();
        assert_eq!(removed.net_id(), 7);
        assert!(registry.is_empty());
    }
}
