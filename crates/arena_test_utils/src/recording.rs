//! A broadcast gateway that records every notification in call order.
//!
//! Ordering assertions are the point: the engine promises to notify
//! only after the state mutation a notification describes, and tests
//! check that promise by inspecting the recorded sequence.

use fixed::types::I32F32;

use arena_core::engine::VisualEffects;
use arena_core::net::{BroadcastGateway, CastAnnouncement, NetId};
use arena_core::projectile::Projectile;
use arena_core::units::UnitId;

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// `notify_cast` was called.
    Cast(CastAnnouncement),
    /// `notify_cooldown` was called.
    Cooldown {
        /// Unit whose slot changed.
        unit: UnitId,
        /// Slot the change applies to.
        slot: u8,
        /// Remaining cooldown reported.
        current: I32F32,
        /// Full cooldown reported.
        max: I32F32,
    },
    /// `notify_projectile_spawn` was called.
    ProjectileSpawn {
        /// Network id of the spawned projectile.
        net_id: NetId,
        /// Projectile name.
        name: String,
    },
    /// `notify_spell_animation` was called.
    SpellAnimation {
        /// Unit the animation plays on.
        target: UnitId,
        /// Animation name.
        animation: String,
    },
}

/// Gateway recording calls for later inspection.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    /// Every call received, in order.
    pub notifications: Vec<Notification>,
}

impl RecordingGateway {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded cast announcements, in order.
    #[must_use]
    pub fn casts(&self) -> Vec<&CastAnnouncement> {
        self.notifications
            .iter()
            .filter_map(|n| match n {
                Notification::Cast(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    /// Slots named by recorded cooldown notifications, in order.
    #[must_use]
    pub fn cooldown_slots(&self) -> Vec<(UnitId, u8)> {
        self.notifications
            .iter()
            .filter_map(|n| match n {
                Notification::Cooldown { unit, slot, .. } => Some((*unit, *slot)),
                _ => None,
            })
            .collect()
    }

    /// Net ids of recorded projectile spawns, in order.
    #[must_use]
    pub fn projectile_ids(&self) -> Vec<NetId> {
        self.notifications
            .iter()
            .filter_map(|n| match n {
                Notification::ProjectileSpawn { net_id, .. } => Some(*net_id),
                _ => None,
            })
            .collect()
    }

    /// Drop everything recorded so far.
    pub fn clear(&mut self) {
        self.notifications.clear();
    }
}

impl BroadcastGateway for RecordingGateway {
    fn notify_cast(&mut self, announcement: &CastAnnouncement) {
        self.notifications.push(Notification::Cast(*announcement));
    }

    fn notify_cooldown(&mut self, unit: UnitId, slot: u8, current: I32F32, max: I32F32) {
        self.notifications.push(Notification::Cooldown {
            unit,
            slot,
            current,
            max,
        });
    }

    fn notify_projectile_spawn(&mut self, projectile: &Projectile) {
        self.notifications.push(Notification::ProjectileSpawn {
            net_id: projectile.net_id,
            name: projectile.name.clone(),
        });
    }

    fn notify_spell_animation(&mut self, target: UnitId, animation: &str) {
        self.notifications.push(Notification::SpellAnimation {
            target,
            animation: animation.to_string(),
        });
    }
}

/// Visual-effects collaborator recording every particle request.
#[derive(Debug, Default)]
pub struct RecordingVisualEffects {
    /// `(owner, effect, target)` triples, in call order.
    pub particles: Vec<(UnitId, String, UnitId)>,
}

impl RecordingVisualEffects {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl VisualEffects for RecordingVisualEffects {
    fn add_particle_target(&mut self, owner: UnitId, effect: &str, target: UnitId) {
        self.particles.push((owner, effect.to_string(), target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_call_order() {
        let mut gw = RecordingGateway::new();
        gw.notify_spell_animation(3, "SPELL1");
        gw.notify_cooldown(3, 0, I32F32::from_num(5), I32F32::from_num(5));

        assert_eq!(gw.notifications.len(), 2);
        assert_eq!(gw.cooldown_slots(), vec![(3, 0)]);
        assert!(gw.casts().is_empty());

        gw.clear();
        assert!(gw.notifications.is_empty());
    }
}
