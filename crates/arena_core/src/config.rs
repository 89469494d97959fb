//! Process-wide engine configuration.
//!
//! The cooldown/mana toggles are an explicit immutable value passed
//! into [`Engine`](crate::engine::Engine) construction and never
//! changed for the life of a session.

use serde::{Deserialize, Serialize};

/// Immutable simulation flags, read once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// When false, every computed cooldown is zero (practice mode).
    #[serde(default = "enabled")]
    pub cooldowns_enabled: bool,

    /// When false, casts neither check nor deduct mana.
    #[serde(default = "enabled")]
    pub mana_costs_enabled: bool,
}

const fn enabled() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cooldowns_enabled: true,
            mana_costs_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags_enabled() {
        let config = EngineConfig::default();
        assert!(config.cooldowns_enabled);
        assert!(config.mana_costs_enabled);
    }

    #[test]
    fn test_missing_fields_default_to_enabled() {
        let config: EngineConfig = ron::from_str("(cooldowns_enabled: false)").unwrap();
        assert!(!config.cooldowns_enabled);
        assert!(config.mana_costs_enabled);
    }
}
