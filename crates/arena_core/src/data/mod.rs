//! Data structures for ability content.
//!
//! Pure data types deserialized from RON documents plus the read-only
//! repository the engine resolves templates from.
//!
//! **Note:** This module contains no IO - file reading is handled by
//! the server harness.

mod ability_data;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use ability_data::{flags, AbilityData, TargetingMode, MAX_ABILITY_LEVEL};

use crate::error::{EngineError, Result};

/// Top-level RON document shape for ability content.
///
/// ```ron
/// AbilityCatalog(
///     abilities: [ AbilityData(...), AbilityData(...) ],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityCatalog {
    /// All ability templates in the document.
    pub abilities: Vec<AbilityData>,
}

/// Read-only ability template repository, keyed by ability name.
///
/// Templates are pre-validated content; the book hands out shared
/// references and is never mutated after startup.
#[derive(Debug, Clone, Default)]
pub struct AbilityBook {
    templates: HashMap<String, Arc<AbilityData>>,
}

impl AbilityBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a RON catalog document.
    ///
    /// `label` identifies the source in error messages (a file path,
    /// usually).
    pub fn from_ron_str(label: &str, source: &str) -> Result<Self> {
        let catalog: AbilityCatalog =
            ron::from_str(source).map_err(|e| EngineError::DataParseError {
                path: label.to_string(),
                message: e.to_string(),
            })?;
        let mut book = Self::new();
        for data in catalog.abilities {
            book.insert(data);
        }
        Ok(book)
    }

    /// Add a template, replacing any previous entry with the same id.
    pub fn insert(&mut self, data: AbilityData) {
        self.templates.insert(data.id.clone(), Arc::new(data));
    }

    /// Resolve a template by ability name.
    pub fn get(&self, name: &str) -> Result<Arc<AbilityData>> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownAbility(name.to_string()))
    }

    /// Number of templates loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the book holds no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;

    fn bolt() -> AbilityData {
        AbilityData {
            id: "bolt".to_string(),
            mana_cost: vec![Fixed::from_num(50)],
            cooldown: vec![Fixed::from_num(5)],
            cast_time: vec![Fixed::from_num(0.5)],
            channel_duration: vec![],
            cast_range: vec![Fixed::from_num(1000)],
            missile_speed: vec![Fixed::from_num(1200)],
            line_width: vec![Fixed::from_num(60)],
            targeting: TargetingMode::Point,
            hit_effect: String::new(),
            flags: 0,
        }
    }

    #[test]
    fn test_get_known_and_unknown() {
        let mut book = AbilityBook::new();
        book.insert(bolt());
        assert!(book.get("bolt").is_ok());
        assert!(matches!(
            book.get("missing"),
            Err(EngineError::UnknownAbility(_))
        ));
    }

    #[test]
    fn test_catalog_round_trip() {
        let catalog = AbilityCatalog {
            abilities: vec![bolt()],
        };
        let text = ron::to_string(&catalog).unwrap();
        let book = AbilityBook::from_ron_str("inline", &text).unwrap();
        assert_eq!(book.len(), 1);
        let data = book.get("bolt").unwrap();
        assert_eq!(data.cast_time(0), Fixed::from_num(0.5));
    }

    #[test]
    fn test_parse_error_carries_label() {
        let err = AbilityBook::from_ron_str("abilities.ron", "not ron").unwrap_err();
        match err {
            EngineError::DataParseError { path, .. } => assert_eq!(path, "abilities.ron"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
