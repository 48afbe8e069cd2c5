//! Qualitative intensity words mapped to a normalized weight
//!
//! The source table lists some words under several categories with
//! different weights. Entries are applied in order and the last definition
//! wins; the overridden keys are kept in [`StrengthMap::redefined`] so the
//! ambiguity stays visible.

use antiprompt_core::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

const BUILTIN_STRENGTH: &str = include_str!("../data/strength.yaml");

#[derive(Debug, Deserialize)]
struct StrengthCategory {
    category: String,
    entries: Vec<(String, f32)>,
}

/// Read-only word -> weight table
#[derive(Debug, Clone, Default)]
pub struct StrengthMap {
    weights: HashMap<String, f32>,
    redefined: Vec<String>,
}

impl StrengthMap {
    /// Build from ordered (word, weight) pairs; weights are clamped to [0, 1]
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, f32)>,
        K: Into<String>,
    {
        let mut map = Self::default();
        for (word, weight) in entries {
            let word = word.into().to_lowercase();
            if let Some(previous) = map.weights.insert(word.clone(), weight.clamp(0.0, 1.0)) {
                debug!("Strength entry '{}' redefined ({} -> {})", word, previous, weight);
                if !map.redefined.contains(&word) {
                    map.redefined.push(word);
                }
            }
        }
        map
    }

    /// Load from a YAML list of categories
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let categories: Vec<StrengthCategory> = serde_yaml::from_str(yaml).map_err(|e| {
            antiprompt_core::Error::lexicon(format!("Failed to parse strength map: {}", e))
        })?;

        Ok(Self::from_entries(categories.into_iter().flat_map(|c| {
            debug!("Strength category '{}': {} entries", c.category, c.entries.len());
            c.entries.into_iter()
        })))
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let map = Self::from_yaml(&content)?;
        info!("Loaded {} strength entries from {}", map.len(), path.display());
        Ok(map)
    }

    /// The strength table shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_STRENGTH)
    }

    /// Weight of an exact word or phrase
    pub fn weight(&self, term: &str) -> Option<f32> {
        self.weights.get(&term.trim().to_lowercase()).copied()
    }

    /// Weight of a tag: the whole tag if listed, otherwise the strongest of
    /// its words and adjacent word pairs
    pub fn intensity(&self, tag: &str) -> Option<f32> {
        if let Some(weight) = self.weight(tag) {
            return Some(weight);
        }

        let words: Vec<&str> = tag.split_whitespace().collect();
        let pairs = words.windows(2).map(|pair| pair.join(" "));

        words
            .iter()
            .map(|w| w.to_string())
            .chain(pairs)
            .filter_map(|term| self.weight(&term))
            .fold(None, |best: Option<f32>, w| Some(best.map_or(w, |b| b.max(w))))
    }

    /// Words whose weight was defined more than once (last definition kept)
    pub fn redefined(&self) -> &[String] {
        &self.redefined
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_definition_wins() {
        let map = StrengthMap::from_entries([("awful", 0.96), ("poor", 0.78), ("awful", 0.80)]);
        assert_eq!(map.weight("awful"), Some(0.80));
        assert_eq!(map.redefined(), &["awful".to_string()]);
    }

    #[test]
    fn test_builtin_duplicates_are_documented() {
        let map = StrengthMap::builtin().unwrap();
        assert_eq!(map.weight("awful"), Some(0.80));
        assert_eq!(map.weight("inferior"), Some(0.7));
        assert_eq!(map.weight("ordinary"), Some(0.5));
        assert_eq!(map.weight("no"), Some(1.0));

        let mut redefined = map.redefined().to_vec();
        redefined.sort();
        assert_eq!(redefined, vec!["awful", "inferior", "ordinary"]);
    }

    #[test]
    fn test_intensity_prefers_whole_tag() {
        let map = StrengthMap::from_entries([("very bad", 0.82), ("bad", 0.64), ("very", 0.7)]);
        assert_eq!(map.intensity("very bad"), Some(0.82));
    }

    #[test]
    fn test_intensity_takes_strongest_component() {
        let map = StrengthMap::from_entries([("very bad", 0.82), ("bad", 0.64), ("dark", 0.7)]);
        assert_eq!(map.intensity("dark and bad lighting"), Some(0.7));
        assert_eq!(map.intensity("very bad hands"), Some(0.82));
        assert_eq!(map.intensity("hands"), None);
    }

    #[test]
    fn test_weights_are_clamped() {
        let map = StrengthMap::from_entries([("overflow", 1.5)]);
        assert_eq!(map.weight("overflow"), Some(1.0));
    }
}
