//! Antonym strategy trait and common types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the antonym cascade.
///
/// A strategy maps a single word to its opposite and returns the word
/// itself when it has nothing to offer. Failures of external collaborators
/// are handled inside the strategy, so resolution never errors.
#[async_trait]
pub trait AntonymStrategy: Send + Sync {
    /// Opposite of the word, or the word unchanged
    async fn antonym(&self, word: &str) -> String;

    /// Get the strategy name
    fn name(&self) -> &str;
}

/// Built-in strategies that can be ordered from configuration.
///
/// The custom override strategy is not listed: it is per-invocation and
/// always runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Most frequent antonym across all senses, with a domain fallback table
    LexiconFrequency,
    /// First antonym of the first sense that has one
    LexiconFirst,
    /// Masked-language-model probe
    MaskedModel,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LexiconFrequency => "lexicon_frequency",
            Self::LexiconFirst => "lexicon_first",
            Self::MaskedModel => "masked_model",
        }
    }

    /// The fixed priority order
    pub fn default_order() -> Vec<Self> {
        vec![Self::LexiconFrequency, Self::LexiconFirst, Self::MaskedModel]
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
