//! Configuration for lexical data, the cascade and external lookups

use crate::database::LexiconStore;
use crate::mask::{DEFAULT_MASK_TOKEN, DEFAULT_TOP_K};
use crate::phrase::{PhraseMap, DEFAULT_MAX_PHRASE_WORDS};
use crate::strategy::StrategyKind;
use crate::strength::StrengthMap;
use antiprompt_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lexical data sources and cascade settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconConfig {
    /// Lexical database file replacing the built-in seed lexicon
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,

    /// Idiom table replacing the built-in phrase map
    #[serde(default)]
    pub phrases_path: Option<PathBuf>,

    /// Strength table replacing the built-in one
    #[serde(default)]
    pub strength_path: Option<PathBuf>,

    /// Built-in strategies in priority order, after the custom overrides
    #[serde(default = "StrategyKind::default_order")]
    pub cascade: Vec<StrategyKind>,

    #[serde(default)]
    pub mask: MaskConfig,

    #[serde(default)]
    pub conceptnet: ConceptNetConfig,

    /// Longest idiom considered by the phrase rewriter, in words
    #[serde(default = "default_max_phrase_words")]
    pub max_phrase_words: usize,
}

/// Masked-model query settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskConfig {
    /// Candidates considered when probing for an antonym
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Alternatives per antonym in the advanced and expert tiers
    #[serde(default = "default_expand_top_n")]
    pub expand_top_n: usize,

    #[serde(default = "default_mask_token")]
    pub mask_token: String,
}

/// ConceptNet lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptNetConfig {
    #[serde(default = "default_conceptnet_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Related terms kept per word
    #[serde(default = "default_max_related")]
    pub max_related: usize,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            lexicon_path: None,
            phrases_path: None,
            strength_path: None,
            cascade: StrategyKind::default_order(),
            mask: MaskConfig::default(),
            conceptnet: ConceptNetConfig::default(),
            max_phrase_words: default_max_phrase_words(),
        }
    }
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            expand_top_n: default_expand_top_n(),
            mask_token: default_mask_token(),
        }
    }
}

impl Default for ConceptNetConfig {
    fn default() -> Self {
        Self {
            base_url: default_conceptnet_url(),
            timeout_ms: default_timeout_ms(),
            max_related: default_max_related(),
        }
    }
}

impl LexiconConfig {
    /// Reject settings the cascade cannot run with
    pub fn validate(&self) -> Result<()> {
        for (idx, kind) in self.cascade.iter().enumerate() {
            if self.cascade[..idx].contains(kind) {
                return Err(Error::config(format!(
                    "Strategy '{}' listed more than once in cascade",
                    kind
                )));
            }
        }

        if self.mask.top_k == 0 {
            return Err(Error::config("mask.top_k must be at least 1"));
        }

        if self.max_phrase_words == 0 {
            return Err(Error::config("max_phrase_words must be at least 1"));
        }

        if self.mask.mask_token.trim().is_empty() {
            return Err(Error::config("mask.mask_token must not be empty"));
        }

        Ok(())
    }

    /// The configured lexical database, or the built-in one
    pub fn load_lexicon(&self) -> Result<LexiconStore> {
        match &self.lexicon_path {
            Some(path) => LexiconStore::from_file(path),
            None => LexiconStore::builtin(),
        }
    }

    /// The configured idiom table, or the built-in one
    pub fn load_phrases(&self) -> Result<PhraseMap> {
        match &self.phrases_path {
            Some(path) => PhraseMap::from_file(path),
            None => PhraseMap::builtin(),
        }
    }

    /// The configured strength table, or the built-in one
    pub fn load_strength(&self) -> Result<StrengthMap> {
        match &self.strength_path {
            Some(path) => StrengthMap::from_file(path),
            None => StrengthMap::builtin(),
        }
    }
}

fn default_max_phrase_words() -> usize {
    DEFAULT_MAX_PHRASE_WORDS
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_expand_top_n() -> usize {
    2
}

fn default_mask_token() -> String {
    DEFAULT_MASK_TOKEN.to_string()
}

fn default_conceptnet_url() -> String {
    "http://api.conceptnet.io".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_max_related() -> usize {
    3
}
