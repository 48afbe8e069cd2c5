//! Known negative idioms and the greedy phrase rewriter
//!
//! The rewriter scans token n-grams from the longest window down to single
//! words and substitutes every known idiom into the running text as soon as
//! it is applied. A shorter idiom whose text was already consumed by an
//! earlier (longer) substitution no longer appears in the text and is
//! skipped, so the first applied match wins on overlaps.

use crate::tokenize::WordTokenizer;
use antiprompt_core::Result;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const BUILTIN_PHRASES: &str = include_str!("../data/phrases.yaml");

/// Default longest idiom length, in words
pub const DEFAULT_MAX_PHRASE_WORDS: usize = 4;

#[derive(Debug, Deserialize)]
struct PhraseCategory {
    category: String,
    phrases: BTreeMap<String, String>,
}

/// Read-only mapping from negative idioms to positive idioms
#[derive(Debug, Clone, Default)]
pub struct PhraseMap {
    entries: HashMap<String, String>,
}

impl PhraseMap {
    /// Build from (idiom, opposite) pairs; later pairs replace earlier ones
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load from a YAML list of categories
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let categories: Vec<PhraseCategory> = serde_yaml::from_str(yaml).map_err(|e| {
            antiprompt_core::Error::lexicon(format!("Failed to parse phrase map: {}", e))
        })?;

        Ok(Self::from_pairs(categories.into_iter().flat_map(|c| {
            debug!("Phrase category '{}': {} entries", c.category, c.phrases.len());
            c.phrases.into_iter()
        })))
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let map = Self::from_yaml(&content)?;
        info!("Loaded {} phrases from {}", map.len(), path.display());
        Ok(map)
    }

    /// The idiom table shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_PHRASES)
    }

    /// Opposite of an idiom, by exact match
    pub fn get(&self, phrase: &str) -> Option<&str> {
        self.entries.get(phrase).map(String::as_str)
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.entries.contains_key(phrase)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of a rewrite pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhraseRewrite {
    /// Text with every applied idiom substituted
    pub text: String,

    /// Idioms that were applied
    pub handled: BTreeSet<String>,

    /// Applied idiom -> substituted opposite
    pub replacements: BTreeMap<String, String>,
}

/// Greedy longest-n-gram-first idiom substitution
#[derive(Debug, Clone)]
pub struct PhraseRewriter {
    map: Arc<PhraseMap>,
    tokenizer: WordTokenizer,
    max_words: usize,
}

impl PhraseRewriter {
    pub fn new(map: Arc<PhraseMap>, tokenizer: WordTokenizer) -> Self {
        Self {
            map,
            tokenizer,
            max_words: DEFAULT_MAX_PHRASE_WORDS,
        }
    }

    /// Set the longest n-gram considered
    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words.max(1);
        self
    }

    pub fn phrase_map(&self) -> &PhraseMap {
        &self.map
    }

    /// Known idioms in the text, longest windows first, in text order per window size
    pub fn find_phrases(&self, text: &str) -> Vec<String> {
        let tokens = self.tokenizer.tokenize(text);
        let mut found = Vec::new();

        for n in (1..=self.max_words).rev() {
            for window in tokens.windows(n) {
                let phrase = window.join(" ");
                if self.map.contains(&phrase) {
                    found.push(phrase);
                }
            }
        }

        debug!("Found phrases: {:?}", found);
        found
    }

    /// Substitute every known idiom still present in the text
    pub fn replace_phrases(&self, text: &str) -> PhraseRewrite {
        let mut rewrite = PhraseRewrite {
            text: text.to_string(),
            ..Default::default()
        };

        for phrase in self.find_phrases(text) {
            if !rewrite.text.contains(&phrase) {
                continue;
            }
            let Some(replacement) = self.map.get(&phrase) else {
                continue;
            };

            rewrite.text = rewrite.text.replace(&phrase, replacement);
            rewrite.handled.insert(phrase.clone());
            rewrite.replacements.insert(phrase, replacement.to_string());
        }

        debug!("Text after phrase replacement: {}", rewrite.text);
        rewrite
    }
}
