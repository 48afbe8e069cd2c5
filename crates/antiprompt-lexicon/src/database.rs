//! Lexical database with antonym relations
//!
//! The shape follows WordNet: a word belongs to one or more synsets (senses),
//! each synset has a part of speech and a list of lemmas, and a lemma may
//! carry direct antonyms. [`LexiconStore`] is an in-memory implementation
//! loaded from YAML; the seed data ships with the crate.

use antiprompt_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

const BUILTIN_LEXICON: &str = include_str!("../data/lexicon.yaml");

/// Coarse part-of-speech categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Other,
}

impl PartOfSpeech {
    /// Gradable modifiers are the only words the multi-word cascade inverts
    pub fn is_modifier(&self) -> bool {
        matches!(self, Self::Adjective | Self::Adverb)
    }
}

/// A lemma of a synset and its direct antonyms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lemma {
    pub name: String,

    #[serde(default)]
    pub antonyms: Vec<String>,
}

/// One sense of a word
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synset {
    pub pos: PartOfSpeech,
    pub lemmas: Vec<Lemma>,
}

/// Read access to a lexical database
pub trait LexicalDatabase: Send + Sync {
    /// All senses the word is a lemma of, most common first
    fn synsets(&self, word: &str) -> Vec<&Synset>;

    /// Every direct antonym across all lemmas of all senses, in encounter order
    fn antonyms(&self, word: &str) -> Vec<String> {
        self.synsets(word)
            .into_iter()
            .flat_map(|synset| synset.lemmas.iter())
            .flat_map(|lemma| lemma.antonyms.iter())
            .map(|name| display_form(name))
            .collect()
    }

    /// The first antonym of each lemma that has one, in sense order
    fn first_antonyms(&self, word: &str) -> Vec<String> {
        self.synsets(word)
            .into_iter()
            .flat_map(|synset| synset.lemmas.iter())
            .filter_map(|lemma| lemma.antonyms.first())
            .map(|name| display_form(name))
            .collect()
    }

    /// Part of speech of the most common sense
    fn part_of_speech(&self, word: &str) -> Option<PartOfSpeech> {
        self.synsets(word).first().map(|synset| synset.pos)
    }
}

/// In-memory lexical database
#[derive(Debug, Clone, Default)]
pub struct LexiconStore {
    synsets: Vec<Synset>,
    index: HashMap<String, Vec<usize>>,
}

impl LexiconStore {
    /// Build a store from synsets, indexing every lemma
    pub fn from_synsets(synsets: Vec<Synset>) -> Self {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, synset) in synsets.iter().enumerate() {
            for lemma in &synset.lemmas {
                let entry = index.entry(lookup_key(&lemma.name)).or_default();
                if !entry.contains(&idx) {
                    entry.push(idx);
                }
            }
        }

        Self { synsets, index }
    }

    /// Load from a YAML list of synsets
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let synsets: Vec<Synset> = serde_yaml::from_str(yaml).map_err(|e| {
            antiprompt_core::Error::lexicon(format!("Failed to parse lexicon: {}", e))
        })?;
        Ok(Self::from_synsets(synsets))
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let store = Self::from_yaml(&content)?;
        info!(
            "Loaded lexicon from {} ({} synsets, {} words)",
            path.display(),
            store.synset_count(),
            store.word_count()
        );
        Ok(store)
    }

    /// The seed lexicon shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_LEXICON)
    }

    pub fn synset_count(&self) -> usize {
        self.synsets.len()
    }

    pub fn word_count(&self) -> usize {
        self.index.len()
    }
}

impl LexicalDatabase for LexiconStore {
    fn synsets(&self, word: &str) -> Vec<&Synset> {
        self.index
            .get(&lookup_key(word))
            .map(|ids| ids.iter().map(|&idx| &self.synsets[idx]).collect())
            .unwrap_or_default()
    }
}

fn lookup_key(word: &str) -> String {
    word.trim().to_lowercase().replace(' ', "_")
}

fn display_form(name: &str) -> String {
    name.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> LexiconStore {
        LexiconStore::from_yaml(
            r#"
- {pos: adjective, lemmas: [{name: good, antonyms: [bad, evil]}]}
- {pos: adjective, lemmas: [{name: good, antonyms: [bad]}, {name: well-made}]}
- {pos: noun, lemmas: [{name: good, antonyms: [evil]}]}
- {pos: adjective, lemmas: [{name: out_of_focus, antonyms: [in_focus]}]}
- {pos: noun, lemmas: [{name: anatomy}]}
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_antonyms_across_senses() {
        assert_eq!(store().antonyms("good"), vec!["bad", "evil", "bad", "evil"]);
    }

    #[test]
    fn test_first_antonym_per_lemma() {
        assert_eq!(store().first_antonyms("good"), vec!["bad", "bad", "evil"]);
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_multiword() {
        let store = store();
        assert_eq!(store.antonyms("Good").len(), 4);
        assert_eq!(store.antonyms("out of focus"), vec!["in focus"]);
    }

    #[test]
    fn test_part_of_speech_uses_first_sense() {
        let store = store();
        assert_eq!(store.part_of_speech("good"), Some(PartOfSpeech::Adjective));
        assert_eq!(store.part_of_speech("anatomy"), Some(PartOfSpeech::Noun));
        assert_eq!(store.part_of_speech("xyzzy"), None);
    }

    #[test]
    fn test_words_without_antonyms() {
        assert!(store().antonyms("anatomy").is_empty());
    }

    #[test]
    fn test_builtin_lexicon_parses() {
        let store = LexiconStore::builtin().unwrap();
        assert!(store.synset_count() > 100);
        assert_eq!(store.antonyms("ugly"), vec!["beautiful"]);
        assert!(store.antonyms("blurry").is_empty());
    }

    #[test]
    fn test_malformed_yaml_is_a_lexicon_error() {
        let err = LexiconStore::from_yaml("- {pos: adjective, lemmas: 3}").unwrap_err();
        assert!(matches!(err, antiprompt_core::Error::Lexicon(_)));
    }
}
