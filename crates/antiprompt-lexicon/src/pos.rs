//! Part-of-speech tagging for multi-word tags

use crate::database::{LexicalDatabase, PartOfSpeech};
use std::sync::Arc;

/// Assigns a part of speech to each word of a phrase
pub trait PosTagger: Send + Sync {
    fn tag(&self, words: &[String]) -> Vec<(String, PartOfSpeech)>;
}

const CLOSED_CLASS: &[&str] = &[
    // Determiners
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "any",
    // Prepositions
    "of", "in", "on", "at", "by", "for", "with", "without", "from", "to", "into", "over",
    "under", "out", "off",
    // Conjunctions
    "and", "or", "but", "nor",
    // Pronouns
    "it", "its", "he", "she", "they", "them", "his", "her", "their",
];

const INTENSIFIERS: &[&str] = &[
    "too", "very", "so", "quite", "rather", "overly", "extremely", "slightly", "really",
    "somewhat", "not",
];

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ous", "ful", "less", "ive", "able", "ible", "ic", "ish", "al", "ed",
];

/// Tagger backed by the lexical database, closed-class lists and suffix rules
pub struct LexiconTagger {
    database: Arc<dyn LexicalDatabase>,
}

impl LexiconTagger {
    pub fn new(database: Arc<dyn LexicalDatabase>) -> Self {
        Self { database }
    }

    fn tag_word(&self, word: &str) -> PartOfSpeech {
        let lower = word.to_lowercase();

        if !lower.chars().any(char::is_alphanumeric) {
            return PartOfSpeech::Other;
        }
        if CLOSED_CLASS.contains(&lower.as_str()) {
            return PartOfSpeech::Other;
        }
        if INTENSIFIERS.contains(&lower.as_str()) {
            return PartOfSpeech::Adverb;
        }
        if let Some(pos) = self.database.part_of_speech(&lower) {
            return pos;
        }
        if lower.len() > 4 && lower.ends_with("ly") {
            return PartOfSpeech::Adverb;
        }
        if lower.len() > 4 && ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            return PartOfSpeech::Adjective;
        }

        PartOfSpeech::Noun
    }
}

impl PosTagger for LexiconTagger {
    fn tag(&self, words: &[String]) -> Vec<(String, PartOfSpeech)> {
        words
            .iter()
            .map(|word| (word.clone(), self.tag_word(word)))
            .collect()
    }
}
