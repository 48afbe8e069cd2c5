//! Lexical-database antonym strategies

use crate::database::LexicalDatabase;
use crate::strategy::{AntonymStrategy, StrategyKind};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Domain words the lexical database handles poorly
const FALLBACK_ANTONYMS: &[(&str, &str)] = &[
    ("disfigured", "well-formed"),
    ("blurry", "sharp"),
    ("poor", "excellent"),
    ("anatomy", "structure"),
    ("excellent", "poor"),
    ("quality", "high-quality"),
    ("overexposed", "well-exposed"),
    ("correct", "incorrect"),
    ("high", "low"),
    ("low", "high"),
    ("worst", "best"),
    ("best", "worst"),
    ("mutated", "normal"),
];

/// Most frequent direct antonym across every sense of the word.
///
/// Ties go to the candidate encountered first. When the database has no
/// antonym at all, the built-in fallback table is consulted.
pub struct FrequentAntonymStrategy {
    database: Arc<dyn LexicalDatabase>,
}

impl FrequentAntonymStrategy {
    pub fn new(database: Arc<dyn LexicalDatabase>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl AntonymStrategy for FrequentAntonymStrategy {
    async fn antonym(&self, word: &str) -> String {
        let candidates = self.database.antonyms(word);

        let result = match most_frequent(&candidates) {
            Some(antonym) => antonym.to_string(),
            None => fallback_antonym(word).unwrap_or(word).to_string(),
        };

        debug!("Lexicon frequency strategy: {} -> {}", word, result);
        result
    }

    fn name(&self) -> &str {
        StrategyKind::LexiconFrequency.as_str()
    }
}

/// First antonym of the first sense that has one, ignoring frequency
pub struct FirstAntonymStrategy {
    database: Arc<dyn LexicalDatabase>,
}

impl FirstAntonymStrategy {
    pub fn new(database: Arc<dyn LexicalDatabase>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl AntonymStrategy for FirstAntonymStrategy {
    async fn antonym(&self, word: &str) -> String {
        let result = self
            .database
            .first_antonyms(word)
            .into_iter()
            .next()
            .unwrap_or_else(|| word.to_string());

        debug!("Lexicon first strategy: {} -> {}", word, result);
        result
    }

    fn name(&self) -> &str {
        StrategyKind::LexiconFirst.as_str()
    }
}

/// Entry of the built-in fallback table
pub fn fallback_antonym(word: &str) -> Option<&'static str> {
    FALLBACK_ANTONYMS
        .iter()
        .find(|(key, _)| *key == word)
        .map(|(_, antonym)| *antonym)
}

/// Mode of the candidates, first-encountered on ties
fn most_frequent(candidates: &[String]) -> Option<&str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for candidate in candidates {
        match counts.iter_mut().find(|(seen, _)| *seen == candidate.as_str()) {
            Some((_, count)) => *count += 1,
            None => counts.push((candidate.as_str(), 1)),
        }
    }

    counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (word, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((word, count)),
        })
        .map(|(word, _)| word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::LexiconStore;

    fn database() -> Arc<dyn LexicalDatabase> {
        Arc::new(
            LexiconStore::from_yaml(
                r#"
- {pos: adjective, lemmas: [{name: dull, antonyms: [bright, sharp]}]}
- {pos: adjective, lemmas: [{name: dull, antonyms: [sharp]}]}
- {pos: adjective, lemmas: [{name: old, antonyms: [new, young]}]}
- {pos: adjective, lemmas: [{name: poor, antonyms: [rich]}]}
- {pos: adjective, lemmas: [{name: blurry}]}
"#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_mode_with_first_seen_tie_break() {
        let words = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(most_frequent(&words(&["a", "b", "b"])), Some("b"));
        assert_eq!(most_frequent(&words(&["a", "b"])), Some("a"));
        assert_eq!(most_frequent(&words(&["b", "a", "a", "b"])), Some("b"));
        assert_eq!(most_frequent(&[]), None);
    }

    #[tokio::test]
    async fn test_frequency_strategy_picks_mode() {
        let strategy = FrequentAntonymStrategy::new(database());
        assert_eq!(strategy.antonym("dull").await, "sharp");
        assert_eq!(strategy.antonym("old").await, "new");
    }

    #[tokio::test]
    async fn test_database_wins_over_fallback() {
        let strategy = FrequentAntonymStrategy::new(database());
        assert_eq!(strategy.antonym("poor").await, "rich");
    }

    #[tokio::test]
    async fn test_fallback_table() {
        let strategy = FrequentAntonymStrategy::new(database());
        assert_eq!(strategy.antonym("blurry").await, "sharp");
        assert_eq!(strategy.antonym("mutated").await, "normal");
        assert_eq!(strategy.antonym("xyzzy").await, "xyzzy");
    }

    #[tokio::test]
    async fn test_first_strategy_ignores_frequency() {
        let strategy = FirstAntonymStrategy::new(database());
        assert_eq!(strategy.antonym("dull").await, "bright");
        assert_eq!(strategy.antonym("blurry").await, "blurry");
    }
}
