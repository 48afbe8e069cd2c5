//! Sentiment polarity scoring
//!
//! The polarity is informational: it scales the reported antonym strength
//! and never changes which antonyms are kept.

use aho_corasick::{AhoCorasick, Match};
use antiprompt_core::Result;
use async_trait::async_trait;

/// Polarity of a text span in [-1, 1]
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    async fn polarity(&self, text: &str) -> Result<f32>;

    /// Get the scorer name
    fn name(&self) -> &str;
}

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "wonderful", "beautiful", "fantastic", "awesome",
    "best", "perfect", "sharp", "clear", "clean", "detailed", "vivid", "high", "stunning",
    "elegant", "natural", "pleasant", "pretty", "attractive", "masterpiece", "professional",
    "balanced", "crisp", "correct", "well",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "worst", "poor", "ugly", "low", "blurry", "blurred",
    "deformed", "disfigured", "mutated", "distorted", "grainy", "noisy", "dull", "amateur",
    "amateurish", "messy", "cluttered", "unnatural", "gross", "disgusting", "boring", "wrong",
    "incorrect", "cropped", "overexposed", "underexposed", "pixelated", "jpeg", "artifacts",
    "watermark",
];

/// Lexicon-based polarity: (positive - negative) / (positive + negative)
/// over whole-word hits, 0.0 when nothing matches
pub struct LexiconSentimentScorer {
    name: String,
    positive: AhoCorasick,
    negative: AhoCorasick,
}

impl LexiconSentimentScorer {
    pub fn new() -> Result<Self> {
        Self::with_lexicon("sentiment-lexicon", POSITIVE_WORDS, NEGATIVE_WORDS)
    }

    pub fn with_lexicon(
        name: impl Into<String>,
        positive: &[&str],
        negative: &[&str],
    ) -> Result<Self> {
        let positive = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(positive)
            .map_err(|e| {
                antiprompt_core::Error::lexicon(format!(
                    "Failed to build positive sentiment matcher: {e}"
                ))
            })?;

        let negative = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(negative)
            .map_err(|e| {
                antiprompt_core::Error::lexicon(format!(
                    "Failed to build negative sentiment matcher: {e}"
                ))
            })?;

        Ok(Self {
            name: name.into(),
            positive,
            negative,
        })
    }

    fn whole_word_hits(matcher: &AhoCorasick, text: &str) -> usize {
        matcher
            .find_overlapping_iter(text)
            .filter(|m| is_whole_word(text, m))
            .count()
    }
}

fn is_whole_word(text: &str, m: &Match) -> bool {
    let before = text[..m.start()].chars().next_back();
    let after = text[m.end()..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

#[async_trait]
impl SentimentScorer for LexiconSentimentScorer {
    async fn polarity(&self, text: &str) -> Result<f32> {
        let positive_hits = Self::whole_word_hits(&self.positive, text) as f32;
        let negative_hits = Self::whole_word_hits(&self.negative, text) as f32;
        let total = positive_hits + negative_hits;

        if total == 0.0 {
            return Ok(0.0);
        }

        Ok((positive_hits - negative_hits) / total)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
