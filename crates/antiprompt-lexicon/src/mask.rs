//! Masked-language-model boundary and the strategy built on it

use crate::strategy::{AntonymStrategy, StrategyKind};
use antiprompt_core::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Mask token used when a filler does not declare its own
pub const DEFAULT_MASK_TOKEN: &str = "[MASK]";

/// Default number of fill-mask candidates considered by the cascade
pub const DEFAULT_TOP_K: usize = 5;

/// A single fill-mask candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskPrediction {
    /// Decoded token filling the mask
    pub token: String,

    /// Probability of the token at the masked position
    pub score: f32,
}

impl MaskPrediction {
    pub fn new(token: impl Into<String>, score: f32) -> Self {
        Self {
            token: token.into(),
            score,
        }
    }
}

/// Fill-mask inference over a text containing exactly one mask token
#[async_trait]
pub trait MaskFiller: Send + Sync {
    /// Best `top_k` candidates for the masked position, most likely first
    async fn fill_mask(&self, text: &str, top_k: usize) -> Result<Vec<MaskPrediction>>;

    /// Get the filler name
    fn name(&self) -> &str;

    /// Token marking the position to fill
    fn mask_token(&self) -> &str {
        DEFAULT_MASK_TOKEN
    }
}

/// Sentence asking the model for the opposite of a word
pub fn opposite_probe(word: &str, mask_token: &str) -> String {
    format!("The opposite of {word} is {mask_token}.")
}

/// Probe the masked model for the opposite of the word.
///
/// The first candidate that differs from the word, is purely alphabetic and
/// is longer than two characters wins. Inference failures are logged and
/// leave the word unchanged.
pub struct MaskedModelStrategy {
    filler: Arc<dyn MaskFiller>,
    top_k: usize,
}

impl MaskedModelStrategy {
    pub fn new(filler: Arc<dyn MaskFiller>) -> Self {
        Self {
            filler,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }
}

#[async_trait]
impl AntonymStrategy for MaskedModelStrategy {
    async fn antonym(&self, word: &str) -> String {
        let probe = opposite_probe(word, self.filler.mask_token());

        let predictions = match self.filler.fill_mask(&probe, self.top_k).await {
            Ok(predictions) => predictions,
            Err(e) => {
                warn!(
                    "Masked model '{}' failed for '{}': {}",
                    self.filler.name(),
                    word,
                    e
                );
                return word.to_string();
            }
        };

        debug!("Masked model candidates for '{}': {:?}", word, predictions);

        predictions
            .into_iter()
            .map(|p| p.token)
            .find(|token| is_usable_candidate(token, word))
            .unwrap_or_else(|| word.to_string())
    }

    fn name(&self) -> &str {
        StrategyKind::MaskedModel.as_str()
    }
}

fn is_usable_candidate(token: &str, word: &str) -> bool {
    token != word && token.chars().count() > 2 && token.chars().all(char::is_alphabetic)
}

/// The word followed by up to `top_n` model phrasings of its opposite.
///
/// Candidates equal to the word are dropped; nothing else is filtered. On
/// inference failure only the word itself is returned.
pub async fn expand_concept(filler: &dyn MaskFiller, word: &str, top_n: usize) -> Vec<String> {
    let probe = opposite_probe(word, filler.mask_token());
    let mut expanded = vec![word.to_string()];

    match filler.fill_mask(&probe, top_n).await {
        Ok(predictions) => expanded.extend(
            predictions
                .into_iter()
                .map(|p| p.token)
                .filter(|token| token != word),
        ),
        Err(e) => warn!("Concept expansion failed for '{}': {}", word, e),
    }

    debug!("Concept expansion for '{}': {:?}", word, expanded);
    expanded
}
