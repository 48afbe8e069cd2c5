//! Prompt assembly tiers
//!
//! Every tier yields `positive + ", " + joined antonyms`, even when the
//! antonym list is empty.

use antiprompt_core::Complexity;
use antiprompt_lexicon::{expand_concept, MaskFiller};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default model alternatives per antonym in the expanding tiers
pub const DEFAULT_EXPAND_TOP_N: usize = 2;

/// Joins resolved antonyms onto the positive prompt
pub struct PromptAssembler {
    filler: Option<Arc<dyn MaskFiller>>,
    expand_top_n: usize,
}

impl PromptAssembler {
    pub fn new(filler: Option<Arc<dyn MaskFiller>>) -> Self {
        Self {
            filler,
            expand_top_n: DEFAULT_EXPAND_TOP_N,
        }
    }

    pub fn with_expand_top_n(mut self, top_n: usize) -> Self {
        self.expand_top_n = top_n;
        self
    }

    /// Dispatch to the tier
    pub async fn assemble(&self, complexity: Complexity, positive: &str, antonyms: &[String]) -> String {
        let terms = match complexity {
            Complexity::Basic => dedup_preserving_order(antonyms.iter().cloned()),
            Complexity::Advanced => dedup_preserving_order(
                self.expand(antonyms)
                    .await
                    .into_iter()
                    .filter(|term| term.chars().count() > 2),
            ),
            Complexity::Expert => self.expand(antonyms).await,
        };

        debug!("{} tier terms: {:?}", complexity, terms);
        join_prompt(positive, &terms)
    }

    /// Each antonym followed by its model alternatives, flattened
    async fn expand(&self, antonyms: &[String]) -> Vec<String> {
        let Some(filler) = &self.filler else {
            warn!("No masked model available, expanding tiers keep antonyms as-is");
            return antonyms.to_vec();
        };

        let mut expanded = Vec::new();
        for antonym in antonyms {
            expanded.extend(expand_concept(filler.as_ref(), antonym, self.expand_top_n).await);
        }
        expanded
    }
}

/// Drop repeated terms, keeping the first occurrence
pub fn dedup_preserving_order(terms: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for term in terms {
        if !unique.contains(&term) {
            unique.push(term);
        }
    }
    unique
}

fn join_prompt(positive: &str, terms: &[String]) -> String {
    format!("{}, {}", positive, terms.join(", "))
}
