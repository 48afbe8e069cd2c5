//! Word tokenizer shared by the phrase rewriter, tagger and cascade

use antiprompt_core::Result;
use regex::Regex;

/// Regex-based word tokenizer.
///
/// Runs of word characters joined by internal hyphens or apostrophes form a
/// single token ("plastic-looking", "don't"); any other non-space character
/// is a token of its own, so commas survive as separate tokens.
#[derive(Debug, Clone)]
pub struct WordTokenizer {
    pattern: Regex,
}

impl WordTokenizer {
    /// Create a new tokenizer
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(r"\w+(?:[-'’]\w+)*|[^\w\s]").map_err(|e| {
            antiprompt_core::Error::internal(format!("Failed to compile token regex: {}", e))
        })?;

        Ok(Self { pattern })
    }

    /// Split text into word and punctuation tokens
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self::new().expect("Failed to create word tokenizer")
    }
}
