//! User-supplied antonym overrides
//!
//! Overrides arrive as newline-delimited `word:antonym` text and are parsed
//! fresh for every invocation. They are never shared between runs.

use crate::strategy::AntonymStrategy;
use antiprompt_core::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Parsed `word -> antonym` overrides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AntonymOverrides {
    entries: HashMap<String, String>,
}

impl AntonymOverrides {
    /// Parse `key:value` lines.
    ///
    /// Blank lines are skipped. Keys and values are trimmed; the first colon
    /// separates them. A line without a colon, or with an empty key or value,
    /// fails with [`Error::MalformedOverride`].
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = HashMap::new();

        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| Error::malformed_override(idx + 1, line))?;

            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return Err(Error::malformed_override(idx + 1, line));
            }

            entries.insert(key.to_string(), value.to_string());
        }

        debug!("Custom antonyms loaded: {:?}", entries);
        Ok(Self { entries })
    }

    pub fn get(&self, word: &str) -> Option<&str> {
        self.entries.get(word).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AntonymOverrides {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Exact lookup in the user-supplied overrides
pub struct CustomOverrideStrategy {
    overrides: Arc<AntonymOverrides>,
}

impl CustomOverrideStrategy {
    pub fn new(overrides: Arc<AntonymOverrides>) -> Self {
        Self { overrides }
    }
}

#[async_trait]
impl AntonymStrategy for CustomOverrideStrategy {
    async fn antonym(&self, word: &str) -> String {
        self.overrides.get(word).unwrap_or(word).to_string()
    }

    fn name(&self) -> &str {
        "custom"
    }
}
