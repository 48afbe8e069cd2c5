//! Knowledge-graph enrichment of resolved antonyms
//!
//! The expander never fails: a word whose lookup errors simply contributes
//! no related terms.

use crate::config::ConceptNetConfig;
use antiprompt_core::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Relation label of antonym edges
const ANTONYM_RELATION: &str = "Antonym";

/// Word -> antonym terms from an external knowledge graph
#[async_trait]
pub trait ConceptGraph: Send + Sync {
    async fn related_antonyms(&self, word: &str) -> Result<Vec<String>>;

    /// Get the graph name
    fn name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct ConceptResponse {
    #[serde(default)]
    edges: Vec<ConceptEdge>,
}

#[derive(Debug, Deserialize)]
struct ConceptEdge {
    #[serde(default)]
    rel: ConceptLabel,
    #[serde(default)]
    end: ConceptLabel,
}

#[derive(Debug, Default, Deserialize)]
struct ConceptLabel {
    #[serde(default)]
    label: String,
}

/// HTTP client for the ConceptNet API (`GET {base}/c/en/{word}`)
pub struct ConceptNetClient {
    client: Client,
    base_url: String,
}

impl ConceptNetClient {
    pub fn new(config: &ConceptNetConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::graph(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn concept_url(&self, word: &str) -> String {
        let term = word.trim().to_lowercase().replace(' ', "_");
        format!("{}/c/en/{}", self.base_url, term)
    }
}

#[async_trait]
impl ConceptGraph for ConceptNetClient {
    async fn related_antonyms(&self, word: &str) -> Result<Vec<String>> {
        let url = self.concept_url(word);
        debug!("Querying ConceptNet: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::graph(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::graph(format!("HTTP {} from {}", status, url)));
        }

        let body: ConceptResponse = response
            .json()
            .await
            .map_err(|e| Error::graph(format!("Invalid response from {}: {}", url, e)))?;

        Ok(body
            .edges
            .into_iter()
            .filter(|edge| edge.rel.label == ANTONYM_RELATION)
            .map(|edge| edge.end.label)
            .filter(|label| !label.is_empty() && !label.eq_ignore_ascii_case(word))
            .collect())
    }

    fn name(&self) -> &str {
        "conceptnet"
    }
}

/// Adds up to `max_related` graph antonyms per word
pub struct ConceptExpander {
    graph: Arc<dyn ConceptGraph>,
    max_related: usize,
}

impl ConceptExpander {
    pub fn new(graph: Arc<dyn ConceptGraph>, max_related: usize) -> Self {
        Self { graph, max_related }
    }

    /// The input words followed by their related terms, deduplicated with
    /// first occurrence kept
    pub async fn expand(&self, words: &[String]) -> Vec<String> {
        let mut expanded: Vec<String> = Vec::with_capacity(words.len());

        for word in words {
            push_unique(word.clone(), &mut expanded);
        }

        for word in words {
            match self.graph.related_antonyms(word).await {
                Ok(related) => {
                    debug!("Graph '{}' related to '{}': {:?}", self.graph.name(), word, related);
                    for term in related.into_iter().take(self.max_related) {
                        push_unique(term, &mut expanded);
                    }
                }
                Err(e) => warn!("Concept expansion skipped for '{}': {}", word, e),
            }
        }

        expanded
    }
}

fn push_unique(term: String, terms: &mut Vec<String>) {
    if !terms.contains(&term) {
        terms.push(term);
    }
}
