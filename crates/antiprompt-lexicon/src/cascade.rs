//! Antonym cascade: ordered strategies with early exit on the first change
//!
//! Single words go through every strategy in priority order. Multi-word
//! tags are tagged for part of speech and only their adjectives and
//! adverbs are inverted; nouns in a phrase are never replaced.

use crate::config::LexiconConfig;
use crate::custom::{AntonymOverrides, CustomOverrideStrategy};
use crate::database::LexicalDatabase;
use crate::lexical::{FirstAntonymStrategy, FrequentAntonymStrategy};
use crate::mask::{MaskFiller, MaskedModelStrategy};
use crate::pos::PosTagger;
use crate::strategy::{AntonymStrategy, StrategyKind};
use crate::tokenize::WordTokenizer;
use antiprompt_core::{AntonymResult, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Ordered antonym strategies plus the tagger used for multi-word tags
#[derive(Clone)]
pub struct AntonymCascade {
    strategies: Vec<Arc<dyn AntonymStrategy>>,
    tagger: Arc<dyn PosTagger>,
    tokenizer: WordTokenizer,
}

impl AntonymCascade {
    pub fn builder(tagger: Arc<dyn PosTagger>) -> CascadeBuilder {
        CascadeBuilder::new(tagger)
    }

    /// A copy of this cascade with the user overrides tried first.
    ///
    /// The shared strategies are reference-counted, so this is cheap and
    /// keeps overrides scoped to the caller.
    pub fn with_overrides(&self, overrides: Arc<AntonymOverrides>) -> Self {
        if overrides.is_empty() {
            return self.clone();
        }

        let mut strategies: Vec<Arc<dyn AntonymStrategy>> =
            Vec::with_capacity(self.strategies.len() + 1);
        strategies.push(Arc::new(CustomOverrideStrategy::new(overrides)));
        strategies.extend(self.strategies.iter().cloned());

        Self {
            strategies,
            tagger: self.tagger.clone(),
            tokenizer: self.tokenizer.clone(),
        }
    }

    /// Strategy names in priority order
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolve a tag: one token goes straight to the strategies, more
    /// tokens go through the multi-word path
    pub async fn resolve(&self, tag: &str) -> AntonymResult {
        let words = self.tokenizer.tokenize(tag);

        let result = match words.as_slice() {
            [] => AntonymResult::unresolved(tag),
            [word] => self.resolve_word(word).await,
            _ => {
                let multi = self.resolve_multi(&words).await;
                if multi.is_resolved() {
                    AntonymResult {
                        input: tag.to_string(),
                        ..multi
                    }
                } else {
                    AntonymResult::unresolved(tag)
                }
            }
        };

        record_resolution(&result);
        result
    }

    /// Try each strategy in order and stop at the first that changes the word
    pub async fn resolve_word(&self, word: &str) -> AntonymResult {
        for strategy in &self.strategies {
            let antonym = strategy.antonym(word).await;
            debug!("Strategy '{}': {} -> {}", strategy.name(), word, antonym);

            if antonym != word {
                return AntonymResult::resolved(word, antonym, strategy.name());
            }
        }

        debug!("No antonym found for '{}'", word);
        AntonymResult::unresolved(word)
    }

    /// Invert the first adjective or adverb that resolves, replacing every
    /// occurrence of it and keeping the other words in order
    pub async fn resolve_multi(&self, words: &[String]) -> AntonymResult {
        let joined = words.join(" ");

        for (word, pos) in self.tagger.tag(words) {
            if !pos.is_modifier() {
                continue;
            }

            let single = self.resolve_word(&word).await;
            if let (true, Some(strategy)) = (single.is_resolved(), single.resolved_by.as_deref()) {
                let output = words
                    .iter()
                    .map(|w| if *w == word { single.output.as_str() } else { w.as_str() })
                    .collect::<Vec<_>>()
                    .join(" ");
                return AntonymResult::resolved(joined, output, strategy);
            }
        }

        AntonymResult::unresolved(joined)
    }
}

fn record_resolution(result: &AntonymResult) {
    let strategy = result
        .resolved_by
        .clone()
        .unwrap_or_else(|| "unresolved".to_string());
    metrics::counter!("antiprompt_resolutions_total", "strategy" => strategy).increment(1);
}

/// Builder for [`AntonymCascade`]
pub struct CascadeBuilder {
    strategies: Vec<Arc<dyn AntonymStrategy>>,
    tagger: Arc<dyn PosTagger>,
    tokenizer: WordTokenizer,
}

impl CascadeBuilder {
    pub fn new(tagger: Arc<dyn PosTagger>) -> Self {
        Self {
            strategies: Vec::new(),
            tagger,
            tokenizer: WordTokenizer::default(),
        }
    }

    /// Append a strategy after those already added
    pub fn strategy(mut self, strategy: Arc<dyn AntonymStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn tokenizer(mut self, tokenizer: WordTokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn build(self) -> AntonymCascade {
        AntonymCascade {
            strategies: self.strategies,
            tagger: self.tagger,
            tokenizer: self.tokenizer,
        }
    }
}

/// Build the configured cascade.
///
/// The masked-model step is skipped when no filler is available, so the
/// cascade still works without a model.
pub fn build_cascade(
    config: &LexiconConfig,
    database: Arc<dyn LexicalDatabase>,
    filler: Option<Arc<dyn MaskFiller>>,
    tagger: Arc<dyn PosTagger>,
) -> Result<AntonymCascade> {
    config.validate()?;

    let mut builder = CascadeBuilder::new(tagger).tokenizer(WordTokenizer::new()?);

    for kind in &config.cascade {
        builder = match kind {
            StrategyKind::LexiconFrequency => {
                builder.strategy(Arc::new(FrequentAntonymStrategy::new(database.clone())))
            }
            StrategyKind::LexiconFirst => {
                builder.strategy(Arc::new(FirstAntonymStrategy::new(database.clone())))
            }
            StrategyKind::MaskedModel => match &filler {
                Some(filler) => builder.strategy(Arc::new(
                    MaskedModelStrategy::new(filler.clone()).with_top_k(config.mask.top_k),
                )),
                None => {
                    info!("No masked model available, skipping '{}' strategy", kind);
                    builder
                }
            },
        };
    }

    let cascade = builder.build();
    info!("Antonym cascade: {:?}", cascade.strategy_names());
    Ok(cascade)
}
