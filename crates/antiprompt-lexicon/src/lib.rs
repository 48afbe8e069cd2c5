//! antiprompt Lexicon
//!
//! Lexical machinery for turning negative prompt tags into their opposites.
//!
//! Resolution runs in two passes:
//! - The phrase rewriter substitutes known multi-word idioms
//! - The antonym cascade resolves the remaining tags word by word, trying
//!   user overrides, the lexical database and a masked language model in
//!   priority order
//!
//! External collaborators (masked model, knowledge graph, sentiment) sit
//! behind async traits so they can be swapped or mocked.

pub mod cascade;
pub mod concept;
pub mod config;
pub mod custom;
pub mod database;
pub mod lexical;
pub mod mask;
pub mod phrase;
pub mod pos;
pub mod sentiment;
pub mod strategy;
pub mod strength;
pub mod tokenize;

pub use cascade::{build_cascade, AntonymCascade, CascadeBuilder};
pub use concept::{ConceptExpander, ConceptGraph, ConceptNetClient};
pub use config::{ConceptNetConfig, LexiconConfig, MaskConfig};
pub use custom::{AntonymOverrides, CustomOverrideStrategy};
pub use database::{Lemma, LexicalDatabase, LexiconStore, PartOfSpeech, Synset};
pub use lexical::{FirstAntonymStrategy, FrequentAntonymStrategy};
pub use mask::{expand_concept, MaskFiller, MaskPrediction, MaskedModelStrategy};
pub use phrase::{PhraseMap, PhraseRewrite, PhraseRewriter};
pub use pos::{LexiconTagger, PosTagger};
pub use sentiment::{LexiconSentimentScorer, SentimentScorer};
pub use strategy::{AntonymStrategy, StrategyKind};
pub use strength::StrengthMap;
pub use tokenize::WordTokenizer;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cascade::AntonymCascade;
    pub use crate::concept::{ConceptExpander, ConceptGraph};
    pub use crate::custom::AntonymOverrides;
    pub use crate::database::{LexicalDatabase, LexiconStore};
    pub use crate::mask::{MaskFiller, MaskPrediction};
    pub use crate::phrase::{PhraseMap, PhraseRewriter};
    pub use crate::pos::{LexiconTagger, PosTagger};
    pub use crate::sentiment::{LexiconSentimentScorer, SentimentScorer};
    pub use crate::strategy::AntonymStrategy;
    pub use crate::strength::StrengthMap;
}
