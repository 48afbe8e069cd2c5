//! BERT fill-mask backend for `antiprompt-lexicon`.
//!
//! This crate provides a Candle/HuggingFace-backed implementation of
//! `MaskFiller` that can be handed to `Inverter::from_config` to enable the
//! masked-model antonym strategy and the expanding prompt tiers.

pub mod bert_mask_filler;
pub mod settings;

pub use bert_mask_filler::BertMaskFiller;
pub use settings::ModelSettings;
