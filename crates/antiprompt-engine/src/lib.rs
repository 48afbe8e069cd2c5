//! antiprompt Engine
//!
//! Turns a negative image prompt into positive additions for a positive
//! prompt.
//!
//! The [`Inverter`] runs one request end to end: idiom substitution, the
//! antonym cascade, optional knowledge-graph enrichment, tiered assembly,
//! and the optional escalation payload for an external language model.

pub mod assembler;
pub mod escalation;
pub mod inverter;

pub use assembler::{dedup_preserving_order, PromptAssembler};
pub use escalation::{build_payload, escalation_mode, escalation_payload, system_prompt, template};
pub use inverter::{Inverter, InverterBuilder};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::assembler::PromptAssembler;
    pub use crate::inverter::Inverter;
    pub use antiprompt_core::prelude::*;
}
