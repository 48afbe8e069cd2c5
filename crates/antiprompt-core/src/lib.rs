//! antiprompt Core
//!
//! Core types and error handling shared across antiprompt components.
//!
//! This crate provides:
//! - The per-invocation data model (tags, antonym results, resolution state)
//! - Request/response types for a single inversion run
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    AntonymResult, Complexity, EscalationMode, InversionOutput, InversionRequest,
    ResolutionState, SystemPromptChoice, Tag, TagIntensity,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        AntonymResult, Complexity, InversionOutput, InversionRequest, ResolutionState,
        SystemPromptChoice, Tag,
    };
}
