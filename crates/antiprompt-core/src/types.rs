//! Core types for antiprompt

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// One comma-delimited segment of a negative prompt, trimmed and never empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Create a tag from raw text, returning `None` if nothing is left after trimming
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Split prompt text on commas into tags, dropping empty segments
    pub fn split(text: &str) -> Vec<Tag> {
        text.split(',').filter_map(Tag::new).collect()
    }

    /// Borrow the tag text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the tag, returning its text
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of running the antonym cascade on a tag or word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntonymResult {
    /// The text that was resolved
    pub input: String,

    /// The resolved opposite (equal to `input` when unresolved)
    pub output: String,

    /// Name of the strategy that produced the change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
}

impl AntonymResult {
    /// A result where no strategy changed the input
    pub fn unresolved(input: impl Into<String>) -> Self {
        let input = input.into();
        Self {
            output: input.clone(),
            input,
            resolved_by: None,
        }
    }

    /// A result produced by the named strategy
    pub fn resolved(
        input: impl Into<String>,
        output: impl Into<String>,
        strategy: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            resolved_by: Some(strategy.into()),
        }
    }

    /// Whether resolution changed the input
    pub fn is_resolved(&self) -> bool {
        self.output != self.input
    }
}

/// Per-invocation bookkeeping of what was substituted, cascaded, or left over
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionState {
    /// Idioms substituted by the phrase rewriter
    pub handled_tags: BTreeSet<String>,

    /// Idiom -> substituted opposite, for every applied idiom
    pub replacements: BTreeMap<String, String>,

    /// Tags the cascade could not resolve, in prompt order
    pub unresolved_tags: Vec<String>,

    /// Resolved opposites, in prompt order
    pub antonyms: Vec<String>,
}

impl ResolutionState {
    /// Whether the tag was consumed by the phrase rewriter, either as the idiom
    /// itself or as its substituted opposite
    pub fn is_handled(&self, tag: &str) -> bool {
        self.handled_tags.contains(tag) || self.replacements.values().any(|v| v == tag)
    }
}

/// How many candidate opposites to keep and how to join them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Deduplicated resolved antonyms
    #[default]
    Basic,
    /// Model-expanded antonyms, filtered and deduplicated
    Advanced,
    /// Model-expanded antonyms, verbatim
    Expert,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }
}

impl FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "advanced" => Ok(Self::Advanced),
            "expert" => Ok(Self::Expert),
            other => Err(format!(
                "unknown complexity '{other}' (expected basic, advanced or expert)"
            )),
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canned system instruction used for the escalation payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemPromptChoice {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "prompt_1")]
    Prompt1,
    #[serde(rename = "prompt_2")]
    Prompt2,
}

impl SystemPromptChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Prompt1 => "prompt_1",
            Self::Prompt2 => "prompt_2",
        }
    }
}

impl FromStr for SystemPromptChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "prompt_1" | "prompt1" => Ok(Self::Prompt1),
            "prompt_2" | "prompt2" => Ok(Self::Prompt2),
            other => Err(format!(
                "unknown system prompt '{other}' (expected default, prompt_1 or prompt_2)"
            )),
        }
    }
}

impl fmt::Display for SystemPromptChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which escalation payload was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscalationMode {
    /// The whole negative prompt is handed to the external model
    Full,
    /// Only the unresolved tags are handed to the external model
    Fallback,
}

impl EscalationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Fallback => "fallback",
        }
    }
}

/// Inputs of a single inversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InversionRequest {
    pub positive_prompt: String,
    pub negative_prompt: String,

    /// Weight in [0, 1] applied to the sentiment polarity
    #[serde(default = "default_strength")]
    pub strength: f32,

    #[serde(default)]
    pub complexity: Complexity,

    #[serde(default)]
    pub system_prompt_choice: SystemPromptChoice,

    /// Newline-delimited `word:antonym` overrides
    #[serde(default)]
    pub custom_antonyms: Option<String>,

    #[serde(default)]
    pub use_conceptnet: bool,

    #[serde(default)]
    pub use_llm_full: bool,

    #[serde(default)]
    pub use_llm_fallback: bool,

    /// Replaces the canned system prompt when non-empty
    #[serde(default)]
    pub custom_system_prompt: Option<String>,
}

impl InversionRequest {
    /// Create a request with the default options
    pub fn new(positive_prompt: impl Into<String>, negative_prompt: impl Into<String>) -> Self {
        Self {
            positive_prompt: positive_prompt.into(),
            negative_prompt: negative_prompt.into(),
            strength: default_strength(),
            complexity: Complexity::default(),
            system_prompt_choice: SystemPromptChoice::default(),
            custom_antonyms: None,
            use_conceptnet: false,
            use_llm_full: false,
            use_llm_fallback: false,
            custom_system_prompt: None,
        }
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength.clamp(0.0, 1.0);
        self
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_system_prompt(mut self, choice: SystemPromptChoice) -> Self {
        self.system_prompt_choice = choice;
        self
    }

    pub fn with_custom_antonyms(mut self, overrides: impl Into<String>) -> Self {
        self.custom_antonyms = Some(overrides.into());
        self
    }

    pub fn with_conceptnet(mut self, enable: bool) -> Self {
        self.use_conceptnet = enable;
        self
    }

    pub fn with_llm_full(mut self, enable: bool) -> Self {
        self.use_llm_full = enable;
        self
    }

    pub fn with_llm_fallback(mut self, enable: bool) -> Self {
        self.use_llm_fallback = enable;
        self
    }

    pub fn with_custom_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_system_prompt = Some(prompt.into());
        self
    }
}

fn default_strength() -> f32 {
    0.5
}

/// Informational intensity of a tag, looked up in the strength table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagIntensity {
    pub tag: String,
    pub weight: f32,
}

/// Outputs of a single inversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InversionOutput {
    /// Positive prompt with the resolved opposites appended
    pub modified_prompt: String,

    /// Escalation payload for an external language model (empty when not requested)
    pub llm_input: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation: Option<EscalationMode>,

    pub state: ResolutionState,

    /// Polarity of the original negative prompt in [-1, 1]
    pub sentiment: f32,

    /// |sentiment| x strength
    pub antonym_strength: f32,

    pub intensities: Vec<TagIntensity>,
}

impl InversionOutput {
    /// The two strings handed back to the host: (modified prompt, escalation payload)
    pub fn into_pair(self) -> (String, String) {
        (self.modified_prompt, self.llm_input)
    }
}
