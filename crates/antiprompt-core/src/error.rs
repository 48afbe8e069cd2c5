//! Error types for antiprompt

/// Result type alias using antiprompt's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for antiprompt operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A custom antonym line without a `key:value` separator
    #[error("malformed custom antonym on line {line}: {content:?} (expected `word:antonym`)")]
    MalformedOverride { line: usize, content: String },

    /// Lexical database, phrase table or strength table errors
    #[error("lexicon error: {0}")]
    Lexicon(String),

    /// Masked-language-model loading or inference errors
    #[error("model error: {0}")]
    Model(String),

    /// Knowledge-graph request or decoding errors
    #[error("knowledge graph error: {0}")]
    Graph(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML data/config errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new malformed-override error
    pub fn malformed_override(line: usize, content: impl Into<String>) -> Self {
        Self::MalformedOverride {
            line,
            content: content.into(),
        }
    }

    /// Create a new lexicon error
    pub fn lexicon(msg: impl Into<String>) -> Self {
        Self::Lexicon(msg.into())
    }

    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new knowledge graph error
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error came from user input rather than an external dependency
    pub fn is_user_input(&self) -> bool {
        matches!(self, Self::MalformedOverride { .. })
    }
}
