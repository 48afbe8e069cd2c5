//! Where the masked language model comes from and where it runs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Masked-model source and inference settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Load the model at startup; without it the masked-model strategy is
    /// skipped and the expanding tiers keep antonyms as-is
    #[serde(default)]
    pub enabled: bool,

    /// HuggingFace repository id
    #[serde(default = "default_repo_id")]
    pub repo_id: String,

    /// Repository revision (branch, tag or commit)
    #[serde(default = "default_revision")]
    pub revision: String,

    /// Local model directory; takes precedence over the hub
    #[serde(default)]
    pub local_path: Option<PathBuf>,

    /// Inference device: cpu, cuda or metal
    #[serde(default = "default_device")]
    pub device: String,

    /// Maximum sequence length fed to the model
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

fn default_repo_id() -> String {
    "bert-base-uncased".to_string()
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_max_length() -> usize {
    512
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            repo_id: default_repo_id(),
            revision: default_revision(),
            local_path: None,
            device: default_device(),
            max_length: default_max_length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ModelSettings::default();
        assert!(!settings.enabled);
        assert_eq!(settings.repo_id, "bert-base-uncased");
        assert_eq!(settings.revision, "main");
        assert_eq!(settings.device, "cpu");
        assert_eq!(settings.max_length, 512);
        assert!(settings.local_path.is_none());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
enabled: true
local_path: "./models/bert"
device: metal
"#;
        let settings: ModelSettings = serde_yaml::from_str(yaml).unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.local_path, Some(PathBuf::from("./models/bert")));
        assert_eq!(settings.device, "metal");
        assert_eq!(settings.repo_id, "bert-base-uncased");
    }
}
