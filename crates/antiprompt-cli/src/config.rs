//! CLI configuration

use antiprompt_lexicon::LexiconConfig;
use antiprompt_mask_bert::ModelSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything the binary reads from its YAML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Lexical data, cascade order and external lookup settings
    #[serde(flatten)]
    pub lexicon: LexiconConfig,

    /// Masked language model backing the model strategy and the
    /// expanding tiers
    #[serde(default)]
    pub model: ModelSettings,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &Path, cli: &crate::Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if cli.model || cli.model_path.is_some() {
            config.model.enabled = true;
        }

        if let Some(path) = &cli.model_path {
            config.model.local_path = Some(path.clone());
        }

        if let Some(device) = &cli.device {
            config.model.device = device.clone();
        }

        if let Some(top_k) = cli.top_k {
            config.lexicon.mask.top_k = top_k;
        }

        Ok(config)
    }
}

/// `<config dir>/antiprompt/config.yaml`, or `config.yaml` when the platform
/// has no config directory
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("antiprompt").join("config.yaml"))
        .unwrap_or_else(|| PathBuf::from("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use antiprompt_lexicon::StrategyKind;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["antiprompt", "--negative", "ugly"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.yaml"), &cli(&[])).unwrap();

        assert!(!config.model.enabled);
        assert_eq!(config.lexicon.cascade, StrategyKind::default_order());
        assert_eq!(config.lexicon.mask.top_k, 5);
    }

    #[test]
    fn test_file_values_are_flattened() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
cascade: [lexicon_first]
max_phrase_words: 3
conceptnet:
  timeout_ms: 1500
model:
  enabled: true
  repo_id: "distilbert-base-uncased"
"#,
        )
        .unwrap();

        let config = AppConfig::load(&path, &cli(&[])).unwrap();

        assert_eq!(config.lexicon.cascade, vec![StrategyKind::LexiconFirst]);
        assert_eq!(config.lexicon.max_phrase_words, 3);
        assert_eq!(config.lexicon.conceptnet.timeout_ms, 1500);
        assert_eq!(config.lexicon.conceptnet.max_related, 3);
        assert!(config.model.enabled);
        assert_eq!(config.model.repo_id, "distilbert-base-uncased");
        assert_eq!(config.model.device, "cpu");
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "model:\n  device: cpu\nmask:\n  top_k: 3\n").unwrap();

        let config = AppConfig::load(
            &path,
            &cli(&["--model-path", "./models/bert", "--device", "cuda", "--top-k", "8"]),
        )
        .unwrap();

        assert!(config.model.enabled);
        assert_eq!(config.model.local_path, Some(PathBuf::from("./models/bert")));
        assert_eq!(config.model.device, "cuda");
        assert_eq!(config.lexicon.mask.top_k, 8);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "cascade: [not_a_strategy]\n").unwrap();

        assert!(AppConfig::load(&path, &cli(&[])).is_err());
    }

    #[test]
    fn test_default_config_path_file_name() {
        assert!(default_config_path().ends_with("config.yaml"));
    }
}
