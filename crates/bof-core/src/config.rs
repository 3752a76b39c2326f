//! Configuration schema for the bird-or-forest pipeline.
//!
//! The configuration is a YAML document loaded once at startup and
//! immutable for the rest of the run. Unlike the original pipeline,
//! all value ranges are validated eagerly via [`PipelineConfig::validate`]
//! instead of failing at first use.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Run-wide settings (random seed)
    pub base: BaseConfig,
    /// Input data location
    pub data: DataConfig,
    /// Dataset construction parameters
    pub data_block: DataBlockConfig,
    /// Fine-tuning parameters
    #[serde(default)]
    pub training: TrainingConfig,
    /// Metrics and artifact reporting
    #[serde(default)]
    pub report: ReportConfig,
}

/// Run-wide base settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseConfig {
    /// Random seed shared by the split and the framework
    pub random_state: u64,
}

/// Input data location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory of labeled images; label = parent folder name
    pub raw_data_path: PathBuf,
}

/// Dataset construction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataBlockConfig {
    /// Fraction of samples held out for validation, in (0, 1)
    pub validation_size: f64,
    /// Square pixel size for the squish resize
    pub img_resize_value: u32,
    /// Training batch size
    pub batch_size: usize,
}

/// Fine-tuning parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of fine-tuning epochs
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    /// Adam learning rate
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Weight decay (L2 regularization)
    #[serde(default = "default_weight_decay")]
    pub weight_decay: f64,
    /// Optional weights record to fine-tune from
    #[serde(default)]
    pub pretrained_path: Option<PathBuf>,
}

fn default_epochs() -> usize {
    4
}

fn default_learning_rate() -> f64 {
    0.001
}

fn default_weight_decay() -> f64 {
    1e-4
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            learning_rate: default_learning_rate(),
            weight_decay: default_weight_decay(),
            pretrained_path: None,
        }
    }
}

/// Metrics and artifact reporting.
///
/// The original pipeline existed in two copy-pasted variants differing
/// only in whether metrics were persisted; `save_metrics` selects that
/// behavior instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Persist metrics JSON and confusion-matrix artifacts
    #[serde(default)]
    pub save_metrics: bool,
    /// Explicit repository root; when absent the root is resolved via
    /// `git rev-parse --show-toplevel`
    #[serde(default)]
    pub repo_root: Option<PathBuf>,
}

impl PipelineConfig {
    /// Loads and parses the configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        crate::cli::load_yaml_config(path)
    }

    /// Validates all value ranges.
    pub fn validate(&self) -> Result<()> {
        let v = self.data_block.validation_size;
        if !(v > 0.0 && v < 1.0) {
            return Err(Error::Config(format!(
                "validation_size must be in (0, 1), got {v}"
            )));
        }
        if self.data_block.img_resize_value == 0 {
            return Err(Error::Config(
                "img_resize_value must be greater than 0".to_string(),
            ));
        }
        if self.data_block.batch_size == 0 {
            return Err(Error::Config(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        if self.training.epochs == 0 {
            return Err(Error::Config("epochs must be greater than 0".to_string()));
        }
        if self.training.learning_rate <= 0.0 {
            return Err(Error::Config(format!(
                "learning_rate must be positive, got {}",
                self.training.learning_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_YAML: &str = r#"
base:
  random_state: 42
data:
  raw_data_path: data/raw
data_block:
  validation_size: 0.2
  img_resize_value: 192
  batch_size: 32
"#;

    fn minimal_config() -> PipelineConfig {
        serde_yaml::from_str(MINIMAL_YAML).unwrap()
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = minimal_config();
        assert_eq!(config.base.random_state, 42);
        assert_eq!(config.data.raw_data_path, PathBuf::from("data/raw"));
        assert_eq!(config.data_block.batch_size, 32);
        // Omitted sections fall back to defaults
        assert_eq!(config.training.epochs, 4);
        assert!(!config.report.save_metrics);
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
base:
  random_state: 7
data:
  raw_data_path: /data/birds
data_block:
  validation_size: 0.25
  img_resize_value: 224
  batch_size: 16
training:
  epochs: 8
  learning_rate: 0.0005
report:
  save_metrics: true
  repo_root: /srv/project
"#;
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.training.epochs, 8);
        assert_eq!(config.training.weight_decay, 1e-4);
        assert!(config.report.save_metrics);
        assert_eq!(config.report.repo_root, Some(PathBuf::from("/srv/project")));
    }

    #[test]
    fn test_validate_accepts_minimal() {
        assert!(minimal_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_split() {
        let mut config = minimal_config();
        config.data_block.validation_size = 1.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.data_block.validation_size = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_resize() {
        let mut config = minimal_config();
        config.data_block.img_resize_value = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let mut config = minimal_config();
        config.data_block.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = PipelineConfig::load(Path::new("/nonexistent/params.yaml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.yaml");
        std::fs::write(&path, "base: [unclosed").unwrap();
        assert!(PipelineConfig::load(&path).is_err());
    }
}
