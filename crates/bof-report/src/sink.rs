//! Metrics sinks.
//!
//! The original pipeline kept two near-identical training scripts, one
//! of which persisted metrics. Here a single driver selects a sink:
//! console only, or console plus a JSON file.

use bof_core::{Error, Result, ValidationMetrics};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Relative path of the metrics file under the repository root.
pub const METRICS_RELATIVE_PATH: &str = "bird_or_forest/reports/metrics.json";

/// Destination for run metrics.
#[derive(Debug, Clone)]
pub enum MetricsSink {
    /// Print to the console only.
    Console,
    /// Print to the console and persist as JSON.
    Json { path: PathBuf },
}

impl MetricsSink {
    /// The conventional JSON sink under a repository root.
    pub fn json_under_root(repo_root: &Path) -> Self {
        Self::Json {
            path: repo_root.join(METRICS_RELATIVE_PATH),
        }
    }

    /// Reports the metrics. The console summary is always printed; the
    /// JSON file is written only for the [`MetricsSink::Json`] variant.
    pub fn report(&self, metrics: &ValidationMetrics) -> Result<()> {
        println!("\nFinal metrics on validation set:");
        println!("  - Loss: {:.4}", metrics.loss);
        println!("  - Error Rate: {:.4}", metrics.error_rate);

        if let Self::Json { path } = self {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(Error::Io)?;
            }
            let json = serde_json::to_string(metrics)?;
            fs::write(path, json).map_err(Error::Io)?;
            info!("Metrics saved as JSON: {}", path.display());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_sink_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        MetricsSink::Console
            .report(&ValidationMetrics::new(0.5, 0.1))
            .unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_json_sink_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("metrics.json");
        let metrics = ValidationMetrics::new(0.123_456, 0.042);

        MetricsSink::Json { path: path.clone() }
            .report(&metrics)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let back: ValidationMetrics = serde_json::from_str(&content).unwrap();
        assert!((back.loss - metrics.loss).abs() < 1e-12);
        assert!((back.error_rate - metrics.error_rate).abs() < 1e-12);

        // The on-disk shape uses the historical "error rate" key.
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert!(value.get("error rate").is_some());
        assert!(value.get("loss").is_some());
    }

    #[test]
    fn test_json_under_root_path() {
        let sink = MetricsSink::json_under_root(Path::new("/repo"));
        match sink {
            MetricsSink::Json { path } => {
                assert_eq!(path, PathBuf::from("/repo/bird_or_forest/reports/metrics.json"));
            }
            MetricsSink::Console => panic!("expected JSON sink"),
        }
    }
}
