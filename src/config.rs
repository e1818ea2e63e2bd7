use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::workflows::Department;

/// Main configuration structure for Labelflow
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabelflowConfig {
    /// Where snapshots, documents and blobs live
    pub storage: StorageConfig,
    /// Workflow tuning
    pub workflow: WorkflowConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory for all persisted data
    pub data_dir: PathBuf,
    /// Key the local snapshot is stored under
    pub storage_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Days between final print approval and the delivery deadline
    pub delivery_window_days: u32,
    /// Department selected when no snapshot exists yet
    pub default_department: Department,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level filter, overridden by RUST_LOG
    pub log_level: String,
    /// Emit JSON lines instead of human readable logs
    pub json_logs: bool,
}

impl Default for LabelflowConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_dir: PathBuf::from(".labelflow"),
                storage_key: "label-requests-storage".to_string(),
            },
            workflow: WorkflowConfig {
                delivery_window_days: 15,
                default_department: Department::Marketing,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
        }
    }
}

impl LabelflowConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (labelflow.toml, .labelflow-rc)
    /// 3. Environment variables (prefixed with LABELFLOW_)
    pub fn load() -> Result<Self> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&LabelflowConfig::default())?);

        if Path::new("labelflow.toml").exists() {
            builder = builder.add_source(File::with_name("labelflow"));
        }

        if Path::new(".labelflow-rc").exists() {
            builder = builder.add_source(
                File::with_name(".labelflow-rc").format(config::FileFormat::Toml),
            );
        }

        // LABELFLOW_STORAGE__DATA_DIR, LABELFLOW_WORKFLOW__DELIVERY_WINDOW_DAYS, ...
        builder = builder.add_source(
            Environment::with_prefix("LABELFLOW")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load configuration from a single TOML file on top of the defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(Config::try_from(&LabelflowConfig::default())?)
            .add_source(File::from(path.as_ref()).format(config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = LabelflowConfig::default();
        assert_eq!(config.workflow.delivery_window_days, 15);
        assert_eq!(config.workflow.default_department, Department::Marketing);
        assert_eq!(config.storage.storage_key, "label-requests-storage");
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("labelflow.toml");

        let mut config = LabelflowConfig::default();
        config.workflow.delivery_window_days = 20;
        config.workflow.default_department = Department::Purchasing;
        config.observability.json_logs = true;
        config.save_to_file(&path).unwrap();

        let loaded = LabelflowConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.workflow.delivery_window_days, 20);
        assert_eq!(loaded.workflow.default_department, Department::Purchasing);
        assert!(loaded.observability.json_logs);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("partial.toml");
        std::fs::write(&path, "[workflow]\ndelivery_window_days = 10\n").unwrap();

        let loaded = LabelflowConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.workflow.delivery_window_days, 10);
        assert_eq!(loaded.storage.data_dir, PathBuf::from(".labelflow"));
    }
}
