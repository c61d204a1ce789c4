use crate::config::{PipelineConfig, StorageConfig};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

pub const ENV_STORAGE_URL: &str = "SUPABASE_URL";
pub const ENV_SERVICE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
pub const ENV_BUCKET_NAME: &str = "BUCKET_NAME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("{0} environment variable not set")]
    MissingEnv(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Loads the static YAML config (no secrets), falling back to the built-in
/// defaults when no path is given. Missing fields take their default values.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
    let mut config = match path {
        Some(path_ref) => {
            info!(config_path = ?path_ref, "Loading configuration from file");
            let config_content = match fs::read_to_string(path_ref) {
                Ok(content) => {
                    info!(config_path = ?path_ref, "Config file read successfully");
                    content
                }
                Err(e) => {
                    error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
                    return Err(ConfigError::Read {
                        path: path_ref.to_path_buf(),
                        source: e,
                    });
                }
            };
            match serde_yaml::from_str::<PipelineConfig>(&config_content) {
                Ok(conf) => {
                    info!(config_path = ?path_ref, "Parsed config YAML successfully");
                    conf
                }
                Err(e) => {
                    error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
                    return Err(ConfigError::Parse(e));
                }
            }
        }
        None => {
            info!("No config file given, using built-in defaults");
            PipelineConfig::default()
        }
    };

    normalise(&mut config)?;
    config.trace_loaded();
    Ok(config)
}

fn normalise(config: &mut PipelineConfig) -> Result<(), ConfigError> {
    let scan = &mut config.scan;
    scan.keyword = scan.keyword.trim().to_string();
    scan.extension = scan.extension.trim().trim_start_matches('.').to_string();
    scan.tag_field = scan.tag_field.trim().to_string();

    if scan.keyword.is_empty() {
        return Err(ConfigError::Invalid("scan.keyword must not be empty".into()));
    }
    if scan.extension.is_empty() {
        return Err(ConfigError::Invalid("scan.extension must not be empty".into()));
    }
    if scan.tag_field.is_empty() {
        return Err(ConfigError::Invalid("scan.tag_field must not be empty".into()));
    }
    if config.upload.archive_prefix.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "upload.archive_prefix must not be empty".into(),
        ));
    }
    Ok(())
}

/// Reads the storage endpoint, bucket and service key from the environment.
pub fn load_storage_config() -> Result<StorageConfig, ConfigError> {
    let url = require_env(ENV_STORAGE_URL)?;
    let service_key = require_env(ENV_SERVICE_KEY)?;
    let bucket = require_env(ENV_BUCKET_NAME)?;
    info!(url = %url, bucket = %bucket, "Storage configuration loaded from env");
    Ok(StorageConfig {
        url,
        service_key,
        bucket,
    })
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Ok(_) => {
            error!(var = name, "Environment variable is empty");
            Err(ConfigError::MissingEnv(name))
        }
        Err(e) => {
            error!(error = ?e, var = name, "Environment variable not set");
            Err(ConfigError::MissingEnv(name))
        }
    }
}
