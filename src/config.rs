//! Runtime Configuration
//!
//! Process-level settings: where the serving backend lives, where to listen
//! for triggers, and which load specification to read. Layered as defaults,
//! then an optional config file, then `STAMPEDE_*` environment variable
//! overrides.

use crate::error::SpecError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "STAMPEDE";
const DEFAULT_CONFIG_FILE: &str = "stampede";

/// Root runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Base URL of the feature-serving backend
    #[serde(default = "default_serving_url")]
    pub serving_url: String,

    /// Port the trigger HTTP server listens on
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Project name stamped onto every generated request
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Path to the load specification document
    #[serde(default = "default_spec_path")]
    pub spec_path: PathBuf,

    /// Shared deadline for one dispatch, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_serving_url() -> String {
    "http://localhost:6566".to_string()
}

fn default_listen_port() -> u16 {
    8080
}

fn default_project_name() -> String {
    "default".to_string()
}

fn default_spec_path() -> PathBuf {
    PathBuf::from("loadSpec.yml")
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            serving_url: default_serving_url(),
            listen_port: default_listen_port(),
            project_name: default_project_name(),
            spec_path: default_spec_path(),
            request_timeout_secs: default_request_timeout_secs(),
            logging: LoggingConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration: defaults, then the config file (explicit path
    /// required, default path optional), then environment overrides.
    pub fn load(config_file: Option<&Path>) -> Result<RuntimeConfig, SpecError> {
        let mut builder = Config::builder();

        builder = match config_file {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| SpecError::Config(format!("Failed to load configuration: {}", e)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
