use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Where the model artifact comes from
    pub model: ModelConfig,

    /// Object storage coordinates (used when `model.source = "s3"`)
    pub storage: StorageConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: MMP_)
            .add_source(
                config::Environment::with_prefix("MMP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelConfig {
    /// Artifact source backend
    #[serde(default)]
    pub source: ModelSourceKind,

    /// Local artifact path (file source)
    pub path: Option<PathBuf>,

    /// Directory for the transient download file; system temp dir when unset
    pub download_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ModelSourceKind {
    #[default]
    S3,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket holding the model artifact
    #[serde(default)]
    pub bucket: String,

    /// Object key of the model artifact
    #[serde(default = "default_model_key")]
    pub key: String,

    /// Bucket region
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint for S3-compatible stores (switches to path-style addressing)
    pub endpoint: Option<String>,

    /// Env var holding the access key id
    #[serde(default = "default_access_key_id_env")]
    pub access_key_id_env: String,

    /// Env var holding the secret access key
    #[serde(default = "default_secret_access_key_env")]
    pub secret_access_key_env: String,

    /// Env var holding an optional session token
    pub session_token_env: Option<String>,

    /// Download timeout (seconds)
    #[serde(default = "default_storage_timeout")]
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            key: default_model_key(),
            region: default_region(),
            endpoint: None,
            access_key_id_env: default_access_key_id_env(),
            secret_access_key_env: default_secret_access_key_env(),
            session_token_env: Some("AWS_SESSION_TOKEN".to_string()),
            timeout_secs: default_storage_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
            prometheus_enabled: true,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8501
}

fn default_request_timeout() -> u64 {
    30
}

fn default_model_key() -> String {
    "models/moral_machine_model.json".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_access_key_id_env() -> String {
    "AWS_ACCESS_KEY_ID".to_string()
}

fn default_secret_access_key_env() -> String {
    "AWS_SECRET_ACCESS_KEY".to_string()
}

fn default_storage_timeout() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "moral-machine-predictor".to_string()
}

fn default_true() -> bool {
    true
}
