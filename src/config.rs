//! Configuration System
//!
//! Provides hierarchical configuration loading from:
//! - config.toml (default configuration)
//! - config.local.toml (git-ignored local overrides)
//! - `DB_NAME`, `DB_USER`, `DB_PASSWORD`, `DB_HOST`, `DB_PORT`
//! - Environment variables (TEXT2SQL_* prefix)
//!
//! ## Example
//!
//! ```toml
//! # config.toml
//! [database]
//! name = "analytics"
//! user = "readonly"
//! host = "db.internal"
//!
//! [model]
//! endpoint = "http://127.0.0.1:8001"
//! name = "Qwen/Qwen2.5-Coder-7B-Instruct-GPTQ-Int4"
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! DB_PASSWORD=secret
//! TEXT2SQL_MODEL__ENDPOINT=http://gpu-box:8001
//! TEXT2SQL_HTTP__PORT=9000
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::inference::ChatTemplate;

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

/// PostgreSQL connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database name
    #[serde(default = "default_db_name")]
    pub name: String,

    #[serde(default = "default_db_user")]
    pub user: String,

    /// Empty means no password is sent
    #[serde(default)]
    pub password: String,

    #[serde(default = "default_db_host")]
    pub host: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    /// Connect timeout in seconds. 0 = driver default.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Language model serving endpoint and generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible completion server
    #[serde(default = "default_model_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model_name")]
    pub name: String,

    /// Chat template used to render the conversation
    #[serde(default)]
    pub chat_template: ChatTemplate,

    /// System turn of the conversation
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: usize,

    #[serde(default)]
    pub temperature: f32,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// HTTP server configuration for the REST API and UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// HTTP server bind address
    #[serde(default = "default_http_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub port: u16,

    /// Allowed CORS origins (empty = same-origin only, unless cors_allow_all is true)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Explicitly allow all CORS origins (dev mode opt-in)
    #[serde(default)]
    pub cors_allow_all: bool,

    /// Serve the embedded single-page UI at `/`
    #[serde(default = "default_true")]
    pub ui_enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Terminal client defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Inference service URL
    #[serde(default = "default_client_server")]
    pub server: String,

    /// Request timeout in seconds
    #[serde(default = "default_client_timeout_secs")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_db_name() -> String {
    "postgres".to_string()
}
fn default_db_user() -> String {
    "postgres".to_string()
}
fn default_db_host() -> String {
    "localhost".to_string()
}
fn default_db_port() -> u16 {
    5432
}
fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_model_endpoint() -> String {
    "http://127.0.0.1:8001".to_string()
}
fn default_model_name() -> String {
    "Qwen/Qwen2.5-Coder-7B-Instruct-GPTQ-Int4".to_string()
}
fn default_system_prompt() -> String {
    "You are Qwen, created by Alibaba Cloud. You are a helpful assistant.".to_string()
}
fn default_max_new_tokens() -> usize {
    512
}
fn default_request_timeout_secs() -> u64 {
    crate::protocol::DEFAULT_TIMEOUT_SECS
}
fn default_true() -> bool {
    true
}
fn default_http_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    crate::protocol::DEFAULT_PORT
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}
fn default_client_server() -> String {
    format!("http://127.0.0.1:{}", crate::protocol::DEFAULT_PORT)
}
fn default_client_timeout_secs() -> u64 {
    crate::protocol::DEFAULT_TIMEOUT_SECS
}

/// Maps the bare `DB_*` variables onto `database.*` keys.
fn database_env() -> Env {
    Env::raw().filter_map(|key| {
        let field = match key.as_str().to_ascii_uppercase().as_str() {
            "DB_NAME" => "name",
            "DB_USER" => "user",
            "DB_PASSWORD" => "password",
            "DB_HOST" => "host",
            "DB_PORT" => "port",
            _ => return None,
        };
        Some(format!("database.{field}").into())
    })
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Merges in order:
    /// 1. config.toml (base configuration)
    /// 2. config.local.toml (local overrides, git-ignored)
    /// 3. DB_* variables
    /// 4. Environment variables (TEXT2SQL_* prefix)
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Toml::file("config.local.toml"))
            .merge(database_env())
            .merge(Env::prefixed("TEXT2SQL_").split("__"))
            .extract()
    }

    /// Load configuration from specific file path
    pub fn from_file(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(database_env())
            .merge(Env::prefixed("TEXT2SQL_").split("__"))
            .extract()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            name: default_db_name(),
            user: default_db_user(),
            password: String::new(),
            host: default_db_host(),
            port: default_db_port(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            endpoint: default_model_endpoint(),
            name: default_model_name(),
            chat_template: ChatTemplate::default(),
            system_prompt: default_system_prompt(),
            max_new_tokens: default_max_new_tokens(),
            temperature: 0.0,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            host: default_http_host(),
            port: default_http_port(),
            cors_origins: Vec::new(),
            cors_allow_all: false,
            ui_enabled: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server: default_client_server(),
            timeout_secs: default_client_timeout_secs(),
        }
    }
}
