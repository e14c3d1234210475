//! Configuration loading, validation, and management for Skimmer.
//!
//! Loads configuration from `~/.skimmer/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.skimmer/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the generation backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Generation backend settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Page fetching settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Context window and input limits
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Session persistence
    #[serde(default)]
    pub storage: StorageConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("extraction", &self.extraction)
            .field("conversation", &self.conversation)
            .field("storage", &self.storage)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Well-known provider name ("openai", "openrouter", "ollama", ...) or `custom:<url>`
    #[serde(default = "default_provider")]
    pub name: String,

    /// Overrides the base URL resolved from `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_provider_timeout() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider(),
            api_url: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// Extracted text shorter than this is treated as a failed extraction
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_fetch_timeout() -> u64 {
    10
}
fn default_min_content_chars() -> usize {
    50
}
fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}
fn default_user_agent() -> String {
    format!("Mozilla/5.0 (compatible; Skimmer/{})", env!("CARGO_PKG_VERSION"))
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            min_content_chars: default_min_content_chars(),
            max_body_bytes: default_max_body_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Entries fetched from the store before a follow-up
    #[serde(default = "default_followup_history")]
    pub followup_history: usize,

    /// Entries rendered into the follow-up context window
    #[serde(default = "default_context_entries")]
    pub context_entries: usize,

    #[serde(default = "default_user_excerpt")]
    pub user_excerpt_chars: usize,

    #[serde(default = "default_assistant_excerpt")]
    pub assistant_excerpt_chars: usize,

    /// Summary input is cut to this many characters before generation
    #[serde(default = "default_summary_input")]
    pub summary_input_chars: usize,

    #[serde(default = "default_max_message")]
    pub max_message_chars: usize,
}

fn default_followup_history() -> usize {
    10
}
fn default_context_entries() -> usize {
    5
}
fn default_user_excerpt() -> usize {
    200
}
fn default_assistant_excerpt() -> usize {
    300
}
fn default_summary_input() -> usize {
    3000
}
fn default_max_message() -> usize {
    100_000
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            followup_history: default_followup_history(),
            context_entries: default_context_entries(),
            user_excerpt_chars: default_user_excerpt(),
            assistant_excerpt_chars: default_assistant_excerpt(),
            summary_input_chars: default_summary_input(),
            max_message_chars: default_max_message(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// "file", "sqlite" or "memory"
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// Directory (file backend) or database file (sqlite backend)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_storage_backend() -> String {
    "file".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: None,
        }
    }
}

impl StorageConfig {
    /// The configured path, or the backend's default location under `~/.skimmer`.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        match self.backend.as_str() {
            "sqlite" => AppConfig::config_dir().join("sessions.db"),
            _ => AppConfig::config_dir().join("sessions"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Empty = allow any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_port() -> u16 {
    8787
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_body_limit() -> usize {
    512 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: vec![],
            body_limit_bytes: default_body_limit(),
        }
    }
}

const STORAGE_BACKENDS: [&str; 3] = ["file", "sqlite", "memory"];

impl AppConfig {
    /// Load configuration from the default path (~/.skimmer/config.toml).
    ///
    /// Environment variables override the file:
    /// - `SKIMMER_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `SKIMMER_PROVIDER`
    /// - `SKIMMER_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::default_path())
    }

    /// Load a specific file and apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup`. Unset and empty variables are ignored.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("SKIMMER_API_KEY").or_else(|| var("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }

        if let Some(provider) = var("SKIMMER_PROVIDER") {
            self.provider.name = provider;
        }

        if let Some(model) = var("SKIMMER_MODEL") {
            self.provider.model = model;
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".skimmer")
    }

    /// `~/.skimmer/config.toml`
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.provider.timeout_secs == 0 || self.extraction.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeouts must be greater than zero".into(),
            ));
        }

        if self.conversation.followup_history == 0 || self.conversation.context_entries == 0 {
            return Err(ConfigError::ValidationError(
                "conversation.followup_history and conversation.context_entries must be > 0"
                    .into(),
            ));
        }

        if !STORAGE_BACKENDS.contains(&self.storage.backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown storage backend '{}' (expected one of: {})",
                self.storage.backend,
                STORAGE_BACKENDS.join(", ")
            )));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: ProviderConfig::default(),
            extraction: ExtractionConfig::default(),
            conversation: ConversationConfig::default(),
            storage: StorageConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
