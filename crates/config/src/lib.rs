//! Configuration loading, validation, and management for voxintent.
//!
//! Loads configuration from `~/.voxintent/config.toml` with environment
//! variable overrides, then checks the values the pipeline depends on.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use voxintent_core::action::ActionDescriptor;
use voxintent_core::intent::ReservedActions;

const API_KEY_VARS: [&str; 3] = ["VOXINTENT_API_KEY", "OPENAI_API_KEY", "OPENROUTER_API_KEY"];

/// Everything the classifier and its backend need.
///
/// Maps directly to `~/.voxintent/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shared API key; `[providers.*].api_key` takes precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Provider used for classification
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Model name sent to that provider
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Sampling temperature, 0.0–2.0; keep it low for stable intents
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Reply budget; a decision object is short
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Intent classification settings
    #[serde(default)]
    pub intent: IntentConfig,

    /// Intent cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Per-provider endpoint, key and model overrides
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Static action catalog offered to the backend
    #[serde(default)]
    pub actions: Vec<ActionDescriptor>,

    /// JSON-schema tool definitions, offered after `actions`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSchema>,

    /// Domain context sources
    #[serde(default)]
    pub plugins: PluginsConfig,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_max_tokens() -> u32 {
    512
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
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("intent", &self.intent)
            .field("cache", &self.cache)
            .field("providers", &self.providers)
            .field("actions", &self.actions)
            .field("plugins", &self.plugins)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentConfig {
    /// How many prior dialogue turns are shown to the backend
    #[serde(default = "default_history_count")]
    pub history_count: usize,

    /// Cache namespace for classified intents
    #[serde(default = "default_cache_namespace")]
    pub cache_namespace: String,

    /// Names of the reserved actions
    #[serde(default)]
    pub reserved: ReservedActions,
}

fn default_history_count() -> usize {
    4
}
fn default_cache_namespace() -> String {
    "intent".into()
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            history_count: default_history_count(),
            cache_namespace: default_cache_namespace(),
            reserved: ReservedActions::default(),
        }
    }
}

/// Where classified intents are cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local map
    #[default]
    Memory,
    /// Caching disabled
    None,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,

    /// Entry lifetime in seconds (unset = no expiry)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,

    /// Maximum number of entries (unset = unbounded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

/// A tool in OpenAI function format: `parameters` is a JSON schema whose
/// `properties` become the descriptor's parameters, in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub parameters: serde_json::Value,
}

impl ToolSchema {
    pub fn to_descriptor(&self) -> ActionDescriptor {
        ActionDescriptor::from_json_schema(&self.name, &self.description, &self.parameters)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_assistant: Option<HomeAssistantConfig>,

    #[serde(default)]
    pub music: MusicConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HomeAssistantConfig {
    /// Device lines formatted as `location,name,entity_id`
    #[serde(default)]
    pub devices: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MusicConfig {
    /// Known track names
    #[serde(default)]
    pub names: Vec<String>,
}

impl PluginsConfig {
    /// Configured device lines, empty when Home Assistant is not set up.
    pub fn devices(&self) -> Vec<String> {
        self.home_assistant
            .as_ref()
            .map(|ha| ha.devices.clone())
            .unwrap_or_default()
    }
}

impl AppConfig {
    /// Load `~/.voxintent/config.toml`, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_dir().join("config.toml"))?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Overlay environment variables read through `var`.
    ///
    /// The API key comes from the first set of `VOXINTENT_API_KEY`,
    /// `OPENAI_API_KEY`, `OPENROUTER_API_KEY`, and only when the file has none.
    /// `VOXINTENT_PROVIDER` and `VOXINTENT_MODEL` always win over the file.
    pub fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = API_KEY_VARS.iter().find_map(|name| var(name));
        }
        if let Some(provider) = var("VOXINTENT_PROVIDER") {
            self.default_provider = provider;
        }
        if let Some(model) = var("VOXINTENT_MODEL") {
            self.default_model = model;
        }
    }

    /// Parse and validate `path`. A missing file yields the defaults.
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

    /// `~/.voxintent`
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".voxintent")
    }

    /// Reject values that would break prompt building or caching.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.intent.cache_namespace.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "intent.cache_namespace must not be empty".into(),
            ));
        }

        let reserved = &self.intent.reserved;
        let names = [&reserved.continue_chat, &reserved.context_answer, &reserved.exit];
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "reserved action names must not be empty".into(),
            ));
        }
        if names[0] == names[1] || names[0] == names[2] || names[1] == names[2] {
            return Err(ConfigError::ValidationError(
                "reserved action names must be distinct".into(),
            ));
        }

        if self.cache.ttl_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "cache.ttl_secs must be positive; omit it to disable expiry".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            intent: IntentConfig::default(),
            cache: CacheConfig::default(),
            providers: HashMap::new(),
            actions: vec![],
            tools: vec![],
            plugins: PluginsConfig::default(),
        }
    }
}

/// Home directory, with a platform fallback when unset.
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

/// Why a config file could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Invalid TOML in {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}
