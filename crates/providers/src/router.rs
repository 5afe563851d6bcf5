//! Config-driven provider selection.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;
use voxintent_config::AppConfig;
use voxintent_core::provider::Provider;

use crate::openai_compat::OpenAiCompatProvider;

/// Named providers plus the name of the default one.
pub struct ProviderRouter {
    providers: BTreeMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: BTreeMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider, replacing any previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.get(&self.default_provider)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}

/// Build one OpenAI-compatible provider per `[providers.*]` entry, plus the default.
///
/// Entries without `api_url` need a well-known name; unknown ones are
/// skipped with a warning.
pub fn build_from_config(config: &AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);

    let mut names: Vec<&String> = config.providers.keys().collect();
    if !config.providers.contains_key(&config.default_provider) {
        names.push(&config.default_provider);
    }

    for name in names {
        let Some(base_url) = base_url_for(config, name) else {
            warn!(provider = %name, "No api_url and not a known provider, skipping");
            continue;
        };
        let api_key = api_key_for(config, name).unwrap_or_default();

        router.register(name.clone(), Arc::new(OpenAiCompatProvider::new(name, base_url, api_key)));
    }

    router
}

/// Model for the default provider: its own `default_model` if set, else the global one.
pub fn default_model(config: &AppConfig) -> String {
    config
        .providers
        .get(&config.default_provider)
        .and_then(|p| p.default_model.clone())
        .unwrap_or_else(|| config.default_model.clone())
}

/// Key sent to `provider`: its own `api_key` if set, else the shared one.
pub fn api_key_for(config: &AppConfig, provider: &str) -> Option<String> {
    config
        .providers
        .get(provider)
        .and_then(|p| p.api_key.clone())
        .or_else(|| config.api_key.clone())
}

/// Endpoint of `provider`: its own `api_url` if set, else the well-known one.
pub fn base_url_for(config: &AppConfig, provider: &str) -> Option<String> {
    config
        .providers
        .get(provider)
        .and_then(|p| p.api_url.clone())
        .or_else(|| known_base_url(provider).map(String::from))
}

/// True when the default provider is remote and no key resolves for it.
///
/// Loopback endpoints (Ollama, vLLM, llama.cpp on localhost) run without a key.
pub fn missing_api_key(config: &AppConfig) -> bool {
    let provider = &config.default_provider;
    if base_url_for(config, provider).is_some_and(|url| is_loopback(&url)) {
        return false;
    }
    api_key_for(config, provider).is_none_or(|key| key.trim().is_empty())
}

fn is_loopback(url: &str) -> bool {
    let authority = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = match authority.strip_prefix('[') {
        Some(v6) => v6.split(']').next().unwrap_or_default(),
        None => authority.split(['/', ':']).next().unwrap_or_default(),
    };
    host.eq_ignore_ascii_case("localhost") || host == "::1" || host.starts_with("127.")
}

fn known_base_url(provider: &str) -> Option<&'static str> {
    Some(match provider {
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "qwen" | "dashscope" => "https://dashscope.aliyuncs.com/compatible-mode/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    })
}
