pub mod classify;
pub mod config_cmd;
pub mod doctor;
pub mod prompt;

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use voxintent_cache::{InMemoryCache, IntentCache, NoopCache};
use voxintent_config::{AppConfig, CacheBackend};
use voxintent_core::action::ActionRegistry;
use voxintent_core::cache::{CacheNamespace, CacheStore};
use voxintent_intent::{IntentClassifier, ProviderBackend};

/// Build the cache store named by `config.cache.backend`.
pub fn build_store(config: &AppConfig) -> Arc<dyn CacheStore> {
    match config.cache.backend {
        CacheBackend::None => Arc::new(NoopCache),
        CacheBackend::Memory => {
            let mut store = InMemoryCache::new();
            if let Some(ttl) = config.cache.ttl_secs {
                store = store.with_ttl(Duration::from_secs(ttl));
            }
            if let Some(max) = config.cache.max_entries {
                store = store.with_max_entries(max);
            }
            Arc::new(store)
        }
    }
}

/// Everything but the backend: catalog, context blocks, cache, reserved names.
pub fn build_classifier(config: &AppConfig) -> IntentClassifier {
    let store = build_store(config);
    debug!(store = store.name(), "Intent cache ready");

    let mut registry: ActionRegistry = config.actions.iter().cloned().collect();
    for tool in &config.tools {
        registry.register_tool(tool.to_descriptor());
    }
    let mut classifier = IntentClassifier::new(IntentCache::new(
        store,
        CacheNamespace::new(&config.intent.cache_namespace),
    ))
    .with_actions(Arc::new(registry))
    .with_history_count(config.intent.history_count)
    .with_reserved(config.intent.reserved.clone());

    let devices = config.plugins.devices();
    if !devices.is_empty() {
        classifier = classifier.with_devices(Arc::new(devices));
    }
    if !config.plugins.music.names.is_empty() {
        classifier = classifier.with_music(Arc::new(config.plugins.music.names.clone()));
    }

    classifier
}

/// The default provider wrapped as an intent backend.
pub fn build_backend(config: &AppConfig) -> Option<ProviderBackend> {
    let router = voxintent_providers::router::build_from_config(config);
    let provider = router.default()?;
    let model = voxintent_providers::router::default_model(config);
    Some(
        ProviderBackend::new(provider, model)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens),
    )
}
