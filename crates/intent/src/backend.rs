//! Backend invoker: one complete text reply per `(system, user)` prompt pair.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use voxintent_core::error::ProviderError;
use voxintent_core::message::Message;
use voxintent_core::provider::{Provider, ProviderRequest};

/// The text-completion capability the pipeline classifies with.
///
/// No retries and no streaming. Timeouts belong to the implementation.
#[async_trait]
pub trait IntentBackend: Send + Sync {
    /// Model identifier, for logs.
    fn model_name(&self) -> &str;

    /// Send the two prompts and return the raw reply text.
    async fn classify(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError>;
}

/// [`IntentBackend`] over any chat-completion [`Provider`].
pub struct ProviderBackend {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ProviderBackend {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.1,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

#[async_trait]
impl IntentBackend for ProviderBackend {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn classify(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let request = ProviderRequest::new(
            &self.model,
            vec![Message::system(system_prompt), Message::user(user_prompt)],
        )
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens);

        let response = self.provider.complete(request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                provider = self.provider.name(),
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Backend replied"
            );
        }
        Ok(response.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedProvider;
    use voxintent_core::message::Role;

    #[tokio::test]
    async fn sends_system_then_user_message() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok("{}".into())]));
        let backend = ProviderBackend::new(provider.clone(), "gpt-4o-mini")
            .with_temperature(0.2)
            .with_max_tokens(128);

        let reply = backend.classify("SYSTEM", "USER").await.unwrap();
        assert_eq!(reply, "{}");

        let request = provider.last_request().unwrap();
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.max_tokens, Some(128));
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, "SYSTEM");
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(request.messages[1].content, "USER");
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::RateLimited {
            retry_after_secs: 5,
        })]));
        let backend = ProviderBackend::new(provider.clone(), "m");
        let err = backend.classify("s", "u").await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { .. }));
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn exposes_names() {
        let backend = ProviderBackend::new(Arc::new(ScriptedProvider::new(vec![])), "qwen2.5:7b");
        assert_eq!(backend.model_name(), "qwen2.5:7b");
        assert_eq!(backend.provider_name(), "scripted");
    }
}
