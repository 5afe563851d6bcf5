//! OpenAI-compatible chat completions.
//!
//! Works with OpenAI, OpenRouter, Ollama, vLLM, llama.cpp, DashScope and
//! any endpoint exposing `POST {base}/chat/completions`. Requests are
//! always non-streaming.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use voxintent_core::error::ProviderError;
use voxintent_core::message::Message;
use voxintent_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// A provider speaking the OpenAI chat-completions protocol.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        // Only fails when the TLS backend cannot initialise.
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self::new("openrouter", "https://openrouter.ai/api/v1", api_key)
    }

    /// Local Ollama; no key required.
    pub fn ollama(base_url: Option<&str>) -> Self {
        Self::new("ollama", base_url.unwrap_or("http://localhost:11434/v1"), "")
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Attach the bearer token when one is configured.
    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.api_key)
        }
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let body = ChatRequest::from_request(&request);
        debug!(
            provider = %self.name,
            model = %request.model,
            messages = body.messages.len(),
            "Sending chat completion"
        );

        let response = self
            .authorize(self.client.post(self.endpoint("chat/completions")))
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();
            warn!(provider = %self.name, status = status.as_u16(), body = %text, "Chat completion rejected");
            return Err(status_error(status, text, &request.model, retry_after));
        }

        let completion: ChatResponse = response.json().await.map_err(|e| ProviderError::ApiError {
            status_code: status.as_u16(),
            message: format!("unreadable completion body: {e}"),
        })?;

        completion.into_response(request.model)
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let response = self
            .authorize(self.client.get(self.endpoint("models")))
            .send()
            .await
            .map_err(send_error)?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let list: ModelList = response
            .json()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let response = self
            .authorize(self.client.get(self.endpoint("models")))
            .send()
            .await
            .map_err(send_error)?;
        Ok(response.status().is_success())
    }
}

fn send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

/// Map a non-success HTTP status onto a provider error.
fn status_error(status: StatusCode, body: String, model: &str, retry_after: Option<u64>) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::AuthenticationFailed(format!("{status}: check the API key"))
        }
        StatusCode::NOT_FOUND => ProviderError::ModelNotFound(model.to_string()),
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message: body,
        },
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

impl<'a> ChatRequest<'a> {
    fn from_request(request: &'a ProviderRequest) -> Self {
        Self {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl ChatResponse {
    /// First choice as an assistant message. Servers that omit `model` get the requested one.
    fn into_response(self, requested_model: String) -> Result<ProviderResponse, ProviderError> {
        let choice = self.choices.into_iter().next().ok_or_else(|| ProviderError::ApiError {
            status_code: 200,
            message: "completion has no choices".into(),
        })?;

        Ok(ProviderResponse {
            message: Message::assistant(choice.message.content.unwrap_or_default()),
            usage: self.usage.map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            model: self.model.unwrap_or(requested_model),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}
