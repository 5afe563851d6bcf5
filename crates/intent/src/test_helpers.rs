//! Shared test helpers for the intent crate.

use async_trait::async_trait;
use std::sync::Mutex;
use voxintent_core::error::ProviderError;
use voxintent_core::message::Message;
use voxintent_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};

use crate::backend::IntentBackend;

/// A backend that returns scripted replies in order and records the prompts it saw.
///
/// Panics if called more times than replies were provided.
pub struct ScriptedBackend {
    replies: Mutex<Vec<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// `(system, user)` prompts of the last call.
    pub fn last_prompts(&self) -> Option<(String, String)> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl IntentBackend for ScriptedBackend {
    fn model_name(&self) -> &str {
        "scripted-model"
    }

    async fn classify(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let mut prompts = self.prompts.lock().unwrap();
        let replies = self.replies.lock().unwrap();
        let call = prompts.len();
        if call >= replies.len() {
            panic!("ScriptedBackend: no more replies (call #{call}, have {})", replies.len());
        }
        prompts.push((system_prompt.to_string(), user_prompt.to_string()));
        replies[call].clone()
    }
}

/// A provider that returns scripted completions in order.
pub struct ScriptedProvider {
    replies: Mutex<Vec<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let replies = self.replies.lock().unwrap();
        let call = requests.len();
        if call >= replies.len() {
            panic!("ScriptedProvider: no more replies (call #{call}, have {})", replies.len());
        }
        let model = request.model.clone();
        requests.push(request);

        replies[call].clone().map(|text| ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model,
        })
    }
}
