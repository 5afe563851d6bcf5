//! Pipeline orchestrator.
//!
//! One call to [`IntentClassifier::detect`] runs:
//!
//! ```text
//! CacheCheck ──hit──────────────────────────────────────────────► Done
//!     │ miss
//!     ▼
//! PromptBuild (memoized) → Invoke → Interpret ─valid─► CacheWrite ─► Done
//!                            │          └─degraded───────────────► Done
//!                            └─error──────────────────────────────► Err
//! ```
//!
//! The continue side effect is applied to the caller's dialogue once, after
//! a successful interpretation, and never on a cache hit.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use voxintent_cache::IntentCache;
use voxintent_core::action::ActionProvider;
use voxintent_core::catalog::{DeviceCatalog, MusicLibrary};
use voxintent_core::intent::{DecisionKind, IntentDecision, ReservedActions};
use voxintent_core::message::Dialogue;

use crate::backend::IntentBackend;
use crate::error::IntentError;
use crate::interpreter::{DegradedReason, Interpretation, ResponseInterpreter};
use crate::prompt::{
    CONTEXT_REPLY_INSTRUCTION, build_user_prompt, render_device_block, render_music_block,
};
use crate::prompt_cache::PromptCache;

/// How a [`Classification`] was produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Served from the cache; the backend was not called.
    Cached,
    /// Fresh backend decision, now cached.
    Classified,
    /// The backend reply was unusable; `text` is the continue fallback.
    Degraded(DegradedReason),
    /// No action provider attached; `text` is the continue fallback.
    Passthrough,
}

/// The result of classifying one utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Decision JSON for the caller. Always a valid `function_call` object.
    pub text: String,
    /// Parsed decision. `None` for degraded and passthrough results.
    pub decision: Option<IntentDecision>,
    pub outcome: Outcome,
}

impl Classification {
    pub fn is_degraded(&self) -> bool {
        matches!(self.outcome, Outcome::Degraded(_))
    }

    pub fn is_cached(&self) -> bool {
        self.outcome == Outcome::Cached
    }

    pub fn function_name(&self) -> Option<&str> {
        self.decision.as_ref().map(|d| d.function_name.as_str())
    }
}

/// Classifies utterances into intent decisions.
///
/// Shared across sessions; per-call state lives in the caller's [`Dialogue`].
pub struct IntentClassifier {
    backend: Option<Arc<dyn IntentBackend>>,
    actions: Option<Arc<dyn ActionProvider>>,
    devices: Option<Arc<dyn DeviceCatalog>>,
    music: Option<Arc<dyn MusicLibrary>>,
    cache: IntentCache,
    prompts: PromptCache,
    interpreter: ResponseInterpreter,
    history_count: usize,
}

impl IntentClassifier {
    /// A classifier with no backend and no actions. Attach both before use.
    pub fn new(cache: IntentCache) -> Self {
        Self {
            backend: None,
            actions: None,
            devices: None,
            music: None,
            cache,
            prompts: PromptCache::new(),
            interpreter: ResponseInterpreter::default(),
            history_count: 4,
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn IntentBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_actions(mut self, actions: Arc<dyn ActionProvider>) -> Self {
        self.actions = Some(actions);
        self
    }

    pub fn with_devices(mut self, devices: Arc<dyn DeviceCatalog>) -> Self {
        self.devices = Some(devices);
        self
    }

    pub fn with_music(mut self, music: Arc<dyn MusicLibrary>) -> Self {
        self.music = Some(music);
        self
    }

    /// Number of prior turns rendered into the user prompt.
    pub fn with_history_count(mut self, count: usize) -> Self {
        self.history_count = count;
        self
    }

    pub fn with_reserved(mut self, reserved: ReservedActions) -> Self {
        self.interpreter = ResponseInterpreter::new(reserved);
        self.prompts.invalidate();
        self
    }

    pub fn reserved(&self) -> &ReservedActions {
        self.interpreter.reserved()
    }

    pub fn history_count(&self) -> usize {
        self.history_count
    }

    /// Force the next classification to rebuild the system prompt.
    pub fn invalidate_prompt(&self) {
        self.prompts.invalidate();
    }

    /// The composed system prompt for the current catalog and context blocks.
    pub fn system_prompt(&self) -> String {
        let catalog = self
            .actions
            .as_ref()
            .map(|provider| provider.catalog())
            .unwrap_or_default();

        let mut extras = Vec::new();
        if let Some(block) = self.music.as_ref().and_then(|m| render_music_block(&m.titles())) {
            extras.push(block);
        }
        if let Some(block) = self.devices.as_ref().and_then(|d| render_device_block(&d.devices())) {
            extras.push(block);
        }

        self.prompts.get_or_build(&catalog, self.interpreter.reserved(), &extras)
    }

    /// Classify `utterance` for `session_id`.
    ///
    /// `dialogue` holds the prior turns, without the utterance itself. A
    /// continue decision strips tool and function turns from it.
    pub async fn detect(
        &self,
        session_id: &str,
        dialogue: &mut Dialogue,
        utterance: &str,
    ) -> Result<Classification, IntentError> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| IntentError::NotConfigured("no intent backend attached".into()))?;

        let preview: String = utterance.chars().take(20).collect();

        if self.actions.is_none() {
            debug!(session = session_id, "No action provider, passing through");
            return Ok(Classification {
                text: self.interpreter.reserved().fallback_json(),
                decision: None,
                outcome: Outcome::Passthrough,
            });
        }

        let total = Instant::now();

        let key = self.cache.key(session_id, utterance);
        if let Some(text) = self.cache.get(&key).await {
            let decision = match self.interpreter.interpret(&text) {
                Interpretation::Decided { decision, .. } => Some(decision),
                Interpretation::Degraded { reason, .. } => {
                    warn!(cache_key = %key, %reason, "Cached intent no longer parses");
                    None
                }
            };
            info!(
                session = session_id,
                utterance = %preview,
                elapsed_ms = total.elapsed().as_millis() as u64,
                "Intent cache hit"
            );
            return Ok(Classification {
                text,
                decision,
                outcome: Outcome::Cached,
            });
        }

        let system_prompt = self.system_prompt();
        let user_prompt = build_user_prompt(dialogue, utterance, self.history_count);
        let preprocess_ms = total.elapsed().as_millis() as u64;

        info!(
            session = session_id,
            model = backend.model_name(),
            utterance = %preview,
            "Classifying intent"
        );

        let invoke = Instant::now();
        let raw = backend
            .classify(&system_prompt, &user_prompt)
            .await
            .map_err(|e| {
                warn!(
                    model = backend.model_name(),
                    transient = e.is_transient(),
                    error = %e,
                    "Intent backend call failed"
                );
                IntentError::Backend(e)
            })?;
        let backend_ms = invoke.elapsed().as_millis() as u64;

        let classification = match self.interpreter.interpret(&raw) {
            Interpretation::Decided { text, decision, kind } => {
                if kind == DecisionKind::Continue {
                    let removed = dialogue.retain_conversational();
                    if removed > 0 {
                        debug!(removed, "Stripped tool turns for continue decision");
                    }
                }
                info!(
                    function = %decision.function_name,
                    arguments = %serde_json::Value::Object(decision.arguments.clone()),
                    "Intent recognized"
                );
                self.cache.set(&key, text.clone()).await;
                Classification {
                    text,
                    decision: Some(decision),
                    outcome: Outcome::Classified,
                }
            }
            Interpretation::Degraded { text, reason } => {
                error!(
                    model = backend.model_name(),
                    %reason,
                    raw = %raw,
                    "Unusable intent reply, falling back to continue"
                );
                Classification {
                    text,
                    decision: None,
                    outcome: Outcome::Degraded(reason),
                }
            }
        };

        info!(
            preprocess_ms,
            backend_ms,
            total_ms = total.elapsed().as_millis() as u64,
            "Intent detection finished"
        );
        Ok(classification)
    }

    /// Ask the backend for a short spoken reply grounded in `context`.
    ///
    /// Used after a context-answer decision.
    pub async fn reply_from_context(&self, context: &str, utterance: &str) -> Result<String, IntentError> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| IntentError::NotConfigured("no intent backend attached".into()))?;

        let user_prompt = format!("{CONTEXT_REPLY_INSTRUCTION}{utterance}");
        let reply = backend.classify(context, &user_prompt).await?;
        Ok(reply.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedBackend;
    use voxintent_cache::InMemoryCache;
    use voxintent_core::action::{ActionDescriptor, ActionRegistry};
    use voxintent_core::cache::CacheNamespace;
    use voxintent_core::message::{Message, Role};

    fn cache() -> IntentCache {
        IntentCache::new(Arc::new(InMemoryCache::new()), CacheNamespace::intent())
    }

    fn registry() -> Arc<ActionRegistry> {
        let mut registry = ActionRegistry::new();
        registry.register(
            ActionDescriptor::new("play_music", "Play a song").with_parameter(
                "song_name",
                "string",
                "Song to play",
            ),
        );
        Arc::new(registry)
    }

    fn classifier(backend: Arc<ScriptedBackend>) -> IntentClassifier {
        IntentClassifier::new(cache())
            .with_backend(backend)
            .with_actions(registry())
    }

    #[tokio::test]
    async fn missing_backend_is_not_configured() {
        let classifier = IntentClassifier::new(cache()).with_actions(registry());
        let err = classifier
            .detect("s1", &mut Dialogue::new(), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, IntentError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn missing_actions_pass_through() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let classifier = IntentClassifier::new(cache()).with_backend(backend.clone());
        let result = classifier
            .detect("s1", &mut Dialogue::new(), "hello")
            .await
            .unwrap();
        assert_eq!(result.outcome, Outcome::Passthrough);
        assert_eq!(result.text, r#"{"function_call":{"name":"continue_chat"}}"#);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn invoke_decision_is_cached_and_returned() {
        let reply = r#"{"function_call":{"name":"play_music","arguments":{"song_name":"Canon"}}}"#;
        let backend = Arc::new(ScriptedBackend::replying(reply));
        let classifier = classifier(backend.clone());

        let first = classifier
            .detect("s1", &mut Dialogue::new(), "play canon")
            .await
            .unwrap();
        assert_eq!(first.outcome, Outcome::Classified);
        assert_eq!(first.text, reply);
        assert_eq!(first.function_name(), Some("play_music"));

        let second = classifier
            .detect("s1", &mut Dialogue::new(), "play canon")
            .await
            .unwrap();
        assert!(second.is_cached());
        assert_eq!(second.text, reply);
        assert_eq!(second.decision, first.decision);
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn continue_strips_tool_turns_once() {
        let backend = Arc::new(ScriptedBackend::replying(
            r#"{"function_call":{"name":"continue_chat"}}"#,
        ));
        let classifier = classifier(backend);

        let mut dialogue = Dialogue::from(vec![
            Message::user("what's the weather"),
            Message::new(Role::Function, "{\"temp\":21}"),
            Message::assistant("21 degrees"),
            Message::tool("done"),
        ]);
        let result = classifier.detect("s1", &mut dialogue, "thanks").await.unwrap();

        assert_eq!(result.outcome, Outcome::Classified);
        let roles: Vec<Role> = dialogue.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn context_answer_leaves_dialogue_alone() {
        let backend = Arc::new(ScriptedBackend::replying(
            r#"{"function_call":{"name":"result_for_context"}}"#,
        ));
        let classifier = classifier(backend);

        let mut dialogue = Dialogue::from(vec![Message::user("hi"), Message::tool("result")]);
        classifier.detect("s1", &mut dialogue, "what did it say").await.unwrap();
        assert_eq!(dialogue.len(), 2);
    }

    #[tokio::test]
    async fn degraded_reply_is_not_cached_and_leaves_dialogue() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("I cannot help with that".into()),
            Ok(r#"{"function_call":{"name":"continue_chat"}}"#.into()),
        ]));
        let classifier = classifier(backend.clone());

        let mut dialogue = Dialogue::from(vec![Message::user("hi"), Message::tool("x")]);
        let first = classifier.detect("s1", &mut dialogue, "hm").await.unwrap();
        assert!(first.is_degraded());
        assert!(first.decision.is_none());
        assert_eq!(first.text, r#"{"function_call":{"name":"continue_chat"}}"#);
        assert_eq!(dialogue.len(), 2);

        let second = classifier.detect("s1", &mut dialogue, "hm").await.unwrap();
        assert_eq!(second.outcome, Outcome::Classified);
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn user_prompt_uses_history_window() {
        let backend = Arc::new(ScriptedBackend::replying(
            r#"{"function_call":{"name":"continue_chat"}}"#,
        ));
        let classifier = classifier(backend.clone()).with_history_count(2);

        let mut dialogue = Dialogue::from(vec![
            Message::user("one"),
            Message::assistant("two"),
            Message::user("three"),
        ]);
        classifier.detect("s1", &mut dialogue, "four").await.unwrap();

        let (_, user) = backend.last_prompts().unwrap();
        assert_eq!(user, "current dialogue:\nassistant: two\nuser: three\nuser: four\n");
    }

    #[tokio::test]
    async fn system_prompt_carries_context_blocks_in_order() {
        let backend = Arc::new(ScriptedBackend::replying(
            r#"{"function_call":{"name":"continue_chat"}}"#,
        ));
        let classifier = classifier(backend.clone())
            .with_devices(Arc::new(vec!["Bathroom,Light,light.bath".to_string()]))
            .with_music(Arc::new(vec!["Canon".to_string()]));

        classifier.detect("s1", &mut Dialogue::new(), "hi").await.unwrap();

        let (system, _) = backend.last_prompts().unwrap();
        let music = system.find("<musicNames>").unwrap();
        let devices = system.find("Bathroom,Light,light.bath").unwrap();
        assert!(music < devices);
        assert!(system.contains("Function: play_music"));
    }

    #[tokio::test]
    async fn reply_from_context_uses_context_as_system_prompt() {
        let backend = Arc::new(ScriptedBackend::replying("  It is 21 degrees.  "));
        let classifier = classifier(backend.clone());

        let reply = classifier
            .reply_from_context("The weather is 21 degrees.", "how warm is it")
            .await
            .unwrap();
        assert_eq!(reply, "It is 21 degrees.");

        let (system, user) = backend.last_prompts().unwrap();
        assert_eq!(system, "The weather is 21 degrees.");
        assert!(user.ends_with("how warm is it"));
    }

    #[tokio::test]
    async fn custom_reserved_names_flow_through() {
        let backend = Arc::new(ScriptedBackend::replying("no json"));
        let classifier = classifier(backend).with_reserved(ReservedActions {
            continue_chat: "keep_talking".into(),
            ..ReservedActions::default()
        });
        let result = classifier.detect("s1", &mut Dialogue::new(), "x").await.unwrap();
        assert_eq!(result.text, r#"{"function_call":{"name":"keep_talking"}}"#);
        assert!(classifier.system_prompt().contains("keep_talking"));
    }
}
