//! Intent wire types.
//!
//! The only wire format of the classifier is the decision object
//! `{"function_call": {"name": <string>, "arguments": <object>}}`.

use serde::{Deserialize, Serialize};

/// The top-level decision object emitted by the backend.
///
/// Unknown top-level fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentEnvelope {
    pub function_call: FunctionCall,
}

/// The `function_call` member of the decision object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,

    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

impl IntentEnvelope {
    /// A decision naming `name` with no arguments.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            function_call: FunctionCall {
                name: name.into(),
                arguments: serde_json::Map::new(),
            },
        }
    }

    /// Compact JSON text, e.g. `{"function_call":{"name":"continue_chat"}}`.
    pub fn to_json(&self) -> String {
        // A struct of strings and a JSON map always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// The structured decision handed to the caller that executes the action.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentDecision {
    pub function_name: String,
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

/// How a decision affects the dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionKind {
    /// Answer from existing conversation context; no side effect.
    ContextAnswer,
    /// Plain conversation; tool traffic is stripped from the dialogue.
    Continue,
    /// Any other action; execution is left to the caller.
    Invoke,
}

/// Names of the reserved actions the prompt and interpreter agree on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedActions {
    /// "No special action": carry on chatting
    #[serde(default = "default_continue")]
    pub continue_chat: String,

    /// Answer from the conversation context
    #[serde(default = "default_context_answer")]
    pub context_answer: String,

    /// Leave the conversation
    #[serde(default = "default_exit")]
    pub exit: String,
}

fn default_continue() -> String {
    "continue_chat".into()
}
fn default_context_answer() -> String {
    "result_for_context".into()
}
fn default_exit() -> String {
    "handle_exit_intent".into()
}

impl Default for ReservedActions {
    fn default() -> Self {
        Self {
            continue_chat: default_continue(),
            context_answer: default_context_answer(),
            exit: default_exit(),
        }
    }
}

impl ReservedActions {
    /// Classify an action name for side-effect purposes.
    pub fn kind_of(&self, name: &str) -> DecisionKind {
        if name == self.context_answer {
            DecisionKind::ContextAnswer
        } else if name == self.continue_chat {
            DecisionKind::Continue
        } else {
            DecisionKind::Invoke
        }
    }

    /// The fixed fallback decision text.
    pub fn fallback_json(&self) -> String {
        IntentEnvelope::named(&self.continue_chat).to_json()
    }
}
