//! Response interpretation: raw backend text in, decision or safe fallback out.
//!
//! Steps:
//!
//! 1. Trim the reply and scan it for complete `{...}` spans
//! 2. Take the first span that is valid JSON (the whole text when there is
//!    no span at all)
//! 3. Require `function_call.name`; `arguments` defaults to `{}`
//! 4. Classify the name against the reserved actions
//!
//! Any failure in 2–3 yields the continue fallback marked as degraded, so
//! callers can tell backend misbehaviour apart from a genuine continue.

use serde_json::{Map, Value};
use voxintent_core::intent::{DecisionKind, IntentDecision, ReservedActions};

use crate::scan::object_spans;

/// Why a reply could not be used as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum DegradedReason {
    /// No valid JSON in the reply.
    Malformed { detail: String },
    /// Valid JSON, but not a decision object. `name` is kept for diagnostics
    /// when one could be found.
    SchemaViolation { name: Option<String>, detail: String },
}

impl std::fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { detail } => write!(f, "malformed response: {detail}"),
            Self::SchemaViolation { name: Some(name), detail } => {
                write!(f, "schema violation (name: {name}): {detail}")
            }
            Self::SchemaViolation { name: None, detail } => write!(f, "schema violation: {detail}"),
        }
    }
}

/// Result of interpreting one backend reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    /// A usable decision. `text` is the extracted JSON exactly as the backend wrote it.
    Decided {
        text: String,
        decision: IntentDecision,
        kind: DecisionKind,
    },
    /// The reply was unusable; `text` is the fixed fallback.
    Degraded { text: String, reason: DegradedReason },
}

impl Interpretation {
    pub fn text(&self) -> &str {
        match self {
            Self::Decided { text, .. } | Self::Degraded { text, .. } => text,
        }
    }
}

/// Turns backend replies into [`Interpretation`]s.
#[derive(Debug, Clone, Default)]
pub struct ResponseInterpreter {
    reserved: ReservedActions,
}

impl ResponseInterpreter {
    pub fn new(reserved: ReservedActions) -> Self {
        Self { reserved }
    }

    pub fn reserved(&self) -> &ReservedActions {
        &self.reserved
    }

    pub fn interpret(&self, raw: &str) -> Interpretation {
        let trimmed = raw.trim();

        let (candidate, value) = match parse_candidate(trimmed) {
            Ok(found) => found,
            Err(detail) => return self.degraded(DegradedReason::Malformed { detail }),
        };

        match decision_from_value(&value) {
            Ok(decision) => {
                let kind = self.reserved.kind_of(&decision.function_name);
                Interpretation::Decided {
                    text: candidate.to_string(),
                    decision,
                    kind,
                }
            }
            Err(reason) => self.degraded(reason),
        }
    }

    fn degraded(&self, reason: DegradedReason) -> Interpretation {
        Interpretation::Degraded {
            text: self.reserved.fallback_json(),
            reason,
        }
    }
}

/// Pick the first JSON-valid object span, or the whole text when there are no spans.
fn parse_candidate(trimmed: &str) -> Result<(&str, Value), String> {
    let mut first_error = None;
    let mut saw_span = false;

    for span in object_spans(trimmed) {
        saw_span = true;
        match serde_json::from_str::<Value>(span) {
            Ok(value) => return Ok((span, value)),
            Err(e) => {
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
    }

    if saw_span {
        return Err(first_error.unwrap_or_default());
    }

    serde_json::from_str::<Value>(trimmed)
        .map(|value| (trimmed, value))
        .map_err(|e| e.to_string())
}

fn decision_from_value(value: &Value) -> Result<IntentDecision, DegradedReason> {
    let Some(call) = value.get("function_call") else {
        return Err(DegradedReason::SchemaViolation {
            name: value.get("name").and_then(Value::as_str).map(String::from),
            detail: "missing \"function_call\"".into(),
        });
    };

    let Some(call) = call.as_object() else {
        return Err(DegradedReason::SchemaViolation {
            name: call.as_str().map(String::from),
            detail: "\"function_call\" is not an object".into(),
        });
    };

    let Some(name) = call.get("name").and_then(Value::as_str) else {
        return Err(DegradedReason::SchemaViolation {
            name: None,
            detail: "\"function_call.name\" is missing or not a string".into(),
        });
    };

    let arguments = match call.get("arguments") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        // Some backends send OpenAI-style stringified arguments.
        Some(Value::String(s)) if s.trim().is_empty() => Map::new(),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => map,
            _ => {
                return Err(DegradedReason::SchemaViolation {
                    name: Some(name.to_string()),
                    detail: "\"arguments\" string is not a JSON object".into(),
                });
            }
        },
        Some(_) => {
            return Err(DegradedReason::SchemaViolation {
                name: Some(name.to_string()),
                detail: "\"arguments\" is not an object".into(),
            });
        }
    };

    Ok(IntentDecision {
        function_name: name.to_string(),
        arguments,
    })
}
