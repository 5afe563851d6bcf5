//! Intent classification for voxintent.
//!
//! Turns one user utterance into a `function_call` decision:
//!
//! 1. **Cache check** keyed by `(session, utterance)`
//! 2. **Prompt build** from the action catalog and context blocks (memoized)
//! 3. **Invoke** the backend once
//! 4. **Interpret** the reply, falling back to "continue" when it is unusable
//! 5. **Cache write** for usable replies only

pub mod backend;
pub mod error;
pub mod interpreter;
pub mod pipeline;
pub mod prompt;
pub mod prompt_cache;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use backend::{IntentBackend, ProviderBackend};
pub use error::IntentError;
pub use interpreter::{DegradedReason, Interpretation, ResponseInterpreter};
pub use pipeline::{Classification, IntentClassifier, Outcome};
pub use prompt::{build_system_prompt, build_user_prompt, compose_context};
pub use prompt_cache::PromptCache;
