//! Memoized system prompt, keyed by a fingerprint of everything it is built from.

use sha2::{Digest, Sha256};
use std::sync::{PoisonError, RwLock};
use tracing::debug;
use voxintent_core::action::ActionDescriptor;
use voxintent_core::intent::ReservedActions;

use crate::prompt::{build_system_prompt, compose_context};

#[derive(Debug, Clone)]
struct PromptState {
    fingerprint: String,
    template: String,
    composed: String,
}

/// Holds the last built system prompt.
///
/// A lookup whose fingerprint differs from the stored one rebuilds. Two
/// callers racing on the first build both build the same text; the last
/// write wins.
#[derive(Debug, Default)]
pub struct PromptCache {
    state: RwLock<Option<PromptState>>,
}

impl PromptCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The composed system prompt for this catalog and context blocks.
    pub fn get_or_build(
        &self,
        actions: &[ActionDescriptor],
        reserved: &ReservedActions,
        extras: &[String],
    ) -> String {
        let fingerprint = fingerprint(actions, reserved, extras);

        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(state) = state.as_ref().filter(|s| s.fingerprint == fingerprint) {
                return state.composed.clone();
            }
        }

        let template = build_system_prompt(actions, reserved);
        let composed = compose_context(&template, extras);
        debug!(
            actions = actions.len(),
            context_blocks = extras.len(),
            fingerprint = &fingerprint[..12],
            "Built system prompt"
        );

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = Some(PromptState {
            fingerprint,
            template,
            composed: composed.clone(),
        });
        composed
    }

    /// The base prompt (without context blocks) from the last build.
    pub fn template(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.template.clone())
    }

    pub fn is_built(&self) -> bool {
        self.state.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Drop the stored prompt; the next lookup rebuilds.
    pub fn invalidate(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn fingerprint(actions: &[ActionDescriptor], reserved: &ReservedActions, extras: &[String]) -> String {
    let mut hasher = Sha256::new();
    // Serializing plain strings and vectors cannot fail.
    hasher.update(serde_json::to_vec(actions).unwrap_or_default());
    hasher.update(serde_json::to_vec(reserved).unwrap_or_default());
    for extra in extras {
        hasher.update((extra.len() as u64).to_le_bytes());
        hasher.update(extra.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions() -> Vec<ActionDescriptor> {
        vec![ActionDescriptor::new("play_music", "Play a song").with_parameter(
            "song_name",
            "string",
            "Song to play",
        )]
    }

    #[test]
    fn builds_once_for_same_catalog() {
        let cache = PromptCache::new();
        assert!(!cache.is_built());

        let first = cache.get_or_build(&actions(), &ReservedActions::default(), &[]);
        assert!(cache.is_built());
        let second = cache.get_or_build(&actions(), &ReservedActions::default(), &[]);
        assert_eq!(first, second);
        assert!(first.contains("Function: play_music"));
    }

    #[test]
    fn concurrent_first_build_agrees() {
        let cache = PromptCache::new();
        let catalog = actions();
        let reserved = ReservedActions::default();
        let extras = vec!["<musicNames>\nCanon\n</musicNames>".to_string()];
        let barrier = std::sync::Barrier::new(8);

        let built: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        cache.get_or_build(&catalog, &reserved, &extras)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(built.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(cache.get_or_build(&catalog, &reserved, &extras), built[0]);
        assert!(cache.template().is_some_and(|t| built[0].starts_with(&t)));
    }

    #[test]
    fn catalog_change_rebuilds() {
        let cache = PromptCache::new();
        let before = cache.get_or_build(&actions(), &ReservedActions::default(), &[]);

        let mut changed = actions();
        changed.push(ActionDescriptor::new("get_weather", "Weather lookup"));
        let after = cache.get_or_build(&changed, &ReservedActions::default(), &[]);

        assert_ne!(before, after);
        assert!(after.contains("Function: get_weather"));
    }

    #[test]
    fn context_blocks_are_appended_after_template() {
        let cache = PromptCache::new();
        let composed = cache.get_or_build(
            &actions(),
            &ReservedActions::default(),
            &["<musicNames>\nCanon\n</musicNames>".to_string()],
        );
        let template = cache.template().unwrap();
        assert!(composed.starts_with(&template));
        assert!(composed.ends_with("</musicNames>"));
    }

    #[test]
    fn invalidate_clears_state() {
        let cache = PromptCache::new();
        cache.get_or_build(&actions(), &ReservedActions::default(), &[]);
        cache.invalidate();
        assert!(!cache.is_built());
        assert!(cache.template().is_none());
    }

    #[test]
    fn fingerprint_separates_context_boundaries() {
        let reserved = ReservedActions::default();
        let a = fingerprint(&[], &reserved, &["ab".into(), "c".into()]);
        let b = fingerprint(&[], &reserved, &["a".into(), "bc".into()]);
        assert_ne!(a, b);
    }
}
