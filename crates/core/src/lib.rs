//! # voxintent core
//!
//! Domain types, traits, and error definitions for the voxintent intent
//! classifier. This crate does no I/O; it defines the domain model that the
//! provider, cache, and intent crates implement against.
//!
//! ## Seams
//!
//! Every external collaborator of the classification pipeline is a trait here:
//! - [`Provider`]: the text-completion backend
//! - [`ActionProvider`]: the catalog of selectable actions
//! - [`DeviceCatalog`] / [`MusicLibrary`]: optional domain context
//! - [`CacheStore`]: the shared intent cache

pub mod action;
pub mod cache;
pub mod catalog;
pub mod error;
pub mod intent;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use action::{ActionDescriptor, ActionProvider, ActionRegistry, ParameterSpec};
pub use cache::{CacheNamespace, CacheStore};
pub use catalog::{DeviceCatalog, MusicLibrary};
pub use error::{CacheError, Error, ProviderError, Result};
pub use intent::{DecisionKind, FunctionCall, IntentDecision, IntentEnvelope, ReservedActions};
pub use message::{Dialogue, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
