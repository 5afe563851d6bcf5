//! Action descriptors: the capabilities offered to the backend for selection.
//!
//! An action is a named function with a description and typed parameters.
//! Descriptors are only rendered into prompt text; executing the chosen
//! action is the caller's business.

use serde::{Deserialize, Serialize};

/// A single parameter of an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name
    pub name: String,

    /// JSON type name ("string", "integer", "boolean", ...)
    #[serde(rename = "type", default)]
    pub kind: String,

    /// What the parameter means
    #[serde(default)]
    pub description: String,
}

/// An immutable description of a selectable action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionDescriptor {
    /// The action name the backend must echo back
    pub name: String,

    /// Description of what the action does
    #[serde(default)]
    pub description: String,

    /// Parameters in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterSpec>,
}

impl ActionDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Builder-style parameter declaration.
    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.parameters.push(ParameterSpec {
            name: name.into(),
            kind: kind.into(),
            description: description.into(),
        });
        self
    }

    /// Convert a JSON-schema tool definition into a descriptor.
    ///
    /// Reads `properties.<name>.type` and `properties.<name>.description`;
    /// anything else in the schema is ignored. A schema without properties
    /// yields a descriptor without parameters.
    pub fn from_json_schema(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: &serde_json::Value,
    ) -> Self {
        let parameters = schema
            .get("properties")
            .and_then(|p| p.as_object())
            .map(|props| {
                props
                    .iter()
                    .map(|(param_name, info)| ParameterSpec {
                        name: param_name.clone(),
                        kind: info["type"].as_str().unwrap_or_default().to_string(),
                        description: info["description"].as_str().unwrap_or_default().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Source of the action catalog.
///
/// `functions()` is the primary catalog; `available_tools()` is an optional
/// secondary registry (e.g. remote tool servers) merged after it.
pub trait ActionProvider: Send + Sync {
    fn functions(&self) -> Vec<ActionDescriptor>;

    fn available_tools(&self) -> Vec<ActionDescriptor> {
        Vec::new()
    }

    /// Primary functions followed by secondary tools, in provider order.
    fn catalog(&self) -> Vec<ActionDescriptor> {
        let mut actions = self.functions();
        actions.extend(self.available_tools());
        actions
    }
}

/// An ordered registry of action descriptors.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: Vec<ActionDescriptor>,
    tools: Vec<ActionDescriptor>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action. An existing action with the same name is replaced in place.
    pub fn register(&mut self, action: ActionDescriptor) {
        upsert(&mut self.actions, action);
    }

    /// Register a secondary tool, same replacement rule as [`register`](Self::register).
    pub fn register_tool(&mut self, tool: ActionDescriptor) {
        upsert(&mut self.tools, tool);
    }

    /// Get an action or tool by name.
    pub fn get(&self, name: &str) -> Option<&ActionDescriptor> {
        self.actions
            .iter()
            .chain(self.tools.iter())
            .find(|a| a.name == name)
    }

    /// List all registered names, actions first.
    pub fn names(&self) -> Vec<&str> {
        self.actions
            .iter()
            .chain(self.tools.iter())
            .map(|a| a.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len() + self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn upsert(list: &mut Vec<ActionDescriptor>, action: ActionDescriptor) {
    match list.iter_mut().find(|a| a.name == action.name) {
        Some(existing) => *existing = action,
        None => list.push(action),
    }
}

impl FromIterator<ActionDescriptor> for ActionRegistry {
    fn from_iter<I: IntoIterator<Item = ActionDescriptor>>(iter: I) -> Self {
        let mut registry = Self::new();
        for action in iter {
            registry.register(action);
        }
        registry
    }
}

impl ActionProvider for ActionRegistry {
    fn functions(&self) -> Vec<ActionDescriptor> {
        self.actions.clone()
    }

    fn available_tools(&self) -> Vec<ActionDescriptor> {
        self.tools.clone()
    }
}
