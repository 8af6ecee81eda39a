use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute recording the devfile an entity was imported from
pub const IMPORT_SOURCE_ATTRIBUTE: &str = "api.devfile.io/imported-from";

/// Attribute recording the parent devfile whose overrides touched an entity
pub const PARENT_OVERRIDE_ATTRIBUTE: &str = "api.devfile.io/parent-override-from";

/// Attribute recording the plugin whose overrides touched an entity
pub const PLUGIN_OVERRIDE_ATTRIBUTE: &str = "api.devfile.io/plugin-override-from";

/// Free-form key/value bag attached to commands, components and projects
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, Value>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Value of `key` rendered as text; strings are unquoted, anything else is JSON
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.0.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
