// ABOUTME: Workload configuration mapping supplied by the platform.
// ABOUTME: Validates required keys before any reconciliation work starts.

use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Keys that must hold a non-empty value.
pub const REQUIRED_SETTINGS: [&str; 1] = ["image"];

/// Errors from validating the workload configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing configuration: {}", join(.0))]
    Missing(NonEmpty<String>),

    #[error("configuration key {key} must be a string")]
    NotAString { key: String },
}

fn join(keys: &NonEmpty<String>) -> String {
    keys.iter().cloned().collect::<Vec<_>>().join(", ")
}

/// The raw configuration mapping as reported by the platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    values: BTreeMap<String, Value>,
}

/// Configuration that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    image: String,
}

impl ValidatedConfig {
    /// The configured image reference, not yet resolved.
    pub fn image(&self) -> &str {
        &self.image
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, returning the updated mapping.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::from)
    }

    /// Load a YAML or JSON file (JSON parses as YAML).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Check that every required key holds a non-empty value.
    pub fn validate(&self) -> std::result::Result<ValidatedConfig, ConfigError> {
        let missing: Vec<String> = REQUIRED_SETTINGS
            .iter()
            .filter(|key| !self.values.get(**key).is_some_and(is_set))
            .map(|key| key.to_string())
            .collect();

        if let Some(missing) = NonEmpty::from_vec(missing) {
            return Err(ConfigError::Missing(missing));
        }

        let image = match self.values.get("image") {
            Some(Value::String(image)) => image.trim().to_string(),
            _ => {
                return Err(ConfigError::NotAString {
                    key: "image".to_string(),
                });
            }
        };

        Ok(ValidatedConfig { image })
    }
}

/// Null, false, zero, and empty strings or collections count as unset.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
