//! Typed access to tool call arguments.

use crate::error::ScoutError;

/// Arguments of one tool call, with typed getters.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, ScoutError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ScoutError::InvalidArgument(format!("missing string argument: {key}")))
    }

    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get an integer argument.
    pub fn get_i64(&self, key: &str) -> Result<i64, ScoutError> {
        self.value
            .get(key)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| ScoutError::InvalidArgument(format!("missing integer argument: {key}")))
    }

    /// Optional integer; `null` counts as absent.
    pub fn get_i64_opt(&self, key: &str) -> Result<Option<i64>, ScoutError> {
        match self.value.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(v) => v.as_i64().map(Some).ok_or_else(|| {
                ScoutError::InvalidArgument(format!("argument {key} is not an integer: {v}"))
            }),
        }
    }

    /// Deserialize the entire arguments into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, ScoutError> {
        serde_json::from_value(self.value.clone()).map_err(|e| {
            ScoutError::InvalidArgument(format!("failed to deserialize arguments: {e}"))
        })
    }
}

impl From<serde_json::Value> for ToolArguments {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value)
    }
}
