//! Event payload - the raw aggregator event being transformed.

use crate::error::{Result, TransformError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An event emitted by the completion aggregator.
///
/// The payload is read-only and addressed by dotted paths such as
/// `data.block_id` or `context.user_id`. JSON `null` is treated the same
/// as an absent key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventPayload(Value);

impl EventPayload {
    /// Wrap an already parsed JSON value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse a payload from a JSON document.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(Self(serde_json::from_str(raw)?))
    }

    /// The event type, read from the top-level `name` key.
    pub fn name(&self) -> Option<&str> {
        self.lookup("name").and_then(Value::as_str)
    }

    /// Walk a dotted path through nested objects.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut current = &self.0;
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    /// Read a value by dotted path.
    ///
    /// With `required` set, an absent value is a [`TransformError::MissingField`].
    pub fn get_data(&self, path: &str, required: bool) -> Result<Option<&Value>> {
        match self.lookup(path) {
            Some(value) => Ok(Some(value)),
            None if required => Err(TransformError::MissingField(path.to_string())),
            None => Ok(None),
        }
    }

    /// Read a scalar value by dotted path and render it as a string.
    ///
    /// Numbers are accepted so that numeric ids (e.g. `context.user_id`)
    /// can be used wherever a string id is expected.
    pub fn get_string(&self, path: &str, required: bool) -> Result<Option<String>> {
        let Some(value) = self.get_data(path, required)? else {
            return Ok(None);
        };

        match value {
            Value::String(s) => Ok(Some(s.clone())),
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(TransformError::invalid(
                path,
                format!("expected a string or number, got {}", kind_of(other)),
            )),
        }
    }
}

/// Short JSON type name used in error messages.
fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
