//! Output schemas: JSON Schema documents constraining the shape of a
//! task's result.
//!
//! The service accepts any top-level object schema. Callers can hand us a
//! raw [`serde_json::Value`] (e.g. loaded from a file) or derive one from
//! a Rust type via [`schemars`].

use anyhow::{Result, bail};
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};

/// A validated JSON Schema for a task's result.
///
/// Serializes transparently as the inner schema object, so whatever the
/// caller provided is what goes over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputSchema(serde_json::Value);

impl OutputSchema {
    /// Wrap a raw schema value. The service only materializes object
    /// results, so the top level must be `"type": "object"`.
    pub fn raw(value: serde_json::Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            bail!("output schema must be a JSON object, got: {value}");
        };

        match object.get("type").and_then(|t| t.as_str()) {
            Some("object") => {}
            Some(other) => {
                bail!("output schema must describe an object at the top level, got type \"{other}\"")
            }
            None => bail!("output schema is missing the top-level \"type\" field"),
        }

        Ok(Self(value))
    }

    /// Derive the schema from a Rust type.
    pub fn of<T: JsonSchema>() -> Result<Self> {
        let schema = schema_for!(T);
        Self::raw(serde_json::to_value(&schema.schema)?)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}
