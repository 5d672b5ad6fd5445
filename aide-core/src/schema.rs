//! Optional declared entity shapes, validated by the reducer when present.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One field declared by a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Field name, matched against an entity's `props` key.
    pub name: String,
    /// Informal type hint (`string`, `number`, `boolean`, `array`, `object`);
    /// not enforced beyond presence — the reducer warns on missing required
    /// fields, it does not type-check values.
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,
    /// Whether the field must be present (and non-null) on conforming entities.
    #[serde(default)]
    pub required: bool,
    /// Default value to suggest to prompt assembly; not applied automatically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// A declared entity shape: a name, a field list, and optional render
/// templates consumed by the (out-of-scope) HTML renderer.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Human-facing schema name.
    pub name: String,
    /// Declared fields.
    #[serde(default)]
    pub fields: Vec<SchemaField>,
    /// Optional render template identifiers, opaque to the reducer.
    #[serde(default)]
    pub render_templates: BTreeMap<String, String>,
}

impl Schema {
    /// Field names that are required and non-null.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
    }
}
