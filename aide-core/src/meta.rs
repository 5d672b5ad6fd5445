//! Snapshot-level metadata: title/identity/visibility, annotations, constraints.

use crate::constraint::Constraint;
use crate::id::ConstraintId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A single pinned or unpinned note attached to the aide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Free-text note content.
    pub note: String,
    /// Whether the annotation is pinned (surfaced prominently by clients).
    #[serde(default)]
    pub pinned: bool,
    /// ISO-8601 timestamp, assigned by the orchestrator on persist.
    pub ts: String,
    /// Sequence number at which the annotation was appended.
    pub seq: u64,
}

/// Snapshot-level metadata: `title`, `identity`, `visibility`, and any other
/// string/bool/number property, plus the ordered annotation log and the
/// registered constraint set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Flat key/value fields (`title`, `identity`, `visibility`, or any other
    /// implementation-defined key). Modeled as one map, like `props`, rather
    /// than fixed struct fields, since `meta.set` shallow-merges a flat
    /// key/value map with no closed field list.
    #[serde(default, flatten)]
    pub fields: Map<String, Value>,
    /// Ordered annotation log.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    /// Registered constraints, keyed by id.
    #[serde(default)]
    pub constraints: BTreeMap<ConstraintId, Constraint>,
}

impl Meta {
    /// Shallow-merge a flat key/value patch. A `null` value removes the key.
    pub fn merge_fields(&mut self, patch: &Map<String, Value>) {
        for (k, v) in patch {
            if v.is_null() {
                self.fields.remove(k);
            } else {
                self.fields.insert(k.clone(), v.clone());
            }
        }
    }

    /// Read-only convenience over the annotation log: the pinned subset, in
    /// original order. Not a new piece of state, just a query helper.
    pub fn pinned_annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(|a| a.pinned)
    }

    /// Convenience accessor for the well-known `title` field.
    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }
}
