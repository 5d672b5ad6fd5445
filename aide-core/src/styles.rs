//! Design tokens: global styles and per-entity overrides.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Style state: a global design-token map plus per-entity overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Styles {
    /// Global design tokens, shallow-merged by `style.set`.
    #[serde(default)]
    pub global: Map<String, Value>,
    /// Entity id to style override map, merged by `style.entity`.
    #[serde(default)]
    pub per_entity: BTreeMap<EntityId, Map<String, Value>>,
}

/// Shallow-merge `patch` into `target`. A `null` value removes the key.
pub fn merge_flat(target: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (k, v) in patch {
        if v.is_null() {
            target.remove(k);
        } else {
            target.insert(k.clone(), v.clone());
        }
    }
}
