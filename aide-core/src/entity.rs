//! The entity: the unit of structured content in an aide's tree.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A node in the aide's parent/child content tree, rooted at the synthetic
/// `"root"` id (which is never itself materialized as an `Entity`).
///
/// See invariants on `parent`, `_children`, cycle-freedom, and soft-delete
/// visibility on the snapshot type; the entity itself only carries data.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Globally unique (within the aide) snake_case identifier.
    pub id: EntityId,
    /// Id of the parent entity, or `"root"` for a top-level entity.
    pub parent: EntityId,
    /// Optional display hint (`page`, `section`, `card`, `table`, ...).
    /// Implementation-defined beyond the suggested vocabulary, so this is a
    /// plain string rather than a closed enum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Arbitrary JSON-like properties.
    #[serde(default)]
    pub props: Map<String, Value>,
    /// Soft-delete flag. Removed entities stay addressable for replay/undo
    /// but are excluded from rendering, counts, constraints, and relationship
    /// resolution.
    #[serde(rename = "_removed", default)]
    pub removed: bool,
    /// Ordered child ids, equal to the live set of entities whose `parent`
    /// is this entity's id unless explicitly reordered.
    #[serde(rename = "_children", default)]
    pub children: Vec<EntityId>,
    /// Sequence number at which this entity was created (or re-created).
    #[serde(rename = "_created_seq")]
    pub created_seq: u64,
    /// Sequence number of the most recent mutation.
    #[serde(rename = "_updated_seq")]
    pub updated_seq: u64,
}

impl Entity {
    /// Construct a freshly created entity at the given sequence.
    pub fn new(id: EntityId, parent: EntityId, display: Option<String>, seq: u64) -> Self {
        Self {
            id,
            parent,
            display,
            props: Map::new(),
            removed: false,
            children: Vec::new(),
            created_seq: seq,
            updated_seq: seq,
        }
    }

    /// Shallow-merge `patch` into `props`. A `null` value removes the key.
    pub fn merge_props(&mut self, patch: &Map<String, Value>) {
        for (k, v) in patch {
            if v.is_null() {
                self.props.remove(k);
            } else {
                self.props.insert(k.clone(), v.clone());
            }
        }
    }
}
