//! Events: the declarative record of one state change, and its primitive catalog.

use crate::constraint::ConstraintRule;
use crate::id::EntityId;
use crate::relationship::Cardinality;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The recognized primitive catalog (spec §3.5). Tagged with `type` +
/// `payload` so the wire shape is exactly `{"type": "...", "payload": {...}}`,
/// matching the event wrapper's documented `type`/`payload` fields.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Primitive {
    /// Create (or re-create, if previously soft-removed) an entity.
    #[serde(rename = "entity.create")]
    EntityCreate {
        /// New entity id.
        id: EntityId,
        /// Parent id; defaults to `"root"` if absent.
        #[serde(default = "EntityId::root")]
        parent: EntityId,
        /// Optional display hint.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display: Option<String>,
        /// Initial props.
        #[serde(default)]
        props: Map<String, Value>,
    },
    /// Shallow-merge props into an existing entity.
    #[serde(rename = "entity.update")]
    EntityUpdate {
        /// Target entity id.
        #[serde(rename = "ref")]
        entity_ref: EntityId,
        /// Partial props to merge.
        #[serde(default)]
        props: Map<String, Value>,
    },
    /// Soft-remove an entity and cascade to its descendants.
    #[serde(rename = "entity.remove")]
    EntityRemove {
        /// Target entity id.
        #[serde(rename = "ref")]
        entity_ref: EntityId,
    },
    /// Detach and re-attach an entity under a new parent.
    #[serde(rename = "entity.move")]
    EntityMove {
        /// Target entity id.
        #[serde(rename = "ref")]
        entity_ref: EntityId,
        /// New parent id.
        new_parent: EntityId,
        /// Optional insertion position among the new parent's children.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
    },
    /// Replace a parent's child order with an exact provided list.
    #[serde(rename = "entity.reorder")]
    EntityReorder {
        /// Parent whose children are reordered.
        parent: EntityId,
        /// New ordered child list; must equal the existing live child set.
        children: Vec<EntityId>,
    },
    /// Register/overwrite a relationship tuple.
    #[serde(rename = "rel.set")]
    RelSet {
        /// Source entity id.
        from: EntityId,
        /// Target entity id.
        to: EntityId,
        /// Relationship type name.
        #[serde(rename = "type")]
        rel_type: String,
        /// Cardinality, required at first use of this type.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cardinality: Option<Cardinality>,
    },
    /// Remove a matching relationship tuple.
    #[serde(rename = "rel.remove")]
    RelRemove {
        /// Source entity id.
        from: EntityId,
        /// Target entity id.
        to: EntityId,
        /// Relationship type name.
        #[serde(rename = "type")]
        rel_type: String,
    },
    /// Register a relationship-scoped constraint.
    #[serde(rename = "rel.constrain")]
    RelConstrain {
        /// Constraint id.
        id: crate::id::ConstraintId,
        /// Rule body.
        rule: ConstraintRule,
        /// Strict flag.
        #[serde(default)]
        strict: bool,
    },
    /// Shallow-merge global design tokens.
    #[serde(rename = "style.set")]
    StyleSet {
        /// Flat key/value patch; null removes a key.
        #[serde(default)]
        styles: Map<String, Value>,
    },
    /// Merge per-entity style overrides.
    #[serde(rename = "style.entity")]
    StyleEntity {
        /// Target entity id.
        #[serde(rename = "ref")]
        entity_ref: EntityId,
        /// Flat key/value patch; null removes a key.
        #[serde(default)]
        styles: Map<String, Value>,
    },
    /// Shallow-merge meta fields (`title`, `identity`, `visibility`, ...).
    #[serde(rename = "meta.set")]
    MetaSet {
        /// Flat key/value patch; null removes a key.
        #[serde(default)]
        fields: Map<String, Value>,
    },
    /// Append a note to the meta annotation log.
    #[serde(rename = "meta.annotate")]
    MetaAnnotate {
        /// Note text.
        note: String,
        /// Whether the annotation is pinned.
        #[serde(default)]
        pinned: bool,
    },
    /// Register a meta-scoped constraint.
    #[serde(rename = "meta.constrain")]
    MetaConstrain {
        /// Constraint id.
        id: crate::id::ConstraintId,
        /// Rule body.
        rule: ConstraintRule,
        /// Strict flag.
        #[serde(default)]
        strict: bool,
    },
    /// Register or overwrite a declared entity shape.
    #[serde(rename = "schema.create")]
    SchemaCreate {
        /// Schema id.
        id: crate::id::SchemaId,
        /// Schema body.
        schema: Schema,
    },
    /// Update an existing declared entity shape.
    #[serde(rename = "schema.update")]
    SchemaUpdate {
        /// Schema id.
        id: crate::id::SchemaId,
        /// New schema body (replaces the old one wholesale).
        schema: Schema,
    },
    /// Remove a declared entity shape; rejected while any live entity
    /// references it.
    #[serde(rename = "schema.remove")]
    SchemaRemove {
        /// Schema id.
        id: crate::id::SchemaId,
    },
    /// Free-form text for display; never mutates the snapshot.
    #[serde(rename = "voice")]
    Voice {
        /// Text to surface to the client.
        text: String,
    },
    /// Hint to change model tier; never mutates the snapshot.
    #[serde(rename = "escalate")]
    Escalate {
        /// Free-form reason/hint, observed by the orchestrator only.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hint: Option<String>,
    },
    /// Marks the start of a batch window; never mutates the snapshot.
    #[serde(rename = "batch.start")]
    BatchStart,
    /// Marks the end of a batch window; never mutates the snapshot.
    #[serde(rename = "batch.end")]
    BatchEnd,
}

impl Primitive {
    /// The wire type tag, e.g. `"entity.create"`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Primitive::EntityCreate { .. } => "entity.create",
            Primitive::EntityUpdate { .. } => "entity.update",
            Primitive::EntityRemove { .. } => "entity.remove",
            Primitive::EntityMove { .. } => "entity.move",
            Primitive::EntityReorder { .. } => "entity.reorder",
            Primitive::RelSet { .. } => "rel.set",
            Primitive::RelRemove { .. } => "rel.remove",
            Primitive::RelConstrain { .. } => "rel.constrain",
            Primitive::StyleSet { .. } => "style.set",
            Primitive::StyleEntity { .. } => "style.entity",
            Primitive::MetaSet { .. } => "meta.set",
            Primitive::MetaAnnotate { .. } => "meta.annotate",
            Primitive::MetaConstrain { .. } => "meta.constrain",
            Primitive::SchemaCreate { .. } => "schema.create",
            Primitive::SchemaUpdate { .. } => "schema.update",
            Primitive::SchemaRemove { .. } => "schema.remove",
            Primitive::Voice { .. } => "voice",
            Primitive::Escalate { .. } => "escalate",
            Primitive::BatchStart => "batch.start",
            Primitive::BatchEnd => "batch.end",
        }
    }

    /// Signals (`voice`, `escalate`, `batch.start`, `batch.end`) pass through
    /// the reducer without mutating the snapshot; the orchestrator observes
    /// them instead.
    pub fn is_signal(&self) -> bool {
        matches!(
            self,
            Primitive::Voice { .. }
                | Primitive::Escalate { .. }
                | Primitive::BatchStart
                | Primitive::BatchEnd
        )
    }
}

/// One state-change record: a primitive payload plus provenance assigned by
/// the orchestrator on persist.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Opaque id, assigned on persist.
    pub id: String,
    /// Monotonic sequence number, assigned on persist.
    pub sequence: u64,
    /// ISO-8601 timestamp, assigned on persist. Never read by the reducer.
    pub timestamp: String,
    /// User id, or `"system"`.
    pub actor: String,
    /// Origin channel (`web`, `signal`, `cli`, ...).
    pub source: String,
    /// The primitive payload.
    #[serde(flatten)]
    pub primitive: Primitive,
}

impl Event {
    /// Construct an event with the given provenance and primitive.
    pub fn new(
        id: impl Into<String>,
        sequence: u64,
        timestamp: impl Into<String>,
        actor: impl Into<String>,
        source: impl Into<String>,
        primitive: Primitive,
    ) -> Self {
        Self {
            id: id.into(),
            sequence,
            timestamp: timestamp.into(),
            actor: actor.into(),
            source: source.into(),
            primitive,
        }
    }
}
