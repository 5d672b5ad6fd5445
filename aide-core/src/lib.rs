//! Typed data model for the AIde living-object kernel.
//!
//! This crate defines the entity/relationship/constraint/snapshot/event
//! types the reducer (in `aide-reducer`) operates over, plus the canonical
//! JSON encoding and content-addressed snapshot hash both the reducer's
//! determinism tests and the persistence facade's reconciliation hash are
//! built on. Nothing in this crate performs I/O.

#![deny(missing_docs)]

mod canonical;
mod codes;
mod constraint;
mod entity;
mod error;
mod event;
mod id;
mod meta;
mod reduce_result;
mod relationship;
mod schema;
mod snapshot;
mod styles;

pub use canonical::{canonical_json, snapshot_hash};
pub use codes::{Rejection, RejectionCode, Warning, WarningCode};
pub use constraint::{Constraint, ConstraintRule};
pub use entity::Entity;
pub use error::ModelError;
pub use event::{Event, Primitive};
pub use id::{AideId, ConstraintId, EntityId, SchemaId};
pub use meta::{Annotation, Meta};
pub use reduce_result::ReduceResult;
pub use relationship::{Cardinality, Relationships, RelationshipTuple};
pub use schema::{Schema, SchemaField};
pub use snapshot::Snapshot;
pub use styles::{merge_flat, Styles};

/// Convenient re-export of the `serde_json` types used throughout the
/// model's `props`/`fields`/`styles` maps, so downstream crates don't need
/// a direct `serde_json` dependency just to build a `Primitive`.
pub mod json {
    pub use serde_json::{Map, Value};
}
