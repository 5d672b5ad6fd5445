//! Warning and rejection codes produced by the reducer.
//!
//! These are data, not Rust errors: `reduce()` never returns an `Err` (see
//! spec §4.1/§7 — validation failures are reported as structured warnings
//! or rejections on an always-`Ok` result).

use serde::{Deserialize, Serialize};

/// A code attached to an applied event that nonetheless deserves the
/// caller's attention.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    /// `entity.remove` applied to an already-removed entity.
    AlreadyRemoved,
    /// A non-strict constraint was violated; the event still applied.
    ConstraintViolated,
    /// A payload field was present but not recognized for this primitive.
    UnknownFieldIgnored,
    /// A schema-required field was missing or null on an entity.
    SchemaFieldMissing,
}

/// A code attached to a rejected event. Rejected events are never appended
/// to the log.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionCode {
    /// `entity.create` targeted an id that already exists and is live.
    EntityAlreadyExists,
    /// A referenced parent id does not exist (or is removed, for creates).
    ParentNotFound,
    /// A referenced entity id does not exist.
    EntityNotFound,
    /// A required `ref` field was absent from the payload.
    MissingRef,
    /// An id failed basic shape validation.
    InvalidId,
    /// A payload field had the wrong JSON type for its primitive.
    TypeMismatch,
    /// `entity.move` would create a cycle.
    CycleDetected,
    /// A strict constraint was violated.
    StrictConstraintViolated,
    /// `schema.remove` targeted a schema still referenced by a live entity.
    SchemaInUse,
    /// A referenced schema id does not exist.
    SchemaNotFound,
    /// The event's `type` did not match any recognized primitive.
    UnknownPrimitive,
}

/// A warning attached to an applied event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// The warning code.
    pub code: WarningCode,
    /// Human-readable detail (entity id, field name, constraint id, ...).
    pub detail: String,
}

impl Warning {
    /// Construct a warning with a detail string.
    pub fn new(code: WarningCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }
}

/// A rejection attached to a non-applied event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// The rejection code.
    pub code: RejectionCode,
    /// Human-readable detail.
    pub detail: String,
}

impl Rejection {
    /// Construct a rejection with a detail string.
    pub fn new(code: RejectionCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }
}
