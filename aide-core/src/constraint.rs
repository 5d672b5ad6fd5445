//! Named validation rules, registered under `rel.constrain` / `meta.constrain`.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};

/// The body of a constraint rule.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ConstraintRule {
    /// Two entities must not share the same target via a relationship type.
    ExcludePair {
        /// First entity.
        a: EntityId,
        /// Second entity.
        b: EntityId,
        /// Relationship type to check.
        rel_type: String,
    },
    /// Two entities must share the same target via a relationship type.
    RequireSame {
        /// First entity.
        a: EntityId,
        /// Second entity.
        b: EntityId,
        /// Relationship type to check.
        rel_type: String,
    },
    /// A parent must not exceed a child count.
    MaxChildren {
        /// The parent entity.
        parent: EntityId,
        /// Maximum live child count.
        max: usize,
    },
    /// A parent must meet a child count.
    MinChildren {
        /// The parent entity.
        parent: EntityId,
        /// Minimum live child count.
        min: usize,
    },
    /// No two siblings under `parent` may share a value for `field`.
    UniqueField {
        /// The parent whose live children are checked.
        parent: EntityId,
        /// The prop name to check.
        field: String,
    },
    /// Listed fields must be present and non-null on every live entity
    /// under `path`.
    RequiredFields {
        /// Root of the subtree to check (inclusive).
        path: EntityId,
        /// Field names that must be present and non-null.
        fields: Vec<String>,
    },
}

/// A named, optionally strict, validation rule.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Rule body.
    #[serde(flatten)]
    pub rule: ConstraintRule,
    /// If true, a violation rejects the triggering event instead of warning.
    #[serde(default)]
    pub strict: bool,
}
