//! Relationships: a directed, cardinality-enforced multiset of tuples.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cardinality of a relationship type, registered at first use and
/// immutable thereafter.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Each `from` maps to at most one `to`, and vice versa.
    OneToOne,
    /// Each `from` may map to many `to`; each `to` maps to at most one `from`.
    OneToMany,
    /// Each `to` may map to many `from`; each `from` maps to at most one `to`.
    ManyToOne,
    /// No automatic conflict removal.
    ManyToMany,
}

/// One directed relationship tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipTuple {
    /// Source entity id.
    pub from: EntityId,
    /// Target entity id.
    pub to: EntityId,
    /// Relationship type name.
    #[serde(rename = "type")]
    pub rel_type: String,
}

/// The full relationship state of a snapshot: an ordered multiset of tuples
/// plus the cardinality registry keyed by type name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationships {
    /// Tuples in insertion order. Insertion order is deterministic given a
    /// deterministic event sequence, so no additional sort is needed for
    /// canonical serialization.
    #[serde(default)]
    pub tuples: Vec<RelationshipTuple>,
    /// Registered cardinality per relationship type.
    #[serde(default)]
    pub cardinality: BTreeMap<String, Cardinality>,
}

impl Relationships {
    /// Find the registered cardinality for a type, if any.
    pub fn cardinality_of(&self, rel_type: &str) -> Option<Cardinality> {
        self.cardinality.get(rel_type).copied()
    }

    /// Tuples conflicting with a prospective `(from, to, rel_type)` insert
    /// under the given cardinality, i.e. the tuples that must be removed
    /// before the new tuple is appended.
    pub fn conflicts_for(
        &self,
        from: &EntityId,
        to: &EntityId,
        rel_type: &str,
        cardinality: Cardinality,
    ) -> Vec<usize> {
        let mut idxs = Vec::new();
        for (i, t) in self.tuples.iter().enumerate() {
            if t.rel_type != rel_type {
                continue;
            }
            let same_tuple = &t.from == from && &t.to == to;
            if same_tuple {
                // Replacing an identical tuple is not a conflict; `rel.set`
                // de-dupes it below instead of removing+re-adding.
                continue;
            }
            let conflicts = match cardinality {
                Cardinality::OneToOne => &t.from == from || &t.to == to,
                Cardinality::OneToMany => &t.to == to,
                Cardinality::ManyToOne => &t.from == from,
                Cardinality::ManyToMany => false,
            };
            if conflicts {
                idxs.push(i);
            }
        }
        idxs
    }

    /// Whether an identical tuple already exists.
    pub fn contains(&self, from: &EntityId, to: &EntityId, rel_type: &str) -> bool {
        self.tuples
            .iter()
            .any(|t| &t.from == from && &t.to == to && t.rel_type == rel_type)
    }

    /// Remove a matching tuple, if present. Returns whether one was removed.
    pub fn remove(&mut self, from: &EntityId, to: &EntityId, rel_type: &str) -> bool {
        let before = self.tuples.len();
        self.tuples
            .retain(|t| !(&t.from == from && &t.to == to && t.rel_type == rel_type));
        self.tuples.len() != before
    }

    /// Tuples whose endpoints are both live, in insertion order. Soft-removed
    /// entities are excluded from resolution but their tuples stay in
    /// storage (replay/undo needs them), so this is a read-time filter, not
    /// a deletion.
    pub fn live_tuples<'a>(
        &'a self,
        is_live: impl Fn(&EntityId) -> bool + 'a,
    ) -> impl Iterator<Item = &'a RelationshipTuple> + 'a {
        self.tuples
            .iter()
            .filter(move |t| is_live(&t.from) && is_live(&t.to))
    }
}
