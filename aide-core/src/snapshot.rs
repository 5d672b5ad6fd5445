//! The materialized state: entities, relationships, styles, meta, schemas.

use crate::entity::Entity;
use crate::id::{EntityId, SchemaId};
use crate::meta::Meta;
use crate::relationship::Relationships;
use crate::schema::Schema;
use crate::styles::Styles;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The full materialized state of one aide.
///
/// `BTreeMap` is used throughout (rather than `HashMap`) so that derived
/// serialization already emits keys in sorted order — the basis of
/// [`crate::canonical::canonical_json`] without a separate re-sorting pass.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Title/identity/visibility/annotations/constraints.
    #[serde(default)]
    pub meta: Meta,
    /// All entities (live and soft-removed), keyed by id.
    #[serde(default)]
    pub entities: BTreeMap<EntityId, Entity>,
    /// Relationship tuples and cardinality registry.
    #[serde(default)]
    pub relationships: Relationships,
    /// Global and per-entity style overrides.
    #[serde(default)]
    pub styles: Styles,
    /// Declared entity shapes, keyed by id.
    #[serde(default)]
    pub schemas: BTreeMap<SchemaId, Schema>,
    /// Ordered top-level entity ids. The synthetic `"root"` id is never
    /// materialized as an [`Entity`], so its child order is tracked here
    /// instead of in an `Entity::children` field.
    #[serde(default)]
    pub root_children: Vec<EntityId>,
    /// Schema version marker for the snapshot shape itself (not entity
    /// schemas); bumped only by a deliberate migration, never by the reducer.
    #[serde(default = "Snapshot::current_version")]
    pub version: u32,
    /// Monotonic count of events applied to reach this state.
    #[serde(default)]
    pub sequence: u64,
}

impl Snapshot {
    /// The empty snapshot: no entities, default version, sequence zero.
    pub fn empty() -> Self {
        Self {
            version: Self::current_version(),
            ..Default::default()
        }
    }

    /// The current snapshot schema version.
    pub fn current_version() -> u32 {
        1
    }

    /// A live (non-removed) entity, if it exists.
    pub fn live_entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id).filter(|e| !e.removed)
    }

    /// Whether `id` resolves to `"root"` or a live entity.
    pub fn is_live_or_root(&self, id: &EntityId) -> bool {
        id.is_root() || self.live_entity(id).is_some()
    }

    /// Whether `candidate` is `target` or a descendant of `target`, walking
    /// the live parent chain. Used to reject cycle-forming `entity.move`s.
    pub fn is_descendant_or_self(&self, target: &EntityId, candidate: &EntityId) -> bool {
        if target == candidate {
            return true;
        }
        let mut frontier = vec![target.clone()];
        let mut visited = std::collections::HashSet::new();
        while let Some(id) = frontier.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            if let Some(entity) = self.entities.get(&id) {
                for child in &entity.children {
                    if child == candidate {
                        return true;
                    }
                    frontier.push(child.clone());
                }
            }
        }
        false
    }

    /// Live children of `parent` (or of the synthetic root), in their
    /// stored order.
    pub fn live_children(&self, parent: &EntityId) -> Vec<&EntityId> {
        let children = if parent.is_root() {
            &self.root_children
        } else {
            match self.entities.get(parent) {
                Some(e) => &e.children,
                None => return Vec::new(),
            }
        };
        children
            .iter()
            .filter(|c| self.live_entity(c).is_some())
            .collect()
    }

    /// All children (including soft-removed) of `parent` or the root, in order.
    pub fn all_children(&self, parent: &EntityId) -> &[EntityId] {
        if parent.is_root() {
            &self.root_children
        } else {
            match self.entities.get(parent) {
                Some(e) => &e.children,
                None => &[],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Snapshot {
        // root -> a -> b -> c
        let mut snap = Snapshot::empty();
        let mut a = Entity::new(EntityId::from("a"), EntityId::root(), None, 1);
        let mut b = Entity::new(EntityId::from("b"), EntityId::from("a"), None, 2);
        let c = Entity::new(EntityId::from("c"), EntityId::from("b"), None, 3);
        a.children.push(EntityId::from("b"));
        b.children.push(EntityId::from("c"));
        snap.root_children.push(EntityId::from("a"));
        snap.entities.insert(EntityId::from("a"), a);
        snap.entities.insert(EntityId::from("b"), b);
        snap.entities.insert(EntityId::from("c"), c);
        snap
    }

    #[test]
    fn descendant_detection_covers_self_and_transitive_children() {
        let snap = chain();
        assert!(snap.is_descendant_or_self(&"a".into(), &"a".into()));
        assert!(snap.is_descendant_or_self(&"a".into(), &"b".into()));
        assert!(snap.is_descendant_or_self(&"a".into(), &"c".into()));
        assert!(!snap.is_descendant_or_self(&"b".into(), &"a".into()));
    }

    #[test]
    fn live_children_excludes_removed() {
        let mut snap = chain();
        snap.entities.get_mut(&EntityId::from("c")).unwrap().removed = true;
        assert_eq!(snap.live_children(&"b".into()), Vec::<&EntityId>::new());
        assert_eq!(snap.all_children(&"b".into()).len(), 1);
    }

    #[test]
    fn root_children_tracked_separately_from_entities() {
        let snap = chain();
        assert_eq!(snap.live_children(&EntityId::root()), vec![&EntityId::from("a")]);
    }
}
