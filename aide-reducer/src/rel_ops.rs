//! `rel.*` primitive semantics.

use crate::OpResult;
use aide_core::{Cardinality, EntityId, Rejection, RejectionCode, RelationshipTuple, Snapshot};

pub fn set(
    snapshot: &Snapshot,
    from: EntityId,
    to: EntityId,
    rel_type: String,
    cardinality: Option<Cardinality>,
) -> OpResult {
    if !snapshot.is_live_or_root(&from) {
        return Err(Rejection::new(RejectionCode::EntityNotFound, from.to_string()));
    }
    if !snapshot.is_live_or_root(&to) {
        return Err(Rejection::new(RejectionCode::EntityNotFound, to.to_string()));
    }

    let registered = snapshot.relationships.cardinality_of(&rel_type);
    let effective = match (registered, cardinality) {
        (Some(existing), Some(requested)) if existing != requested => {
            return Err(Rejection::new(
                RejectionCode::TypeMismatch,
                format!("{rel_type} already registered as a different cardinality"),
            ));
        }
        (Some(existing), _) => existing,
        (None, Some(requested)) => requested,
        (None, None) => Cardinality::ManyToMany,
    };

    let mut snapshot = snapshot.clone();
    snapshot
        .relationships
        .cardinality
        .entry(rel_type.clone())
        .or_insert(effective);

    let conflicts = snapshot
        .relationships
        .conflicts_for(&from, &to, &rel_type, effective);
    for idx in conflicts.into_iter().rev() {
        snapshot.relationships.tuples.remove(idx);
    }

    if !snapshot.relationships.contains(&from, &to, &rel_type) {
        snapshot.relationships.tuples.push(RelationshipTuple {
            from,
            to,
            rel_type,
        });
    }

    Ok((snapshot, Vec::new()))
}

pub fn remove(snapshot: &Snapshot, from: EntityId, to: EntityId, rel_type: String) -> OpResult {
    let mut snapshot = snapshot.clone();
    snapshot.relationships.remove(&from, &to, &rel_type);
    Ok((snapshot, Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_ops;
    use aide_core::json::Map;

    fn with_two_entities() -> Snapshot {
        let (snap, _) =
            entity_ops::create(&Snapshot::empty(), "a".into(), EntityId::root(), None, Map::new(), 1).unwrap();
        let (snap, _) = entity_ops::create(&snap, "b".into(), EntityId::root(), None, Map::new(), 2).unwrap();
        let (snap, _) = entity_ops::create(&snap, "c".into(), EntityId::root(), None, Map::new(), 3).unwrap();
        snap
    }

    #[test]
    fn cardinality_mismatch_on_second_set_is_rejected() {
        let snap = with_two_entities();
        let (snap, _) = set(&snap, "a".into(), "b".into(), "owns".into(), Some(Cardinality::OneToOne)).unwrap();
        let err = set(&snap, "a".into(), "c".into(), "owns".into(), Some(Cardinality::ManyToMany)).unwrap_err();
        assert_eq!(err.code, RejectionCode::TypeMismatch);
    }

    #[test]
    fn one_to_one_auto_removes_conflicting_tuple() {
        let snap = with_two_entities();
        let (snap, _) = set(&snap, "a".into(), "b".into(), "owns".into(), Some(Cardinality::OneToOne)).unwrap();
        let (snap, _) = set(&snap, "a".into(), "c".into(), "owns".into(), None).unwrap();
        assert!(!snap.relationships.contains(&"a".into(), &"b".into(), "owns"));
        assert!(snap.relationships.contains(&"a".into(), &"c".into(), "owns"));
    }

    #[test]
    fn remove_is_idempotent() {
        let snap = with_two_entities();
        let (snap, _) = set(&snap, "a".into(), "b".into(), "owns".into(), None).unwrap();
        let (snap, _) = remove(&snap, "a".into(), "b".into(), "owns".into()).unwrap();
        let (snap, _) = remove(&snap, "a".into(), "b".into(), "owns".into()).unwrap();
        assert!(!snap.relationships.contains(&"a".into(), &"b".into(), "owns"));
    }
}
