//! `style.*` and `meta.*` primitive semantics.

use crate::OpResult;
use aide_core::json::{Map, Value};
use aide_core::{
    merge_flat, Annotation, Constraint, ConstraintId, ConstraintRule, EntityId, Rejection,
    RejectionCode, Snapshot,
};

pub fn style_set(snapshot: &Snapshot, styles: Map<String, Value>) -> OpResult {
    let mut snapshot = snapshot.clone();
    merge_flat(&mut snapshot.styles.global, &styles);
    Ok((snapshot, Vec::new()))
}

pub fn style_entity(snapshot: &Snapshot, entity_ref: EntityId, styles: Map<String, Value>) -> OpResult {
    if snapshot.live_entity(&entity_ref).is_none() {
        return Err(Rejection::new(RejectionCode::EntityNotFound, entity_ref.to_string()));
    }
    let mut snapshot = snapshot.clone();
    let entry = snapshot.styles.per_entity.entry(entity_ref).or_default();
    merge_flat(entry, &styles);
    Ok((snapshot, Vec::new()))
}

pub fn meta_set(snapshot: &Snapshot, fields: Map<String, Value>) -> OpResult {
    let mut snapshot = snapshot.clone();
    snapshot.meta.merge_fields(&fields);
    Ok((snapshot, Vec::new()))
}

pub fn meta_annotate(
    snapshot: &Snapshot,
    note: String,
    pinned: bool,
    seq: u64,
    ts: impl Into<String>,
) -> OpResult {
    let mut snapshot = snapshot.clone();
    snapshot.meta.annotations.push(Annotation {
        note,
        pinned,
        ts: ts.into(),
        seq,
    });
    Ok((snapshot, Vec::new()))
}

pub fn register_constraint(
    snapshot: &Snapshot,
    id: ConstraintId,
    rule: ConstraintRule,
    strict: bool,
) -> OpResult {
    let mut snapshot = snapshot.clone();
    snapshot.meta.constraints.insert(id, Constraint { rule, strict });
    Ok((snapshot, Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn style_set_null_removes_key() {
        let (snap, _) = style_set(&Snapshot::empty(), {
            let mut m = Map::new();
            m.insert("accent".into(), json!("blue"));
            m
        })
        .unwrap();
        let (snap, _) = style_set(&snap, {
            let mut m = Map::new();
            m.insert("accent".into(), Value::Null);
            m
        })
        .unwrap();
        assert!(!snap.styles.global.contains_key("accent"));
    }

    #[test]
    fn meta_annotate_appends_with_sequence() {
        let (snap, _) = meta_annotate(&Snapshot::empty(), "reminder".into(), true, 1, "2026-07-27T00:00:00Z").unwrap();
        assert_eq!(snap.meta.annotations.len(), 1);
        assert_eq!(snap.meta.pinned_annotations().count(), 1);
    }
}
