//! `entity.*` primitive semantics.

use crate::ids::valid_id;
use crate::OpResult;
use aide_core::json::{Map, Value};
use aide_core::{Entity, EntityId, Rejection, RejectionCode, Schema, SchemaId, Snapshot, Warning, WarningCode};

fn schema_field_warnings(snapshot: &Snapshot, entity: &Entity) -> Vec<Warning> {
    let Some(Value::String(schema_id)) = entity.props.get("schema") else {
        return Vec::new();
    };
    let Some(schema) = snapshot.schemas.get(&SchemaId::from(schema_id.as_str())) else {
        return Vec::new();
    };
    required_field_warnings(schema, entity)
}

fn required_field_warnings(schema: &Schema, entity: &Entity) -> Vec<Warning> {
    schema
        .required_fields()
        .filter(|field| entity.props.get(*field).is_none_or(Value::is_null))
        .map(|field| {
            Warning::new(
                WarningCode::SchemaFieldMissing,
                format!("{}.{field}", entity.id),
            )
        })
        .collect()
}

pub fn create(
    snapshot: &Snapshot,
    id: EntityId,
    parent: EntityId,
    display: Option<String>,
    props: Map<String, Value>,
    seq: u64,
) -> OpResult {
    if !valid_id(id.as_str()) {
        return Err(Rejection::new(RejectionCode::InvalidId, id.to_string()));
    }
    if !snapshot.is_live_or_root(&parent) {
        return Err(Rejection::new(RejectionCode::ParentNotFound, parent.to_string()));
    }
    if snapshot.live_entity(&id).is_some() {
        return Err(Rejection::new(RejectionCode::EntityAlreadyExists, id.to_string()));
    }

    let mut snapshot = snapshot.clone();
    let was_removed = snapshot.entities.get(&id).map(|e| e.removed).unwrap_or(false);
    if was_removed {
        // Detach from its previous parent's child list before re-creating.
        let old_parent = snapshot.entities.get(&id).unwrap().parent.clone();
        detach_child(&mut snapshot, &old_parent, &id);
    }

    let mut entity = Entity::new(id.clone(), parent.clone(), display, seq);
    entity.props = props;
    let warnings = schema_field_warnings(&snapshot, &entity);
    snapshot.entities.insert(id.clone(), entity);
    attach_child(&mut snapshot, &parent, &id, None);

    Ok((snapshot, warnings))
}

pub fn update(snapshot: &Snapshot, entity_ref: EntityId, props: Map<String, Value>, seq: u64) -> OpResult {
    if entity_ref.as_str().is_empty() {
        return Err(Rejection::new(RejectionCode::MissingRef, "ref"));
    }
    if snapshot.live_entity(&entity_ref).is_none() {
        return Err(Rejection::new(RejectionCode::EntityNotFound, entity_ref.to_string()));
    }
    let mut snapshot = snapshot.clone();
    let entity = snapshot.entities.get_mut(&entity_ref).unwrap();
    entity.merge_props(&props);
    entity.updated_seq = seq;
    let warnings = schema_field_warnings(&snapshot, snapshot.entities.get(&entity_ref).unwrap());
    Ok((snapshot, warnings))
}

pub fn remove(snapshot: &Snapshot, entity_ref: EntityId, seq: u64) -> OpResult {
    if snapshot.entities.get(&entity_ref).is_none() {
        return Err(Rejection::new(RejectionCode::EntityNotFound, entity_ref.to_string()));
    }
    let mut snapshot = snapshot.clone();
    let already_removed = snapshot.entities.get(&entity_ref).unwrap().removed;

    let mut stack = vec![entity_ref.clone()];
    while let Some(id) = stack.pop() {
        if let Some(entity) = snapshot.entities.get_mut(&id) {
            if !entity.removed {
                entity.removed = true;
                entity.updated_seq = seq;
            }
            stack.extend(entity.children.clone());
        }
    }

    let warnings = if already_removed {
        vec![Warning::new(WarningCode::AlreadyRemoved, entity_ref.to_string())]
    } else {
        Vec::new()
    };
    Ok((snapshot, warnings))
}

pub fn move_entity(
    snapshot: &Snapshot,
    entity_ref: EntityId,
    new_parent: EntityId,
    position: Option<usize>,
    seq: u64,
) -> OpResult {
    if snapshot.live_entity(&entity_ref).is_none() {
        return Err(Rejection::new(RejectionCode::EntityNotFound, entity_ref.to_string()));
    }
    if !snapshot.is_live_or_root(&new_parent) {
        return Err(Rejection::new(RejectionCode::ParentNotFound, new_parent.to_string()));
    }
    if snapshot.is_descendant_or_self(&entity_ref, &new_parent) {
        return Err(Rejection::new(RejectionCode::CycleDetected, entity_ref.to_string()));
    }

    let mut snapshot = snapshot.clone();
    let old_parent = snapshot.entities.get(&entity_ref).unwrap().parent.clone();
    detach_child(&mut snapshot, &old_parent, &entity_ref);
    attach_child(&mut snapshot, &new_parent, &entity_ref, position);
    snapshot.entities.get_mut(&entity_ref).unwrap().parent = new_parent;
    snapshot.entities.get_mut(&entity_ref).unwrap().updated_seq = seq;
    Ok((snapshot, Vec::new()))
}

pub fn reorder(snapshot: &Snapshot, parent: EntityId, children: Vec<EntityId>) -> OpResult {
    if !snapshot.is_live_or_root(&parent) {
        return Err(Rejection::new(RejectionCode::ParentNotFound, parent.to_string()));
    }
    let current: std::collections::HashSet<&EntityId> =
        snapshot.live_children(&parent).into_iter().collect();
    let proposed: std::collections::HashSet<&EntityId> = children.iter().collect();
    if current != proposed {
        return Err(Rejection::new(
            RejectionCode::TypeMismatch,
            format!("reorder list for {parent} is not the exact live child set"),
        ));
    }

    let mut snapshot = snapshot.clone();
    if parent.is_root() {
        snapshot.root_children = children;
    } else {
        snapshot.entities.get_mut(&parent).unwrap().children = children;
    }
    Ok((snapshot, Vec::new()))
}

fn detach_child(snapshot: &mut Snapshot, parent: &EntityId, id: &EntityId) {
    if parent.is_root() {
        snapshot.root_children.retain(|c| c != id);
    } else if let Some(e) = snapshot.entities.get_mut(parent) {
        e.children.retain(|c| c != id);
    }
}

fn attach_child(snapshot: &mut Snapshot, parent: &EntityId, id: &EntityId, position: Option<usize>) {
    let children = if parent.is_root() {
        &mut snapshot.root_children
    } else if let Some(e) = snapshot.entities.get_mut(parent) {
        &mut e.children
    } else {
        return;
    };
    let at = position.unwrap_or(children.len()).min(children.len());
    children.insert(at, id.clone());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_duplicate_live_id() {
        let (snap, _) = create(&Snapshot::empty(), "a".into(), EntityId::root(), None, Map::new(), 1).unwrap();
        let err = create(&snap, "a".into(), EntityId::root(), None, Map::new(), 2).unwrap_err();
        assert_eq!(err.code, RejectionCode::EntityAlreadyExists);
    }

    #[test]
    fn create_after_remove_recreates() {
        let (snap, _) = create(&Snapshot::empty(), "a".into(), EntityId::root(), None, Map::new(), 1).unwrap();
        let (snap, _) = remove(&snap, "a".into(), 2).unwrap();
        let (snap, _) = create(&snap, "a".into(), EntityId::root(), None, Map::new(), 3).unwrap();
        let e = snap.live_entity(&"a".into()).unwrap();
        assert!(!e.removed);
        assert_eq!(e.created_seq, 3);
    }

    #[test]
    fn remove_cascades_to_descendants() {
        let (snap, _) = create(&Snapshot::empty(), "a".into(), EntityId::root(), None, Map::new(), 1).unwrap();
        let (snap, _) = create(&snap, "b".into(), "a".into(), None, Map::new(), 2).unwrap();
        let (snap, _) = remove(&snap, "a".into(), 3).unwrap();
        assert!(snap.entities.get(&EntityId::from("b")).unwrap().removed);
    }

    #[test]
    fn remove_twice_warns_already_removed() {
        let (snap, _) = create(&Snapshot::empty(), "a".into(), EntityId::root(), None, Map::new(), 1).unwrap();
        let (snap, _) = remove(&snap, "a".into(), 2).unwrap();
        let (_, warnings) = remove(&snap, "a".into(), 3).unwrap();
        assert_eq!(warnings[0].code, WarningCode::AlreadyRemoved);
    }

    #[test]
    fn move_into_own_descendant_is_cycle() {
        let (snap, _) = create(&Snapshot::empty(), "a".into(), EntityId::root(), None, Map::new(), 1).unwrap();
        let (snap, _) = create(&snap, "b".into(), "a".into(), None, Map::new(), 2).unwrap();
        let err = move_entity(&snap, "a".into(), "b".into(), None, 3).unwrap_err();
        assert_eq!(err.code, RejectionCode::CycleDetected);
    }

    #[test]
    fn reorder_requires_exact_live_set() {
        let (snap, _) = create(&Snapshot::empty(), "a".into(), EntityId::root(), None, Map::new(), 1).unwrap();
        let (snap, _) = create(&snap, "b".into(), "a".into(), None, Map::new(), 2).unwrap();
        let (snap, _) = create(&snap, "c".into(), "a".into(), None, Map::new(), 3).unwrap();
        let ok = reorder(&snap, "a".into(), vec!["c".into(), "b".into()]);
        assert!(ok.is_ok());
        let bad = reorder(&snap, "a".into(), vec!["b".into()]);
        assert!(bad.is_err());
    }
}
