//! `schema.*` primitive semantics.

use crate::OpResult;
use aide_core::json::Value;
use aide_core::{Rejection, RejectionCode, Schema, SchemaId, Snapshot};

pub fn create(snapshot: &Snapshot, id: SchemaId, schema: Schema) -> OpResult {
    let mut snapshot = snapshot.clone();
    snapshot.schemas.insert(id, schema);
    Ok((snapshot, Vec::new()))
}

pub fn update(snapshot: &Snapshot, id: SchemaId, schema: Schema) -> OpResult {
    if !snapshot.schemas.contains_key(&id) {
        return Err(Rejection::new(RejectionCode::SchemaNotFound, id.to_string()));
    }
    let mut snapshot = snapshot.clone();
    snapshot.schemas.insert(id, schema);
    Ok((snapshot, Vec::new()))
}

pub fn remove(snapshot: &Snapshot, id: SchemaId) -> OpResult {
    if !snapshot.schemas.contains_key(&id) {
        return Err(Rejection::new(RejectionCode::SchemaNotFound, id.to_string()));
    }
    let in_use = snapshot.entities.values().any(|e| {
        !e.removed
            && matches!(e.props.get("schema"), Some(Value::String(s)) if s.as_str() == id.as_str())
    });
    if in_use {
        return Err(Rejection::new(RejectionCode::SchemaInUse, id.to_string()));
    }
    let mut snapshot = snapshot.clone();
    snapshot.schemas.remove(&id);
    Ok((snapshot, Vec::new()))
}
