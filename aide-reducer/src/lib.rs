//! The pure AIde reducer: `reduce(snapshot, event) -> ReduceResult`.
//!
//! No I/O, no clocks, no randomness, no global state — every failure mode
//! is returned as data on [`ReduceResult`], never as a Rust `Err` at this
//! crate's public boundary. Internally, each primitive's implementation
//! uses `Result` for ordinary `?`-based control flow; [`reduce`] collapses
//! that into the always-`Ok` result shape the rest of the system expects.

#![deny(missing_docs)]

mod constraints;
mod entity_ops;
mod ids;
mod meta_ops;
mod rel_ops;
mod schema_ops;

use aide_core::{Event, Primitive, Rejection, RejectionCode, ReduceResult, Snapshot, Warning};

type OpResult = Result<(Snapshot, Vec<Warning>), Rejection>;

/// Apply one event to a snapshot, returning the resulting snapshot, whether
/// it was applied, any warnings, and an optional rejection code.
///
/// Determinism (spec invariants 1, 2, 8): calling `reduce` repeatedly with
/// the same `(snapshot, event)` pair yields byte-identical results, since
/// every branch below is a pure function of its inputs.
pub fn reduce(snapshot: &Snapshot, event: &Event) -> ReduceResult {
    let seq = event.sequence;
    let result: OpResult = match &event.primitive {
        Primitive::EntityCreate {
            id,
            parent,
            display,
            props,
        } => entity_ops::create(snapshot, id.clone(), parent.clone(), display.clone(), props.clone(), seq),
        Primitive::EntityUpdate { entity_ref, props } => {
            entity_ops::update(snapshot, entity_ref.clone(), props.clone(), seq)
        }
        Primitive::EntityRemove { entity_ref } => entity_ops::remove(snapshot, entity_ref.clone(), seq),
        Primitive::EntityMove {
            entity_ref,
            new_parent,
            position,
        } => entity_ops::move_entity(snapshot, entity_ref.clone(), new_parent.clone(), *position, seq),
        Primitive::EntityReorder { parent, children } => {
            entity_ops::reorder(snapshot, parent.clone(), children.clone())
        }
        Primitive::RelSet {
            from,
            to,
            rel_type,
            cardinality,
        } => rel_ops::set(snapshot, from.clone(), to.clone(), rel_type.clone(), *cardinality),
        Primitive::RelRemove { from, to, rel_type } => {
            rel_ops::remove(snapshot, from.clone(), to.clone(), rel_type.clone())
        }
        Primitive::RelConstrain { id, rule, strict } => {
            meta_ops::register_constraint(snapshot, id.clone(), rule.clone(), *strict)
        }
        Primitive::StyleSet { styles } => meta_ops::style_set(snapshot, styles.clone()),
        Primitive::StyleEntity { entity_ref, styles } => {
            meta_ops::style_entity(snapshot, entity_ref.clone(), styles.clone())
        }
        Primitive::MetaSet { fields } => meta_ops::meta_set(snapshot, fields.clone()),
        Primitive::MetaAnnotate { note, pinned } => {
            meta_ops::meta_annotate(snapshot, note.clone(), *pinned, seq, event.timestamp.clone())
        }
        Primitive::MetaConstrain { id, rule, strict } => {
            meta_ops::register_constraint(snapshot, id.clone(), rule.clone(), *strict)
        }
        Primitive::SchemaCreate { id, schema } => schema_ops::create(snapshot, id.clone(), schema.clone()),
        Primitive::SchemaUpdate { id, schema } => schema_ops::update(snapshot, id.clone(), schema.clone()),
        Primitive::SchemaRemove { id } => schema_ops::remove(snapshot, id.clone()),
        // Signals pass through: no mutation, but they still occupy a
        // sequence slot once applied (see `finish` below).
        Primitive::Voice { .. } | Primitive::Escalate { .. } | Primitive::BatchStart | Primitive::BatchEnd => {
            Ok((snapshot.clone(), Vec::new()))
        }
    };
    finish(snapshot, result, seq)
}

/// Run the post-mutation constraint pass and assign the snapshot's sequence
/// number, or fall back to the unchanged input snapshot on rejection.
fn finish(original: &Snapshot, result: OpResult, seq: u64) -> ReduceResult {
    match result {
        Err(rejection) => ReduceResult::rejected(original.clone(), rejection),
        Ok((mut snapshot, mut warnings)) => {
            let (constraint_warnings, strict_violations) = constraints::check_all(&snapshot);
            if let Some(violated) = strict_violations.first() {
                let detail = constraints::describe(&violated.rule);
                return ReduceResult::rejected(
                    original.clone(),
                    Rejection::new(RejectionCode::StrictConstraintViolated, detail),
                );
            }
            warnings.extend(constraint_warnings);
            snapshot.sequence = seq;
            ReduceResult::applied(snapshot, warnings)
        }
    }
}

/// Fold a full event log onto the empty snapshot, applying each event in
/// order. Used by determinism/replay tests and by the persistence facade's
/// cold-load reconciliation path. Rejected events are skipped, mirroring
/// the fact that they are never appended to the authoritative log in the
/// first place.
pub fn replay<'a>(events: impl IntoIterator<Item = &'a Event>) -> Snapshot {
    let mut snapshot = Snapshot::empty();
    for event in events {
        let result = reduce(&snapshot, event);
        snapshot = result.snapshot;
    }
    snapshot
}
