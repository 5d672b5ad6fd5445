//! Property tests over random event sequences, checking invariants 3-6
//! hold after every applied step, not just at designed checkpoints.

use aide_core::{Cardinality, Event, EntityId, Primitive, Snapshot};
use aide_reducer::reduce;
use proptest::prelude::*;

const IDS: &[&str] = &["e0", "e1", "e2", "e3", "e4"];
const REL_TYPES: &[&str] = &["member_of", "tagged"];

#[derive(Debug, Clone)]
enum Op {
    Create { id: usize, parent: usize },
    Move { id: usize, new_parent: usize },
    Reorder { parent: usize },
    RelSet { from: usize, to: usize, rel_type: usize, cardinality: Cardinality },
}

fn entity_id(ix: usize) -> EntityId {
    IDS[ix].into()
}

fn parent_choice() -> impl Strategy<Value = usize> {
    // 0..=4 picks an entity id; 5 means "root".
    0..=5usize
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..IDS.len(), parent_choice()).prop_map(|(id, parent)| Op::Create { id, parent }),
        (0..IDS.len(), 0..IDS.len()).prop_map(|(id, new_parent)| Op::Move { id, new_parent }),
        (0..IDS.len()).prop_map(|parent| Op::Reorder { parent }),
        (
            0..IDS.len(),
            0..IDS.len(),
            0..REL_TYPES.len(),
            prop_oneof![
                Just(Cardinality::OneToOne),
                Just(Cardinality::OneToMany),
                Just(Cardinality::ManyToOne),
                Just(Cardinality::ManyToMany),
            ],
        )
            .prop_map(|(from, to, rel_type, cardinality)| Op::RelSet { from, to, rel_type, cardinality }),
    ]
}

fn to_primitive(op: &Op, snapshot: &Snapshot) -> Primitive {
    match *op {
        Op::Create { id, parent } => Primitive::EntityCreate {
            id: entity_id(id),
            parent: if parent == 5 { EntityId::root() } else { entity_id(parent) },
            display: None,
            props: Default::default(),
        },
        Op::Move { id, new_parent } => Primitive::EntityMove {
            entity_ref: entity_id(id),
            new_parent: entity_id(new_parent),
            position: None,
        },
        Op::Reorder { parent } => {
            let parent_id = entity_id(parent);
            let mut children: Vec<EntityId> = snapshot
                .entities
                .values()
                .filter(|e| !e.removed && e.parent == parent_id)
                .map(|e| e.id.clone())
                .collect();
            children.reverse();
            Primitive::EntityReorder { parent: parent_id, children }
        }
        Op::RelSet { from, to, rel_type, cardinality } => Primitive::RelSet {
            from: entity_id(from),
            to: entity_id(to),
            rel_type: REL_TYPES[rel_type].to_string(),
            cardinality: Some(cardinality),
        },
    }
}

fn ancestor_chain_reaches_root(snapshot: &Snapshot, start: &EntityId) -> bool {
    let mut current = start.clone();
    for _ in 0..=snapshot.entities.len() {
        if current.is_root() {
            return true;
        }
        match snapshot.entities.get(&current) {
            Some(entity) => current = entity.parent.clone(),
            None => return false,
        }
    }
    false
}

fn assert_invariants(snapshot: &Snapshot) {
    for (id, entity) in &snapshot.entities {
        if entity.removed {
            continue;
        }
        // Invariant 3: parent resolves to a live entity or root.
        assert!(
            snapshot.is_live_or_root(&entity.parent),
            "entity {id} has a dangling parent {:?}",
            entity.parent
        );
        // Invariant 5: no cycle, root reachable within |entities| steps.
        assert!(ancestor_chain_reaches_root(snapshot, id), "entity {id} cannot reach root");
    }

    // Invariant 4: every parent's recorded children equal the live
    // insertion/reorder set of entities whose `parent` field points at it.
    for (parent_id, parent_entity) in &snapshot.entities {
        if parent_entity.removed {
            continue;
        }
        let expected: std::collections::BTreeSet<_> = snapshot
            .entities
            .values()
            .filter(|e| !e.removed && &e.parent == parent_id)
            .map(|e| e.id.clone())
            .collect();
        let actual: std::collections::BTreeSet<_> = parent_entity.children.iter().cloned().collect();
        assert_eq!(actual, expected, "children mismatch for {parent_id}");
    }
    let root_expected: std::collections::BTreeSet<_> = snapshot
        .entities
        .values()
        .filter(|e| !e.removed && e.parent.is_root())
        .map(|e| e.id.clone())
        .collect();
    let root_actual: std::collections::BTreeSet<_> = snapshot.root_children.iter().cloned().collect();
    assert_eq!(root_actual, root_expected, "root_children mismatch");

    // Invariant 6: relationship endpoints are live (or root), and
    // registered cardinality holds.
    for tuple in &snapshot.relationships.tuples {
        assert!(snapshot.is_live_or_root(&tuple.from), "relationship from a dangling entity");
        assert!(snapshot.is_live_or_root(&tuple.to), "relationship to a dangling entity");
    }
    for (rel_type, cardinality) in &snapshot.relationships.cardinality {
        let same_type: Vec<_> = snapshot.relationships.tuples.iter().filter(|t| &t.rel_type == rel_type).collect();
        match cardinality {
            Cardinality::OneToOne => {
                let mut froms = std::collections::HashSet::new();
                let mut tos = std::collections::HashSet::new();
                for t in &same_type {
                    assert!(froms.insert(&t.from), "one_to_one source repeated for {rel_type}");
                    assert!(tos.insert(&t.to), "one_to_one target repeated for {rel_type}");
                }
            }
            Cardinality::OneToMany => {
                let mut tos = std::collections::HashSet::new();
                for t in &same_type {
                    assert!(tos.insert(&t.to), "one_to_many target repeated for {rel_type}");
                }
            }
            Cardinality::ManyToOne => {
                let mut froms = std::collections::HashSet::new();
                for t in &same_type {
                    assert!(froms.insert(&t.from), "many_to_one source repeated for {rel_type}");
                }
            }
            Cardinality::ManyToMany => {}
        }
    }
}

proptest! {
    #[test]
    fn invariants_hold_after_every_applied_event(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut snapshot = Snapshot::empty();
        let mut seq = 0u64;
        for op in &ops {
            let primitive = to_primitive(op, &snapshot);
            seq += 1;
            let event = Event::new(format!("evt_{seq}"), seq, "0", "proptest", "proptest", primitive);
            let result = reduce(&snapshot, &event);
            if result.applied {
                snapshot = result.snapshot;
                assert_invariants(&snapshot);
            }
        }
    }
}
