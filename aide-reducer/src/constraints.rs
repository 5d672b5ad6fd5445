//! Constraint evaluation, shared by registration (`rel.constrain` /
//! `meta.constrain`) and by every subsequent mutating primitive.

use aide_core::{Constraint, ConstraintRule, Snapshot, Warning, WarningCode};
use std::collections::{HashMap, HashSet};

/// Evaluate every registered constraint against the current snapshot.
///
/// Returns the list of non-strict violations (as warnings) and, separately,
/// whether any *strict* constraint was violated — the caller decides what
/// to do with a strict violation (reject the whole event).
pub fn check_all(snapshot: &Snapshot) -> (Vec<Warning>, Vec<&Constraint>) {
    let mut warnings = Vec::new();
    let mut strict_violations = Vec::new();
    for constraint in snapshot.meta.constraints.values() {
        if violates(snapshot, &constraint.rule) {
            if constraint.strict {
                strict_violations.push(constraint);
            } else {
                warnings.push(Warning::new(
                    WarningCode::ConstraintViolated,
                    describe(&constraint.rule),
                ));
            }
        }
    }
    (warnings, strict_violations)
}

/// Whether `rule` is currently violated by `snapshot`.
pub fn violates(snapshot: &Snapshot, rule: &ConstraintRule) -> bool {
    match rule {
        ConstraintRule::ExcludePair { a, b, rel_type } => {
            let targets_a = live_targets(snapshot, a, rel_type);
            let targets_b = live_targets(snapshot, b, rel_type);
            !targets_a.is_disjoint(&targets_b)
        }
        ConstraintRule::RequireSame { a, b, rel_type } => {
            let targets_a = live_targets(snapshot, a, rel_type);
            let targets_b = live_targets(snapshot, b, rel_type);
            targets_a.is_disjoint(&targets_b)
        }
        ConstraintRule::MaxChildren { parent, max } => snapshot.live_children(parent).len() > *max,
        ConstraintRule::MinChildren { parent, min } => snapshot.live_children(parent).len() < *min,
        ConstraintRule::UniqueField { parent, field } => {
            let mut seen: HashMap<String, u32> = HashMap::new();
            for child in snapshot.live_children(parent) {
                if let Some(entity) = snapshot.live_entity(child) {
                    if let Some(value) = entity.props.get(field) {
                        if !value.is_null() {
                            let key = value.to_string();
                            *seen.entry(key).or_insert(0) += 1;
                        }
                    }
                }
            }
            seen.values().any(|&count| count > 1)
        }
        ConstraintRule::RequiredFields { path, fields } => subtree_ids(snapshot, path)
            .iter()
            .filter_map(|id| snapshot.live_entity(id))
            .any(|entity| {
                fields
                    .iter()
                    .any(|f| entity.props.get(f).is_none_or(|v| v.is_null()))
            }),
    }
}

fn live_targets(
    snapshot: &Snapshot,
    from: &aide_core::EntityId,
    rel_type: &str,
) -> HashSet<aide_core::EntityId> {
    snapshot
        .relationships
        .live_tuples(|id| snapshot.is_live_or_root(id))
        .filter(|t| &t.from == from && t.rel_type == rel_type)
        .map(|t| t.to.clone())
        .collect()
}

fn subtree_ids(snapshot: &Snapshot, root: &aide_core::EntityId) -> Vec<aide_core::EntityId> {
    let mut out = Vec::new();
    let mut frontier = vec![root.clone()];
    while let Some(id) = frontier.pop() {
        out.push(id.clone());
        for child in snapshot.live_children(&id) {
            frontier.push(child.clone());
        }
    }
    out
}

pub fn describe(rule: &ConstraintRule) -> String {
    match rule {
        ConstraintRule::ExcludePair { a, b, rel_type } => {
            format!("exclude_pair violated: {a} and {b} share a {rel_type} target")
        }
        ConstraintRule::RequireSame { a, b, rel_type } => {
            format!("require_same violated: {a} and {b} share no {rel_type} target")
        }
        ConstraintRule::MaxChildren { parent, max } => {
            format!("max_children violated: {parent} exceeds {max}")
        }
        ConstraintRule::MinChildren { parent, min } => {
            format!("min_children violated: {parent} below {min}")
        }
        ConstraintRule::UniqueField { parent, field } => {
            format!("unique_field violated: {parent}.{field} duplicated among siblings")
        }
        ConstraintRule::RequiredFields { path, fields } => {
            format!("required_fields violated under {path}: {fields:?}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aide_core::{Entity, EntityId};

    #[test]
    fn max_children_violation_detected() {
        let mut snap = Snapshot::empty();
        for i in 0..3 {
            let id = EntityId::from(format!("c{i}").as_str());
            let e = Entity::new(id.clone(), EntityId::root(), None, i as u64 + 1);
            snap.root_children.push(id.clone());
            snap.entities.insert(id, e);
        }
        let rule = ConstraintRule::MaxChildren {
            parent: EntityId::root(),
            max: 2,
        };
        assert!(violates(&snap, &rule));
    }

    #[test]
    fn unique_field_violation_detected() {
        let mut snap = Snapshot::empty();
        let mut a = Entity::new(EntityId::from("a"), EntityId::root(), None, 1);
        a.props.insert("slug".into(), serde_json::json!("x"));
        let mut b = Entity::new(EntityId::from("b"), EntityId::root(), None, 2);
        b.props.insert("slug".into(), serde_json::json!("x"));
        snap.root_children.push(EntityId::from("a"));
        snap.root_children.push(EntityId::from("b"));
        snap.entities.insert(EntityId::from("a"), a);
        snap.entities.insert(EntityId::from("b"), b);

        let rule = ConstraintRule::UniqueField {
            parent: EntityId::root(),
            field: "slug".to_string(),
        };
        assert!(violates(&snap, &rule));
    }
}
