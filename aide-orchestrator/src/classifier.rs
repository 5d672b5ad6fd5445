//! Rule-based turn classifier (spec §4.2 step 2): six ordered rules, first
//! match wins, driven by `ClassifierConfig` data rather than hardcoded
//! phrase checks.

use crate::config::ClassifierConfig;
use aide_core::Snapshot;

/// A turn's assigned model tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Fast/cheap: the default for ordinary edits.
    L2,
    /// Mid/reasoning: structural changes (new sections, reorganizing).
    L3,
    /// Mid/reasoning, query-only: the snapshot is not expected to change.
    L4,
}

impl Tier {
    /// The wire name used in `classification` frames and config keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::L2 => "L2",
            Tier::L3 => "L3",
            Tier::L4 => "L4",
        }
    }
}

/// The tier plus which rule matched, for the `classification` frame's
/// `reason` field and telemetry.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Assigned tier.
    pub tier: Tier,
    /// Human-readable description of the matching rule.
    pub reason: String,
}

/// Classify a turn given the user's message and the current snapshot.
/// Rules are evaluated in order; the first match wins (spec §4.2 step 2).
pub fn classify(message: &str, snapshot: &Snapshot, config: &ClassifierConfig) -> Classification {
    let lower = message.to_lowercase();

    if let Some(subject) = new_entity_subject(&lower) {
        if !snapshot_has_matching_entity(snapshot, &subject) {
            return Classification {
                tier: Tier::L3,
                reason: format!("\"add a new {subject}\" with no existing match"),
            };
        }
    }

    if let Some(phrase) = config.structural_phrases.iter().find(|p| lower.contains(p.as_str())) {
        return Classification {
            tier: Tier::L3,
            reason: format!("structural phrase \"{phrase}\""),
        };
    }

    if lower.contains('?') || config.query_starters.iter().any(|s| lower.starts_with(s.as_str())) {
        return Classification {
            tier: Tier::L4,
            reason: "query phrasing".into(),
        };
    }

    if snapshot.entities.values().all(|e| e.removed) {
        return Classification {
            tier: Tier::L3,
            reason: "empty snapshot (first turn)".into(),
        };
    }

    if let Some(phrase) = config.domain_phrases.iter().find(|p| lower.contains(p.as_str())) {
        return Classification {
            tier: Tier::L3,
            reason: format!("domain-specific phrase \"{phrase}\""),
        };
    }

    if is_multi_item_introduction(&lower, config) {
        return Classification {
            tier: Tier::L3,
            reason: "multi-item introduction".into(),
        };
    }

    Classification {
        tier: Tier::L2,
        reason: "default".into(),
    }
}

/// Extract the subject of an `"add a new X"` phrasing, if present.
fn new_entity_subject(lower: &str) -> Option<String> {
    let marker = "add a new ";
    let start = lower.find(marker)? + marker.len();
    let rest = &lower[start..];
    let subject: String = rest
        .split(|c: char| matches!(c, '.' | ',' | '!' | '?'))
        .next()
        .unwrap_or("")
        .trim()
        .to_string();
    if subject.is_empty() {
        None
    } else {
        Some(subject)
    }
}

/// Whether any live entity's display text or props look like they already
/// represent `subject` (a coarse substring match; the classifier only needs
/// to decide "does something like this already exist", not identify it).
fn snapshot_has_matching_entity(snapshot: &Snapshot, subject: &str) -> bool {
    snapshot.entities.values().filter(|e| !e.removed).any(|e| {
        e.display.as_deref().is_some_and(|d| d.to_lowercase().contains(subject))
            || e.props.values().any(|v| v.as_str().is_some_and(|s| s.to_lowercase().contains(subject)))
    })
}

/// Rule 6: ≥N comma-separated segments or ≥M numeric segments, introduced
/// by one of the configured intro words, with no existing table (this crate
/// treats "no existing table" as "the snapshot has no live entities", since
/// a dedicated table/list concept is an application-level convention built
/// on top of the entity tree, not a primitive this crate tracks).
fn is_multi_item_introduction(lower: &str, config: &ClassifierConfig) -> bool {
    if !config.intro_words.iter().any(|w| lower.contains(w.as_str())) {
        return false;
    }
    let comma_segments = lower.split(',').filter(|s| !s.trim().is_empty()).count();
    let numeric_segments = lower
        .split(|c: char| matches!(c, ',' | ' '))
        .filter(|s| s.chars().any(|c| c.is_ascii_digit()))
        .count();
    comma_segments >= config.min_comma_segments || numeric_segments >= config.min_numeric_segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use aide_core::{Entity, EntityId};

    fn snapshot_with_entity(display: &str) -> Snapshot {
        let mut snapshot = Snapshot::empty();
        let id = EntityId::from("e1");
        snapshot
            .entities
            .insert(id.clone(), Entity::new(id.clone(), EntityId::root(), Some(display.into()), 1));
        snapshot.root_children.push(id);
        snapshot
    }

    #[test]
    fn new_subject_with_no_match_is_l3() {
        let config = ClassifierConfig::default();
        let snapshot = Snapshot::empty();
        let c = classify("add a new roster", &snapshot, &config);
        assert_eq!(c.tier, Tier::L3);
    }

    #[test]
    fn new_subject_already_present_falls_through() {
        let config = ClassifierConfig::default();
        let snapshot = snapshot_with_entity("roster");
        let c = classify("add a new roster entry for Sam", &snapshot, &config);
        // "roster" already exists, so rule 1 doesn't fire; rule 4 also
        // doesn't fire since the snapshot isn't empty. Falls through to L2.
        assert_eq!(c.tier, Tier::L2);
    }

    #[test]
    fn question_mark_is_l4() {
        let config = ClassifierConfig::default();
        let snapshot = snapshot_with_entity("roster");
        let c = classify("how many players are on the roster?", &snapshot, &config);
        assert_eq!(c.tier, Tier::L4);
    }

    #[test]
    fn empty_snapshot_is_l3() {
        let config = ClassifierConfig::default();
        let snapshot = Snapshot::empty();
        let c = classify("let's get started", &snapshot, &config);
        assert_eq!(c.tier, Tier::L3);
    }

    #[test]
    fn ordinary_edit_is_l2() {
        let config = ClassifierConfig::default();
        let snapshot = snapshot_with_entity("roster");
        let c = classify("mark Sam as out for this week", &snapshot, &config);
        assert_eq!(c.tier, Tier::L2);
    }

    #[test]
    fn multi_item_introduction_is_l3() {
        let config = ClassifierConfig::default();
        let snapshot = snapshot_with_entity("roster");
        let c = classify("here are the scores: 10, 12, 14, 9", &snapshot, &config);
        assert_eq!(c.tier, Tier::L3);
    }
}
