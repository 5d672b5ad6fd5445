//! The always-`Ok` result of applying one event.

use crate::codes::{Rejection, Warning};
use crate::snapshot::Snapshot;

/// The result of `reduce(snapshot, event)`. Never a Rust `Err` — failures
/// are structured data in `rejection`, matching the contract that the
/// reducer never propagates errors (spec §4.1, §7).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct ReduceResult {
    /// The resulting snapshot. Equal to the input snapshot if `applied` is
    /// false.
    pub snapshot: Snapshot,
    /// Whether the event was applied and (by the caller) appendable to the log.
    pub applied: bool,
    /// Non-fatal warnings attached to an applied event.
    pub warnings: Vec<Warning>,
    /// Set exactly when `applied` is false.
    pub rejection: Option<Rejection>,
}

impl ReduceResult {
    /// Build a result for an applied event.
    pub fn applied(snapshot: Snapshot, warnings: Vec<Warning>) -> Self {
        Self {
            snapshot,
            applied: true,
            warnings,
            rejection: None,
        }
    }

    /// Build a result for a rejected event: the snapshot is returned
    /// unchanged.
    pub fn rejected(snapshot: Snapshot, rejection: Rejection) -> Self {
        Self {
            snapshot,
            applied: false,
            warnings: Vec::new(),
            rejection: Some(rejection),
        }
    }
}
