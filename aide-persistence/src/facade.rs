//! The hydration/persistence facade contract (spec §4.4).
//!
//! Deliberately minimal, following the reference workspace's `StateStore`
//! trait: an opaque store with a handful of coarse operations. Concrete
//! backends (filesystem, in-memory, a future database) live in separate
//! crates; an orchestrator only ever depends on this trait.

use crate::error::PersistenceError;
use crate::types::{ConversationMessage, ForkResult, HydrateResponse, PublishOptions, TurnLoad};
use aide_core::{AideId, Event, Snapshot};
use async_trait::async_trait;

/// Identifies the caller of a facade operation, for the access-control check
/// spec §4.4 requires ("callers only touch aides they own"). The concrete
/// shape of identity (bearer token, row-level policy, …) is an external
/// collaborator's concern; this crate only needs an opaque comparable owner
/// id to enforce the contract in its reference backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

/// Opaque store for one or more aides' snapshots, event logs, conversation
/// history, and published artifacts (spec §4.4, §6.3).
#[async_trait]
pub trait PersistenceFacade: Send + Sync {
    /// Cold-load an aide: materialized snapshot, full event log, blueprint,
    /// conversation history, and the snapshot's content hash. No replay —
    /// the snapshot is already materialized (spec §6.2).
    async fn hydrate(&self, caller: &CallerId, aide_id: &AideId) -> Result<HydrateResponse, PersistenceError>;

    /// Load what a turn needs to begin: the materialized snapshot plus a
    /// short conversation tail. Called inside the per-aide lock (spec §4.2
    /// step 1); `tail_len` is the caller's chosen window (5..10 typical).
    async fn load_for_turn(&self, caller: &CallerId, aide_id: &AideId, tail_len: usize) -> Result<TurnLoad, PersistenceError>;

    /// Atomically append `applied_events`, overwrite the materialized
    /// snapshot, and record the user message plus assistant summary.
    /// Atomic with respect to a single aide: either every appended event and
    /// the new snapshot commit, or none do (spec §6.3).
    async fn persist_turn(
        &self,
        caller: &CallerId,
        aide_id: &AideId,
        applied_events: &[Event],
        new_snapshot: &Snapshot,
        user_message: ConversationMessage,
        assistant_summary: ConversationMessage,
    ) -> Result<(), PersistenceError>;

    /// Copy rendered bytes to a public, cached surface keyed by `slug`.
    async fn publish(
        &self,
        caller: &CallerId,
        aide_id: &AideId,
        slug: &str,
        rendered_bytes: &[u8],
        options: PublishOptions,
    ) -> Result<(), PersistenceError>;

    /// Deep-clone `aide_id`'s snapshot and blueprint into a new aide; the new
    /// aide's event log and conversation start empty. The new aide's meta
    /// records `{parent_aide, forked_at_sequence}` (spec_full §9 lineage
    /// bookkeeping).
    async fn fork(&self, caller: &CallerId, aide_id: &AideId) -> Result<ForkResult, PersistenceError>;
}
