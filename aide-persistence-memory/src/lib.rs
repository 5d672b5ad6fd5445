#![deny(missing_docs)]
//! In-memory implementation of the hydration/persistence facade.
//!
//! Uses a `HashMap` behind a `tokio::sync::RwLock`, mirroring the reference
//! workspace's in-memory state store. Suitable for testing, prototyping, and
//! single-process use where persistence across restarts is not required.

use aide_core::{snapshot_hash, AideId, Event, Snapshot};
use aide_persistence::{
    Blueprint, CallerId, ConversationMessage, ForkResult, HydrateResponse, PersistenceError, PersistenceFacade,
    PublishOptions, TurnLoad,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

struct AideRecord {
    owner: CallerId,
    snapshot: Snapshot,
    events: Vec<Event>,
    blueprint: Blueprint,
    messages: Vec<ConversationMessage>,
    published: HashMap<String, Vec<u8>>,
}

/// In-memory persistence facade backed by a `HashMap` behind a `RwLock`.
pub struct MemoryPersistence {
    aides: RwLock<HashMap<AideId, AideRecord>>,
    next_fork_suffix: std::sync::atomic::AtomicU64,
}

impl MemoryPersistence {
    /// Construct an empty store.
    pub fn new() -> Self {
        Self {
            aides: RwLock::new(HashMap::new()),
            next_fork_suffix: std::sync::atomic::AtomicU64::new(1),
        }
    }

    /// Seed a new aide with an initial snapshot and blueprint, owned by
    /// `owner`. Test/setup helper; the facade contract itself has no
    /// "create" operation (aide creation is an external collaborator's
    /// concern — account provisioning, not state management).
    pub async fn seed(&self, owner: CallerId, aide_id: AideId, snapshot: Snapshot, blueprint: Blueprint) {
        let mut aides = self.aides.write().await;
        aides.insert(
            aide_id,
            AideRecord {
                owner,
                snapshot,
                events: Vec::new(),
                blueprint,
                messages: Vec::new(),
                published: HashMap::new(),
            },
        );
    }

    fn check_owner(record: &AideRecord, caller: &CallerId, aide_id: &AideId) -> Result<(), PersistenceError> {
        if &record.owner != caller {
            return Err(PersistenceError::AccessDenied(aide_id.to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistenceFacade for MemoryPersistence {
    async fn hydrate(&self, caller: &CallerId, aide_id: &AideId) -> Result<HydrateResponse, PersistenceError> {
        let aides = self.aides.read().await;
        let record = aides
            .get(aide_id)
            .ok_or_else(|| PersistenceError::NotFound(aide_id.to_string()))?;
        Self::check_owner(record, caller, aide_id)?;
        Ok(HydrateResponse {
            snapshot: record.snapshot.clone(),
            events: record.events.clone(),
            blueprint: record.blueprint.clone(),
            messages: record.messages.clone(),
            snapshot_hash: snapshot_hash(&record.snapshot),
        })
    }

    async fn load_for_turn(&self, caller: &CallerId, aide_id: &AideId, tail_len: usize) -> Result<TurnLoad, PersistenceError> {
        let aides = self.aides.read().await;
        let record = aides
            .get(aide_id)
            .ok_or_else(|| PersistenceError::NotFound(aide_id.to_string()))?;
        Self::check_owner(record, caller, aide_id)?;
        let start = record.messages.len().saturating_sub(tail_len);
        Ok(TurnLoad {
            snapshot: record.snapshot.clone(),
            conversation_tail: record.messages[start..].to_vec(),
            blueprint: record.blueprint.clone(),
        })
    }

    async fn persist_turn(
        &self,
        caller: &CallerId,
        aide_id: &AideId,
        applied_events: &[Event],
        new_snapshot: &Snapshot,
        user_message: ConversationMessage,
        assistant_summary: ConversationMessage,
    ) -> Result<(), PersistenceError> {
        let mut aides = self.aides.write().await;
        let record = aides
            .get_mut(aide_id)
            .ok_or_else(|| PersistenceError::NotFound(aide_id.to_string()))?;
        Self::check_owner(record, caller, aide_id)?;
        record.events.extend_from_slice(applied_events);
        record.snapshot = new_snapshot.clone();
        record.messages.push(user_message);
        record.messages.push(assistant_summary);
        Ok(())
    }

    async fn publish(
        &self,
        caller: &CallerId,
        aide_id: &AideId,
        slug: &str,
        rendered_bytes: &[u8],
        _options: PublishOptions,
    ) -> Result<(), PersistenceError> {
        let mut aides = self.aides.write().await;
        let record = aides
            .get_mut(aide_id)
            .ok_or_else(|| PersistenceError::NotFound(aide_id.to_string()))?;
        Self::check_owner(record, caller, aide_id)?;
        record.published.insert(slug.to_string(), rendered_bytes.to_vec());
        Ok(())
    }

    async fn fork(&self, caller: &CallerId, aide_id: &AideId) -> Result<ForkResult, PersistenceError> {
        let mut aides = self.aides.write().await;
        let parent = aides
            .get(aide_id)
            .ok_or_else(|| PersistenceError::NotFound(aide_id.to_string()))?;
        Self::check_owner(parent, caller, aide_id)?;

        let mut forked_snapshot = parent.snapshot.clone();
        let forked_at_sequence = parent.snapshot.sequence;
        forked_snapshot
            .meta
            .fields
            .insert("parent_aide".to_string(), serde_json::Value::String(aide_id.to_string()));
        forked_snapshot.meta.fields.insert(
            "forked_at_sequence".to_string(),
            serde_json::Value::Number(forked_at_sequence.into()),
        );
        let blueprint = parent.blueprint.clone();
        let owner = caller.clone();

        let suffix = self.next_fork_suffix.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let new_aide_id = AideId::new(format!("{aide_id}-fork-{suffix}"));

        aides.insert(
            new_aide_id.clone(),
            AideRecord {
                owner,
                snapshot: forked_snapshot,
                events: Vec::new(),
                blueprint,
                messages: Vec::new(),
                published: HashMap::new(),
            },
        );

        Ok(ForkResult {
            new_aide_id,
            forked_at_sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aide_persistence::Role;

    fn caller(id: &str) -> CallerId {
        CallerId(id.to_string())
    }

    #[tokio::test]
    async fn hydrate_returns_seeded_state_with_stable_hash() {
        let store = MemoryPersistence::new();
        let snapshot = Snapshot::empty();
        store
            .seed(caller("user_1"), AideId::new("aide_1"), snapshot.clone(), Blueprint::default())
            .await;

        let response = store.hydrate(&caller("user_1"), &AideId::new("aide_1")).await.unwrap();
        assert_eq!(response.snapshot_hash, snapshot_hash(&snapshot));
        assert!(response.events.is_empty());
    }

    #[tokio::test]
    async fn hydrate_rejects_non_owner() {
        let store = MemoryPersistence::new();
        store
            .seed(caller("user_1"), AideId::new("aide_1"), Snapshot::empty(), Blueprint::default())
            .await;

        let result = store.hydrate(&caller("user_2"), &AideId::new("aide_1")).await;
        assert!(matches!(result, Err(PersistenceError::AccessDenied(_))));
    }

    #[tokio::test]
    async fn persist_turn_appends_events_and_messages() {
        let store = MemoryPersistence::new();
        let aide_id = AideId::new("aide_1");
        store.seed(caller("user_1"), aide_id.clone(), Snapshot::empty(), Blueprint::default()).await;

        let mut snapshot = Snapshot::empty();
        snapshot.sequence = 1;
        store
            .persist_turn(
                &caller("user_1"),
                &aide_id,
                &[],
                &snapshot,
                ConversationMessage::new(Role::User, "hello", "t0"),
                ConversationMessage::new(Role::Assistant, "hi", "t1"),
            )
            .await
            .unwrap();

        let loaded = store.load_for_turn(&caller("user_1"), &aide_id, 5).await.unwrap();
        assert_eq!(loaded.snapshot.sequence, 1);
        assert_eq!(loaded.conversation_tail.len(), 2);
    }

    #[tokio::test]
    async fn fork_clones_snapshot_and_records_lineage() {
        let store = MemoryPersistence::new();
        let aide_id = AideId::new("aide_1");
        let mut snapshot = Snapshot::empty();
        snapshot.sequence = 7;
        store.seed(caller("user_1"), aide_id.clone(), snapshot, Blueprint::default()).await;

        let result = store.fork(&caller("user_1"), &aide_id).await.unwrap();
        assert_eq!(result.forked_at_sequence, 7);

        let hydrated = store.hydrate(&caller("user_1"), &result.new_aide_id).await.unwrap();
        assert!(hydrated.events.is_empty());
        assert_eq!(
            hydrated.snapshot.meta.fields.get("parent_aide").and_then(|v| v.as_str()),
            Some(aide_id.as_str())
        );
    }
}
