#![deny(missing_docs)]
//! Filesystem-backed implementation of the hydration/persistence facade.
//!
//! Each aide maps to a subdirectory under the root:
//!
//! ```text
//! root/
//!   <aide_id>/
//!     owner.json       — the CallerId that owns this aide
//!     blueprint.json
//!     snapshot.json     — materialized state, overwritten on each turn
//!     events.jsonl      — append-only event log, one Event per line
//!     messages.jsonl    — append-only conversation history
//!     published/<slug>.bin
//! ```
//!
//! Snapshot writes go through a temp-file-then-rename so a crash never
//! leaves `snapshot.json` partially written; the event log is appended after
//! (spec §6.3 "either all appended events and the new snapshot commit, or
//! none do" — on a crash between the two, the log may hold more events than
//! the snapshot reflects, which is safe because hydrate treats the snapshot,
//! not the log, as authoritative).

use aide_core::{AideId, Event, Snapshot};
use aide_persistence::{
    Blueprint, CallerId, ConversationMessage, ForkResult, HydrateResponse, PersistenceError, PersistenceFacade,
    PublishOptions, TurnLoad,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Filesystem-backed persistence facade, rooted at a directory.
pub struct FsPersistence {
    root: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct OwnerFile {
    owner: String,
}

impl FsPersistence {
    /// Construct a store rooted at `root`. Directories are created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn aide_dir(&self, aide_id: &AideId) -> PathBuf {
        self.root.join(aide_id.as_str())
    }

    fn write_err(e: std::io::Error) -> PersistenceError {
        PersistenceError::WriteFailed(e.to_string())
    }

    async fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await.map_err(Self::write_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(Self::write_err)
    }

    async fn append_line(path: &Path, line: &str) -> Result<(), PersistenceError> {
        use tokio::io::AsyncWriteExt;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| PersistenceError::WriteFailed(e.to_string()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| PersistenceError::WriteFailed(e.to_string()))?;
        file.write_all(b"\n").await.map_err(|e| PersistenceError::WriteFailed(e.to_string()))
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, PersistenceError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PersistenceError::WriteFailed(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| PersistenceError::Serialization(e.to_string()))
    }

    async fn read_jsonl<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, PersistenceError> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents
                .lines()
                .filter(|l| !l.is_empty())
                .map(|l| serde_json::from_str(l).map_err(|e| PersistenceError::Serialization(e.to_string())))
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(PersistenceError::WriteFailed(e.to_string())),
        }
    }

    async fn check_owner(&self, caller: &CallerId, aide_id: &AideId) -> Result<(), PersistenceError> {
        let owner_path = self.aide_dir(aide_id).join("owner.json");
        let owner: OwnerFile = Self::read_json(&owner_path)
            .await
            .map_err(|_| PersistenceError::NotFound(aide_id.to_string()))?;
        if owner.owner != caller.0 {
            return Err(PersistenceError::AccessDenied(aide_id.to_string()));
        }
        Ok(())
    }

    /// Seed a new aide's directory with an initial snapshot and blueprint,
    /// owned by `owner`. Test/setup helper, mirroring
    /// `MemoryPersistence::seed`; aide creation itself is an external
    /// collaborator's concern.
    pub async fn seed(&self, owner: CallerId, aide_id: &AideId, snapshot: &Snapshot, blueprint: &Blueprint) -> Result<(), PersistenceError> {
        let dir = self.aide_dir(aide_id);
        tokio::fs::create_dir_all(dir.join("published"))
            .await
            .map_err(|e| PersistenceError::WriteFailed(e.to_string()))?;
        Self::atomic_write(&dir.join("owner.json"), serde_json::to_string(&OwnerFile { owner: owner.0 }).unwrap().as_bytes()).await?;
        Self::atomic_write(&dir.join("blueprint.json"), serde_json::to_string(blueprint).unwrap().as_bytes()).await?;
        Self::atomic_write(&dir.join("snapshot.json"), serde_json::to_string(snapshot).unwrap().as_bytes()).await?;
        Ok(())
    }
}

#[async_trait]
impl PersistenceFacade for FsPersistence {
    async fn hydrate(&self, caller: &CallerId, aide_id: &AideId) -> Result<HydrateResponse, PersistenceError> {
        self.check_owner(caller, aide_id).await?;
        let dir = self.aide_dir(aide_id);
        let snapshot: Snapshot = Self::read_json(&dir.join("snapshot.json")).await?;
        let blueprint: Blueprint = Self::read_json(&dir.join("blueprint.json")).await?;
        let events: Vec<Event> = Self::read_jsonl(&dir.join("events.jsonl")).await?;
        let messages: Vec<ConversationMessage> = Self::read_jsonl(&dir.join("messages.jsonl")).await?;
        let hash = aide_core::snapshot_hash(&snapshot);
        Ok(HydrateResponse {
            snapshot,
            events,
            blueprint,
            messages,
            snapshot_hash: hash,
        })
    }

    async fn load_for_turn(&self, caller: &CallerId, aide_id: &AideId, tail_len: usize) -> Result<TurnLoad, PersistenceError> {
        self.check_owner(caller, aide_id).await?;
        let dir = self.aide_dir(aide_id);
        let snapshot: Snapshot = Self::read_json(&dir.join("snapshot.json")).await?;
        let blueprint: Blueprint = Self::read_json(&dir.join("blueprint.json")).await?;
        let mut messages: Vec<ConversationMessage> = Self::read_jsonl(&dir.join("messages.jsonl")).await?;
        let start = messages.len().saturating_sub(tail_len);
        let tail = messages.split_off(start);
        Ok(TurnLoad {
            snapshot,
            conversation_tail: tail,
            blueprint,
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
        self.check_owner(caller, aide_id).await?;
        let dir = self.aide_dir(aide_id);

        for event in applied_events {
            let line = serde_json::to_string(event).map_err(|e| PersistenceError::Serialization(e.to_string()))?;
            Self::append_line(&dir.join("events.jsonl"), &line).await?;
        }
        for message in [&user_message, &assistant_summary] {
            let line = serde_json::to_string(message).map_err(|e| PersistenceError::Serialization(e.to_string()))?;
            Self::append_line(&dir.join("messages.jsonl"), &line).await?;
        }

        let bytes = serde_json::to_vec(new_snapshot).map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        Self::atomic_write(&dir.join("snapshot.json"), &bytes).await
    }

    async fn publish(
        &self,
        caller: &CallerId,
        aide_id: &AideId,
        slug: &str,
        rendered_bytes: &[u8],
        _options: PublishOptions,
    ) -> Result<(), PersistenceError> {
        self.check_owner(caller, aide_id).await?;
        let path = self.aide_dir(aide_id).join("published").join(format!("{}.bin", sanitize_slug(slug)));
        Self::atomic_write(&path, rendered_bytes).await
    }

    async fn fork(&self, caller: &CallerId, aide_id: &AideId) -> Result<ForkResult, PersistenceError> {
        self.check_owner(caller, aide_id).await?;
        let dir = self.aide_dir(aide_id);
        let mut snapshot: Snapshot = Self::read_json(&dir.join("snapshot.json")).await?;
        let blueprint: Blueprint = Self::read_json(&dir.join("blueprint.json")).await?;
        let forked_at_sequence = snapshot.sequence;
        snapshot
            .meta
            .fields
            .insert("parent_aide".to_string(), serde_json::Value::String(aide_id.to_string()));
        snapshot
            .meta
            .fields
            .insert("forked_at_sequence".to_string(), serde_json::Value::Number(forked_at_sequence.into()));

        let new_aide_id = AideId::new(format!("{aide_id}-fork-{}", uniq_suffix()));
        self.seed(caller.clone(), &new_aide_id, &snapshot, &blueprint).await?;

        Ok(ForkResult {
            new_aide_id,
            forked_at_sequence,
        })
    }
}

fn sanitize_slug(slug: &str) -> String {
    slug.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn uniq_suffix() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}
