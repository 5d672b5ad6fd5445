//! Per-aide mutual exclusion (spec §4.2, §5): a keyed mutex registry
//! serializing turns for one aide while leaving distinct aides independent.

use aide_core::AideId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{OwnedMutexGuard, Mutex as AsyncMutex};

/// Holds one `tokio::sync::Mutex` per aide, created lazily on first use.
/// The outer `std::sync::Mutex` only ever guards map insertion/lookup, which
/// is synchronous and brief; the actual per-turn exclusion is the inner
/// async mutex.
#[derive(Default)]
pub struct AideLockRegistry {
    locks: Mutex<HashMap<AideId, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of one turn, from load through persist (spec §4.2
/// "Per-aide serialization").
pub type AideLockGuard = OwnedMutexGuard<()>;

impl AideLockRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, aide_id: &AideId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().expect("aide lock registry poisoned");
        locks.entry(aide_id.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    /// Acquire the lock for `aide_id`, waiting up to `timeout`. Returns
    /// `None` on timeout, which the caller maps to a "busy" error (spec §4.2
    /// failure table: "Concurrent turn attempt on same aide").
    pub async fn acquire(&self, aide_id: &AideId, timeout: Duration) -> Option<AideLockGuard> {
        let mutex = self.entry(aide_id);
        tokio::time::timeout(timeout, mutex.lock_owned()).await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn distinct_aides_do_not_contend() {
        let registry = AideLockRegistry::new();
        let a = AideId::new("aide_a");
        let b = AideId::new("aide_b");
        let _guard_a = registry.acquire(&a, Duration::from_millis(50)).await.unwrap();
        let guard_b = registry.acquire(&b, Duration::from_millis(50)).await;
        assert!(guard_b.is_some());
    }

    #[tokio::test]
    async fn second_turn_on_same_aide_times_out() {
        let registry = AideLockRegistry::new();
        let a = AideId::new("aide_a");
        let _guard = registry.acquire(&a, Duration::from_millis(50)).await.unwrap();
        let second = registry.acquire(&a, Duration::from_millis(20)).await;
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn lock_is_reacquirable_after_release() {
        let registry = AideLockRegistry::new();
        let a = AideId::new("aide_a");
        {
            let _guard = registry.acquire(&a, Duration::from_millis(50)).await.unwrap();
        }
        let second = registry.acquire(&a, Duration::from_millis(50)).await;
        assert!(second.is_some());
    }
}
