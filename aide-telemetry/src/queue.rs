//! Bounded, single-consumer telemetry queue with a drop-oldest overflow
//! policy (spec §4.3, §9 "Bounded queue with drop-oldest").

use crate::record::TelemetryRecord;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// A bounded FIFO of pending telemetry records. Many producers call
/// [`TelemetryQueue::enqueue`] (non-blocking, O(1)); one background drainer
/// calls [`TelemetryQueue::drain_batch`].
pub struct TelemetryQueue {
    inner: Mutex<VecDeque<TelemetryRecord>>,
    capacity: usize,
    dropped: AtomicU64,
    notify: Notify,
}

impl TelemetryQueue {
    /// Construct an empty queue with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            dropped: AtomicU64::new(0),
            notify: Notify::new(),
        }
    }

    /// Enqueue one record. If the queue is full, the oldest record is
    /// dropped (favoring recency) and a warning is logged; the caller never
    /// blocks and never sees an error.
    pub fn enqueue(&self, record: TelemetryRecord) {
        let mut guard = self.inner.lock().expect("telemetry queue mutex poisoned");
        if guard.len() >= self.capacity {
            guard.pop_front();
            let total_dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(
                capacity = self.capacity,
                total_dropped,
                "telemetry queue full, dropping oldest record"
            );
        }
        guard.push_back(record);
        drop(guard);
        self.notify.notify_one();
    }

    /// Remove up to `max` records from the front of the queue.
    pub fn drain_batch(&self, max: usize) -> Vec<TelemetryRecord> {
        let mut guard = self.inner.lock().expect("telemetry queue mutex poisoned");
        let n = max.min(guard.len());
        guard.drain(..n).collect()
    }

    /// Current number of buffered records.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("telemetry queue mutex poisoned").len()
    }

    /// Whether the queue currently holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total records dropped to overflow since construction.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Wait until a record is enqueued, or return immediately if one
    /// already arrived since the last wait. Used by the background
    /// drainer's select loop.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{EventType, TelemetryRecord};

    fn rec(message_id: &str) -> TelemetryRecord {
        TelemetryRecord {
            message_id: message_id.to_string(),
            ..TelemetryRecord::new("aide_1", EventType::LlmCall)
        }
    }

    #[test]
    fn overflow_drops_oldest_and_counts() {
        let q = TelemetryQueue::new(3);
        for i in 0..5 {
            q.enqueue(rec(&i.to_string()));
        }
        assert_eq!(q.len(), 3);
        assert_eq!(q.dropped_count(), 2);
        let batch = q.drain_batch(10);
        let ids: Vec<_> = batch.iter().map(|r| r.message_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "4"]);
    }

    #[test]
    fn drain_batch_caps_at_requested_size() {
        let q = TelemetryQueue::new(10);
        for i in 0..5 {
            q.enqueue(rec(&i.to_string()));
        }
        let batch = q.drain_batch(2);
        assert_eq!(batch.len(), 2);
        assert_eq!(q.len(), 3);
    }
}
