//! Background batched uploader: drains [`TelemetryQueue`] into a
//! time-partitioned JSONL sink, grouped by `aide_id` (spec §4.3).

use crate::config::TelemetryConfig;
use crate::error::TelemetryError;
use crate::queue::TelemetryQueue;
use crate::record::TelemetryRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// A destination for flushed telemetry batches, keyed by the
/// `flight-logs/{aide_id}/{YYYY-MM-DD}/{batch_id}.jsonl` layout. The
/// concrete backend (object storage, a local file, a test double) is an
/// external collaborator's concern; this crate only defines the contract.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Write one aide's batch of JSONL lines under the given key.
    async fn write_batch(&self, key: &str, jsonl: &str) -> Result<(), TelemetryError>;
}

/// Render one `aide_id`'s batch as newline-delimited JSON, and the storage
/// key it should be written under. `date` and `batch_id` are supplied by
/// the caller so this function stays free of clock access.
pub fn render_batch(aide_id: &str, date: &str, batch_id: &str, records: &[TelemetryRecord]) -> (String, String) {
    let key = format!("flight-logs/{aide_id}/{date}/{batch_id}.jsonl");
    let mut jsonl = String::new();
    for record in records {
        jsonl.push_str(&serde_json::to_string(record).expect("TelemetryRecord serialization is infallible"));
        jsonl.push('\n');
    }
    (key, jsonl)
}

fn group_by_aide(records: Vec<TelemetryRecord>) -> HashMap<String, Vec<TelemetryRecord>> {
    let mut grouped: HashMap<String, Vec<TelemetryRecord>> = HashMap::new();
    for record in records {
        grouped.entry(record.aide_id.clone()).or_default().push(record);
    }
    grouped
}

/// Drives the drain loop: wakes on enqueue or on the flush interval,
/// whichever comes first, and writes one batch per `aide_id` present in the
/// drained set.
pub struct Uploader<S: TelemetrySink> {
    queue: Arc<TelemetryQueue>,
    sink: S,
    config: TelemetryConfig,
}

impl<S: TelemetrySink> Uploader<S> {
    /// Construct an uploader over the given queue and sink.
    pub fn new(queue: Arc<TelemetryQueue>, sink: S, config: TelemetryConfig) -> Self {
        Self { queue, sink, config }
    }

    /// Run until `shutdown` is signaled, then drain whatever remains within
    /// the configured deadline. Never panics on sink failure: permanent
    /// failures are logged and the batch is dropped (spec §4.3 "must never
    /// crash the application").
    pub async fn run(self, mut shutdown: watch::Receiver<bool>, date_fn: impl Fn() -> String, batch_id_fn: impl Fn() -> String) {
        let mut last_flush = Instant::now();
        loop {
            tokio::select! {
                _ = self.queue.notified() => {}
                _ = tokio::time::sleep(self.config.flush_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }

            let ready_by_size = self.queue.len() >= self.config.batch_size;
            let ready_by_time = last_flush.elapsed() >= self.config.flush_interval;
            if ready_by_size || ready_by_time {
                self.flush_once(&date_fn, &batch_id_fn).await;
                last_flush = Instant::now();
            }
        }

        self.drain_with_deadline(&date_fn, &batch_id_fn).await;
    }

    async fn flush_once(&self, date_fn: &impl Fn() -> String, batch_id_fn: &impl Fn() -> String) {
        let batch = self.queue.drain_batch(self.config.batch_size);
        if batch.is_empty() {
            return;
        }
        self.write_grouped(batch, date_fn, batch_id_fn).await;
    }

    async fn drain_with_deadline(&self, date_fn: &impl Fn() -> String, batch_id_fn: &impl Fn() -> String) {
        let deadline = Instant::now() + self.config.shutdown_deadline;
        while Instant::now() < deadline && !self.queue.is_empty() {
            let remaining = self.queue.drain_batch(self.config.batch_size);
            if remaining.is_empty() {
                break;
            }
            self.write_grouped(remaining, date_fn, batch_id_fn).await;
        }
        if !self.queue.is_empty() {
            tracing::warn!(
                remaining = self.queue.len(),
                "telemetry shutdown deadline reached with records still queued"
            );
        }
    }

    async fn write_grouped(&self, batch: Vec<TelemetryRecord>, date_fn: &impl Fn() -> String, batch_id_fn: &impl Fn() -> String) {
        let date = date_fn();
        for (aide_id, records) in group_by_aide(batch) {
            let batch_id = batch_id_fn();
            let (key, jsonl) = render_batch(&aide_id, &date, &batch_id, &records);
            self.write_with_retry(&key, &jsonl).await;
        }
    }

    async fn write_with_retry(&self, key: &str, jsonl: &str) {
        match self.sink.write_batch(key, jsonl).await {
            Ok(()) => {}
            Err(first_err) => {
                tracing::warn!(key, error = %first_err, "telemetry batch write failed, retrying once");
                tokio::time::sleep(self.config.retry_backoff).await;
                if let Err(second_err) = self.sink.write_batch(key, jsonl).await {
                    tracing::warn!(key, error = %second_err, "telemetry batch permanently dropped after retry");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EventType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct RecordingSink {
        writes: Mutex<Vec<(String, String)>>,
        fail_first_n: AtomicUsize,
    }

    #[async_trait]
    impl TelemetrySink for RecordingSink {
        async fn write_batch(&self, key: &str, jsonl: &str) -> Result<(), TelemetryError> {
            if self.fail_first_n.load(Ordering::SeqCst) > 0 {
                self.fail_first_n.fetch_sub(1, Ordering::SeqCst);
                return Err(TelemetryError::SinkWrite("injected failure".into()));
            }
            self.writes.lock().unwrap().push((key.to_string(), jsonl.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn flush_once_groups_by_aide_and_writes() {
        let queue = Arc::new(TelemetryQueue::new(100));
        queue.enqueue(TelemetryRecord::new("aide_1", EventType::LlmCall));
        queue.enqueue(TelemetryRecord::new("aide_2", EventType::LlmCall));
        let sink = RecordingSink {
            writes: Mutex::new(Vec::new()),
            fail_first_n: AtomicUsize::new(0),
        };
        let uploader = Uploader::new(queue, sink, TelemetryConfig::default());
        uploader
            .flush_once(&|| "2026-07-27".to_string(), &|| "batch_1".to_string())
            .await;
        let writes = uploader.sink.writes.lock().unwrap();
        assert_eq!(writes.len(), 2);
        assert!(writes.iter().any(|(k, _)| k == "flight-logs/aide_1/2026-07-27/batch_1.jsonl"));
    }

    #[tokio::test]
    async fn retry_recovers_from_one_transient_failure() {
        let queue = Arc::new(TelemetryQueue::new(100));
        queue.enqueue(TelemetryRecord::new("aide_1", EventType::LlmCall));
        let sink = RecordingSink {
            writes: Mutex::new(Vec::new()),
            fail_first_n: AtomicUsize::new(1),
        };
        let mut config = TelemetryConfig::default();
        config.retry_backoff = std::time::Duration::from_millis(1);
        let uploader = Uploader::new(queue, sink, config);
        uploader
            .flush_once(&|| "2026-07-27".to_string(), &|| "batch_1".to_string())
            .await;
        assert_eq!(uploader.sink.writes.lock().unwrap().len(), 1);
    }
}
