use crate::errors::TrackError;
use crate::transport::Transport;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
    time::sleep,
};
use tracing::{error, warn};

#[derive(Debug, Clone)]
pub struct OutboxConfig {
    pub capacity: usize,
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            max_attempts: 3,
            base_backoff: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutboundRecord {
    pub table: String,
    pub record: Value,
}

/// A record that was never delivered.
#[derive(Debug)]
pub struct DeliveryFailure {
    pub table: String,
    pub record: Value,
    pub attempts: u32,
    pub error: TrackError,
}

/// Bounded FIFO queue drained by a background delivery task.
#[derive(Clone)]
pub struct Outbox {
    queue: mpsc::Sender<OutboundRecord>,
    failures: mpsc::UnboundedSender<DeliveryFailure>,
}

impl Outbox {
    pub fn spawn<T: Transport>(
        transport: T,
        config: OutboxConfig,
    ) -> (Self, mpsc::UnboundedReceiver<DeliveryFailure>, JoinHandle<()>) {
        let (queue, pending) = mpsc::channel(config.capacity.max(1));
        let (failures, failure_rx) = mpsc::unbounded_channel();

        let worker = tokio::spawn(drain(Arc::new(transport), config, pending, failures.clone()));

        (Self { queue, failures }, failure_rx, worker)
    }

    /// Hands a record to the worker without waiting.
    pub fn enqueue(&self, table: impl Into<String>, record: Value) {
        let item = OutboundRecord {
            table: table.into(),
            record,
        };
        let (item, error) = match self.queue.try_send(item) {
            Ok(()) => return,
            Err(TrySendError::Full(item)) => (item, TrackError::QueueFull),
            Err(TrySendError::Closed(item)) => (item, TrackError::QueueClosed),
        };
        warn!(table = %item.table, "dropping tracking record: {error}");
        report(&self.failures, item, 0, error);
    }
}

async fn drain<T: Transport>(
    transport: Arc<T>,
    config: OutboxConfig,
    mut pending: mpsc::Receiver<OutboundRecord>,
    failures: mpsc::UnboundedSender<DeliveryFailure>,
) {
    let max_attempts = config.max_attempts.max(1);

    while let Some(item) = pending.recv().await {
        let mut attempt = 1;
        loop {
            match transport.insert(&item.table, &item.record).await {
                Ok(()) => break,
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
                    let delay = config.base_backoff.saturating_mul(factor);
                    warn!(
                        table = %item.table,
                        attempt,
                        "insert failed, retrying in {delay:?}: {err}"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    error!(table = %item.table, attempt, "insert failed, dropping record: {err}");
                    report(&failures, item, attempt, err);
                    break;
                }
            }
        }
    }
}

fn report(
    failures: &mpsc::UnboundedSender<DeliveryFailure>,
    item: OutboundRecord,
    attempts: u32,
    error: TrackError,
) {
    // Nobody listening is fine; the log line already went out.
    let _ = failures.send(DeliveryFailure {
        table: item.table,
        record: item.record,
        attempts,
        error,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;
    use serde_json::json;

    fn fast() -> OutboxConfig {
        OutboxConfig {
            capacity: 16,
            max_attempts: 3,
            base_backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn delivers_in_fifo_order() {
        let transport = MemoryTransport::new();
        let (outbox, mut failures, worker) = Outbox::spawn(transport.clone(), fast());

        for n in 0..5 {
            outbox.enqueue("user_behavior", json!({ "n": n }));
        }
        drop(outbox);
        worker.await.unwrap();

        let order: Vec<i64> = transport
            .rows()
            .iter()
            .map(|(_, row)| row["n"].as_i64().unwrap())
            .collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        assert!(failures.try_recv().is_err());
    }

    #[tokio::test]
    async fn retries_transient_failures() {
        let transport = MemoryTransport::failing(2);
        let (outbox, mut failures, worker) = Outbox::spawn(transport.clone(), fast());

        outbox.enqueue("user_behavior", json!({ "event_type": "page_view" }));
        drop(outbox);
        worker.await.unwrap();

        assert_eq!(transport.attempts(), 3);
        assert_eq!(transport.rows().len(), 1);
        assert!(failures.try_recv().is_err());
    }

    #[tokio::test]
    async fn reports_after_exhausting_attempts() {
        let transport = MemoryTransport::failing(10);
        let (outbox, mut failures, worker) = Outbox::spawn(transport.clone(), fast());

        outbox.enqueue("user_behavior", json!({ "event_type": "page_view" }));
        drop(outbox);
        worker.await.unwrap();

        let failure = failures.recv().await.unwrap();
        assert_eq!(failure.attempts, 3);
        assert_eq!(failure.table, "user_behavior");
        assert!(transport.rows().is_empty());
    }

    #[tokio::test]
    async fn long_retry_budgets_run_to_completion() {
        let transport = MemoryTransport::failing(usize::MAX);
        let config = OutboxConfig {
            capacity: 4,
            max_attempts: 40,
            base_backoff: Duration::ZERO,
        };
        let (outbox, mut failures, worker) = Outbox::spawn(transport.clone(), config);

        outbox.enqueue("user_behavior", json!({ "event_type": "page_view" }));
        drop(outbox);
        worker.await.unwrap();

        let failure = failures.recv().await.unwrap();
        assert_eq!(failure.attempts, 40);
        assert_eq!(transport.attempts(), 40);
    }

    #[tokio::test]
    async fn rejected_inserts_are_not_retried() {
        let transport = MemoryTransport::rejecting(400);
        let (outbox, mut failures, worker) = Outbox::spawn(transport.clone(), fast());

        outbox.enqueue("user_behavior", json!({}));
        drop(outbox);
        worker.await.unwrap();

        let failure = failures.recv().await.unwrap();
        assert_eq!(failure.attempts, 1);
        assert!(matches!(failure.error, TrackError::Rejected { status: 400, .. }));
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test]
    async fn closed_queue_reports_immediately() {
        let (outbox, mut failures, worker) = Outbox::spawn(MemoryTransport::new(), fast());
        worker.abort();
        let _ = worker.await;

        outbox.enqueue("user_behavior", json!({ "late": true }));
        let failure = failures.recv().await.unwrap();
        assert_eq!(failure.attempts, 0);
        assert!(matches!(failure.error, TrackError::QueueClosed));
    }
}
