//! Buffered write-back worker for audit events.
//!
//! Events are accepted synchronously from any task, buffered in memory, and
//! flushed to the repository either on a fixed interval or as soon as the
//! buffer reaches its configured capacity. A failed batch is requeued ahead
//! of newer events and retried on the next flush; `stop` drains whatever is
//! left.

use std::mem;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use common::{AppResult, AuditWorkerConfig};
use domain::AuditEvent;

use crate::repository::AuditEventRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Synchronous per-event forwarding path, independent of batching.
///
/// Used by `log_and_send` only; no retry, no ordering relative to the
/// buffered copy of the same event.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EventForwarder: Send + Sync {
    /// Forward a single event downstream.
    async fn forward(&self, event: &AuditEvent) -> AppResult<()>;
}

/// Buffered asynchronous audit event writer.
///
/// The buffer is only ever touched under its lock, and the lock is never held
/// across the repository call: a flush swaps the buffer for a fresh one under
/// the lock and writes the swapped-out batch lock-free, so producers are
/// never blocked by storage latency.
pub struct AuditWorker {
    capacity: usize,
    flush_interval: Duration,
    events: Arc<dyn AuditEventRepository>,
    forwarder: Option<Arc<dyn EventForwarder>>,
    buffer: Mutex<Vec<AuditEvent>>,
    wake_tx: mpsc::Sender<()>,
    wake_rx: Mutex<Option<mpsc::Receiver<()>>>,
    shutdown_tx: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl AuditWorker {
    /// Create a worker with an empty buffer. No background activity starts
    /// until `start` is called.
    pub fn new(
        config: AuditWorkerConfig,
        events: Arc<dyn AuditEventRepository>,
        forwarder: Option<Arc<dyn EventForwarder>>,
    ) -> Self {
        // Capacity 1 coalesces wake-ups: a pending signal already covers
        // every event injected before the loop gets to it.
        let (wake_tx, wake_rx) = mpsc::channel(1);
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            capacity: config.buffer_capacity,
            flush_interval: Duration::from_millis(config.flush_interval_ms),
            events,
            forwarder,
            buffer: Mutex::new(Vec::with_capacity(config.buffer_capacity)),
            wake_tx,
            wake_rx: Mutex::new(Some(wake_rx)),
            shutdown_tx,
            handle: Mutex::new(None),
        }
    }

    /// Launch the flush loop. Call at most once; a second call logs a warning
    /// and does nothing.
    pub async fn start(self: Arc<Self>) {
        let Some(wake_rx) = self.wake_rx.lock().await.take() else {
            warn!("audit worker already started");
            return;
        };

        info!(
            capacity = self.capacity,
            interval_ms = self.flush_interval.as_millis() as u64,
            "starting audit worker"
        );

        let worker = Arc::clone(&self);
        *self.handle.lock().await = Some(tokio::spawn(worker.run(wake_rx)));
    }

    /// Stop the flush loop and drain the buffer.
    ///
    /// Returns the error of the final flush; events still buffered after a
    /// failed drain are lost when the process exits. Not cancellable: a
    /// hanging repository call during the drain blocks this method.
    /// Safe against concurrent `inject` calls.
    pub async fn stop(&self) -> AppResult<()> {
        info!("stopping audit worker");
        eprintln!("PROBE stop: sending shutdown");
        let _ = self.shutdown_tx.send(true);
        eprintln!("PROBE stop: sent shutdown, taking handle");

        if let Some(handle) = self.handle.lock().await.take() {
            eprintln!("PROBE stop: awaiting handle");
            if handle.await.is_err() {
                warn!("audit worker loop terminated abnormally");
            }
            eprintln!("PROBE stop: handle joined");
        } else {
            eprintln!("PROBE stop: no handle present");
        }

        eprintln!("PROBE stop: final flush");
        let r = self.flush().await;
        eprintln!("PROBE stop: final flush done");
        r
    }

    /// Append an event to the buffer.
    ///
    /// Reaching the capacity threshold raises a coalesced wake-up for the
    /// flush loop. The threshold is advisory: the buffer keeps growing past
    /// it while a flush is in flight.
    pub async fn inject(&self, event: AuditEvent) {
        let at_capacity = {
            let mut buffer = self.buffer.lock().await;
            buffer.push(event);
            buffer.len() >= self.capacity
        };

        if at_capacity {
            // Full means a wake-up is already pending; closed means the loop
            // is gone and the final drain will pick the events up. Neither
            // can panic, even racing `stop`.
            let _ = self.wake_tx.try_send(());
        }
    }

    /// Buffer the event and synchronously forward it downstream.
    ///
    /// Two independent delivery paths over the same event, not one atomic
    /// operation: a forwarding failure is returned to the caller while the
    /// buffered copy stays queued for the next flush.
    pub async fn log_and_send(&self, event: AuditEvent) -> AppResult<()> {
        self.inject(event.clone()).await;

        let Some(forwarder) = &self.forwarder else {
            return Ok(());
        };
        forwarder.forward(&event).await
    }

    async fn run(self: Arc<Self>, mut wake_rx: mpsc::Receiver<()>) {
        eprintln!("PROBE run: entered");
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        if *shutdown_rx.borrow() {
            eprintln!("PROBE run: shutdown already set, returning");
            return;
        }
        eprintln!("PROBE run: subscribed, entering loop");

        let mut ticker = time::interval_at(
            time::Instant::now() + self.flush_interval,
            self.flush_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    debug!("audit worker loop exiting");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.flush().await {
                        warn!(error = %err, "interval flush failed, batch requeued");
                    }
                }
                Some(()) = wake_rx.recv() => {
                    if let Err(err) = self.flush().await {
                        warn!(error = %err, "capacity flush failed, batch requeued");
                    }
                }
            }
        }
    }

    /// Swap the buffer out under the lock and persist the batch lock-free.
    /// On failure the batch is restored ahead of anything injected since the
    /// swap, preserving injection order for the retry.
    async fn flush(&self) -> AppResult<()> {
        let batch = {
            let mut buffer = self.buffer.lock().await;
            if buffer.is_empty() {
                return Ok(());
            }
            mem::replace(&mut *buffer, Vec::with_capacity(self.capacity))
        };

        debug!(count = batch.len(), "flushing audit events");
        match self.events.create_many(&batch).await {
            Ok(_) => Ok(()),
            Err(err) => {
                let mut buffer = self.buffer.lock().await;
                let mut requeued = batch;
                requeued.extend(buffer.drain(..));
                *buffer = requeued;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::repository::MockAuditEventRepository;
    use common::AppError;

    fn config(buffer_capacity: usize, flush_interval_ms: u64) -> AuditWorkerConfig {
        AuditWorkerConfig {
            buffer_capacity,
            flush_interval_ms,
        }
    }

    fn event(key: &str) -> AuditEvent {
        AuditEvent::new(key, key)
    }

    fn keys(batch: &[AuditEvent]) -> Vec<String> {
        batch.iter().map(|event| event.key.clone()).collect()
    }

    #[tokio::test]
    async fn capacity_threshold_raises_one_wakeup() {
        let repository = MockAuditEventRepository::new();
        let worker = AuditWorker::new(config(100, 1000), Arc::new(repository), None);

        // Go past the threshold: every over-capacity inject coalesces into
        // the single pending signal.
        for i in 0..105 {
            worker.inject(event(&format!("k{}", i))).await;
        }

        let mut wake_rx = worker
            .wake_rx
            .lock()
            .await
            .take()
            .expect("worker not started, receiver present");
        wake_rx.recv().await.expect("one wake-up pending");
        assert!(wake_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn below_threshold_raises_no_wakeup() {
        let repository = MockAuditEventRepository::new();
        let worker = AuditWorker::new(config(100, 1000), Arc::new(repository), None);

        for i in 0..99 {
            worker.inject(event(&format!("k{}", i))).await;
        }

        let mut wake_rx = worker.wake_rx.lock().await.take().expect("receiver present");
        assert!(wake_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn successful_flush_empties_buffer() {
        let mut repository = MockAuditEventRepository::new();
        repository
            .expect_create_many()
            .withf(|batch: &[AuditEvent]| keys(batch) == ["a", "b"])
            .times(1)
            .returning(|batch| Ok(batch.to_vec()));

        let worker = AuditWorker::new(config(100, 1000), Arc::new(repository), None);
        worker.inject(event("a")).await;
        worker.inject(event("b")).await;

        worker.flush().await.expect("flush succeeds");
        assert!(worker.buffer.lock().await.is_empty());
    }

    #[tokio::test]
    async fn failed_batch_is_requeued_ahead_of_newer_events() {
        let mut repository = MockAuditEventRepository::new();
        repository
            .expect_create_many()
            .withf(|batch: &[AuditEvent]| keys(batch) == ["e1", "e2"])
            .times(1)
            .returning(|_| Err(AppError::internal("storage down")));
        repository
            .expect_create_many()
            .withf(|batch: &[AuditEvent]| keys(batch) == ["e1", "e2", "e3"])
            .times(1)
            .returning(|batch| Ok(batch.to_vec()));

        let worker = AuditWorker::new(config(100, 1000), Arc::new(repository), None);
        worker.inject(event("e1")).await;
        worker.inject(event("e2")).await;

        assert!(worker.flush().await.is_err());
        assert_eq!(keys(&worker.buffer.lock().await), ["e1", "e2"]);

        worker.inject(event("e3")).await;
        worker.flush().await.expect("retry succeeds");
        assert!(worker.buffer.lock().await.is_empty());
    }

    #[tokio::test]
    async fn flush_on_empty_buffer_skips_storage() {
        // Any repository call would trip the mock.
        let repository = MockAuditEventRepository::new();
        let worker = AuditWorker::new(config(10, 1000), Arc::new(repository), None);

        worker.flush().await.expect("no-op flush");
    }

    #[tokio::test]
    async fn stop_drains_buffer_in_one_batch() {
        let mut repository = MockAuditEventRepository::new();
        repository
            .expect_create_many()
            .withf(|batch: &[AuditEvent]| keys(batch) == ["a", "b", "c"])
            .times(1)
            .returning(|batch| Ok(batch.to_vec()));

        // Interval far beyond the test duration: only the drain may flush.
        let worker = Arc::new(AuditWorker::new(
            config(100, 3_600_000),
            Arc::new(repository),
            None,
        ));
        worker.clone().start().await;

        worker.inject(event("a")).await;
        worker.inject(event("b")).await;
        worker.inject(event("c")).await;

        worker.stop().await.expect("drain succeeds");
    }

    #[tokio::test]
    async fn stop_propagates_drain_failure() {
        let mut repository = MockAuditEventRepository::new();
        repository
            .expect_create_many()
            .times(1)
            .returning(|_| Err(AppError::internal("storage down")));

        let worker = Arc::new(AuditWorker::new(
            config(100, 3_600_000),
            Arc::new(repository),
            None,
        ));
        worker.clone().start().await;
        worker.inject(event("doomed")).await;

        assert!(worker.stop().await.is_err());
        assert_eq!(worker.buffer.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn second_start_is_ignored() {
        let mut repository = MockAuditEventRepository::new();
        repository
            .expect_create_many()
            .returning(|batch| Ok(batch.to_vec()));

        let worker = Arc::new(AuditWorker::new(
            config(100, 3_600_000),
            Arc::new(repository),
            None,
        ));
        worker.clone().start().await;
        worker.clone().start().await;

        worker.inject(event("once")).await;
        worker.stop().await.expect("clean stop");
    }

    #[tokio::test]
    async fn forwarder_failure_keeps_buffered_copy() {
        let repository = MockAuditEventRepository::new();
        let mut forwarder = MockEventForwarder::new();
        forwarder
            .expect_forward()
            .times(1)
            .returning(|_| Err(AppError::internal("link down")));

        let worker = AuditWorker::new(
            config(100, 1000),
            Arc::new(repository),
            Some(Arc::new(forwarder)),
        );

        assert!(worker.log_and_send(event("audit")).await.is_err());
        assert_eq!(keys(&worker.buffer.lock().await), ["audit"]);
    }

    #[tokio::test]
    async fn log_and_send_without_forwarder_only_buffers() {
        let repository = MockAuditEventRepository::new();
        let worker = AuditWorker::new(config(100, 1000), Arc::new(repository), None);

        worker.log_and_send(event("audit")).await.expect("buffered");
        assert_eq!(worker.buffer.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn capacity_flush_beats_timer_then_timer_picks_up_rest() {
        let batches: Arc<StdMutex<Vec<Vec<String>>>> = Arc::default();
        let sink = Arc::clone(&batches);

        let mut repository = MockAuditEventRepository::new();
        repository.expect_create_many().returning(move |batch| {
            sink.lock().unwrap().push(keys(batch));
            Ok(batch.to_vec())
        });

        let worker = Arc::new(AuditWorker::new(config(2, 200), Arc::new(repository), None));
        worker.clone().start().await;

        // Hitting capacity flushes immediately, well before the first tick.
        worker.inject(event("a")).await;
        worker.inject(event("b")).await;
        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*batches.lock().unwrap(), vec![vec!["a", "b"]]);

        // A lone event below capacity rides the timer.
        worker.inject(event("c")).await;
        time::sleep(Duration::from_millis(300)).await;
        assert_eq!(*batches.lock().unwrap(), vec![vec!["a", "b"], vec!["c"]]);

        worker.stop().await.expect("clean stop");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_injectors_racing_stop_lose_nothing() {
        let persisted: Arc<StdMutex<usize>> = Arc::default();
        let counter = Arc::clone(&persisted);

        let mut repository = MockAuditEventRepository::new();
        repository.expect_create_many().returning(move |batch| {
            *counter.lock().unwrap() += batch.len();
            Ok(batch.to_vec())
        });

        let worker = Arc::new(AuditWorker::new(config(16, 5), Arc::new(repository), None));
        worker.clone().start().await;

        let producers: Vec<_> = (0..8)
            .map(|task| {
                let worker = Arc::clone(&worker);
                tokio::spawn(async move {
                    for i in 0..100 {
                        worker.inject(event(&format!("{}-{}", task, i))).await;
                    }
                })
            })
            .collect();

        for producer in producers {
            producer.await.expect("producer completes");
        }

        worker.stop().await.expect("drain succeeds");
        assert_eq!(*persisted.lock().unwrap(), 800);
    }
}
