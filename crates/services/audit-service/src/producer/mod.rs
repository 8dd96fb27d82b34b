//! Demo event producer.
//!
//! Generates synthetic audit events on a fixed interval and pushes them
//! through the worker's `log_and_send` path. Development-only traffic source,
//! enabled by configuration.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{info, warn};
use uuid::Uuid;

use common::ProducerConfig;
use domain::AuditEvent;

use crate::service::AuditWorker;

/// Key under which generated events are recorded.
const DEMO_EVENT_KEY: &str = "demo_events";

/// Ticker task feeding synthetic events into the audit worker.
pub struct DemoProducer {
    interval: Duration,
    worker: Arc<AuditWorker>,
    shutdown_tx: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl DemoProducer {
    /// Create a producer; no events are generated until `start`.
    pub fn new(config: ProducerConfig, worker: Arc<AuditWorker>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            interval: Duration::from_millis(config.interval_ms),
            worker,
            shutdown_tx,
            handle: Mutex::new(None),
        }
    }

    /// Launch the generation loop.
    pub async fn start(&self) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "starting demo producer"
        );

        let worker = Arc::clone(&self.worker);
        let interval = self.interval;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
            let mut sequence: u64 = 0;

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => return,
                    _ = ticker.tick() => {
                        sequence += 1;
                        let payload = serde_json::json!({
                            "sequence": sequence,
                            "trace_id": Uuid::new_v4(),
                        });
                        let event = AuditEvent::new(DEMO_EVENT_KEY, payload.to_string());
                        if let Err(err) = worker.log_and_send(event).await {
                            warn!(error = %err, "failed to log and forward demo event");
                        }
                    }
                }
            }
        });

        *self.handle.lock().await = Some(handle);
    }

    /// Stop the generation loop.
    pub async fn stop(&self) {
        info!("stopping demo producer");
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.lock().await.take() {
            let _ = handle.await;
        }
    }
}
