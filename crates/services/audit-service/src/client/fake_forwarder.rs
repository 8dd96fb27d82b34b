//! Fake downstream forwarder.
//!
//! Stands in for a real downstream consumer (message bus, webhook, ...) by
//! sleeping for a configured latency and logging the event.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use common::{AppResult, ForwarderConfig};
use domain::AuditEvent;

use crate::service::EventForwarder;

/// Latency-simulating forwarder for local development.
pub struct FakeForwarder {
    latency: Duration,
}

impl FakeForwarder {
    /// Create a forwarder with the configured simulated latency.
    pub fn new(config: ForwarderConfig) -> Self {
        Self {
            latency: Duration::from_millis(config.latency_ms),
        }
    }
}

#[async_trait]
impl EventForwarder for FakeForwarder {
    async fn forward(&self, event: &AuditEvent) -> AppResult<()> {
        tokio::time::sleep(self.latency).await;
        debug!(key = %event.key, "audit event forwarded downstream");
        Ok(())
    }
}
