//! gRPC client for audit-service.

use async_trait::async_trait;
use tonic::transport::Channel;
use tracing::debug;

use common::{AppError, AppResult};
use proto::audit::{audit_service_client::AuditServiceClient as ProtoAuditServiceClient, RecordEventRequest};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Trait for audit operations needed by user-service.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuditServiceClient: Send + Sync {
    /// Record a single audit event
    async fn record_event(&self, key: &str, value: String) -> AppResult<()>;
}

/// gRPC client wrapper for audit-service.
pub struct AuditClient {
    client: ProtoAuditServiceClient<Channel>,
}

impl AuditClient {
    /// Connect to audit-service.
    pub async fn connect(endpoint: &str) -> Result<Self, tonic::transport::Error> {
        debug!("Connecting to audit-service at {}", endpoint);
        let client = ProtoAuditServiceClient::connect(endpoint.to_string()).await?;
        Ok(Self { client })
    }
}

#[async_trait]
impl AuditServiceClient for AuditClient {
    async fn record_event(&self, key: &str, value: String) -> AppResult<()> {
        let request = tonic::Request::new(RecordEventRequest {
            key: key.to_string(),
            value,
        });

        let mut client = self.client.clone();
        client.record_event(request).await.map_err(AppError::from)?;
        Ok(())
    }
}
