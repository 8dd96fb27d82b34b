//! gRPC client for audit-service.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tonic::transport::Channel;
use tracing::debug;
use utoipa::ToSchema;

use common::{AppError, AppResult};
use proto::audit::{
    audit_service_client::AuditServiceClient as ProtoAuditServiceClient, ListEventsRequest,
    RecordEventRequest,
};

/// Audit event as exposed over the REST API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventResponse {
    /// Storage-assigned identifier
    pub id: i64,
    /// Event key
    pub key: String,
    /// Event payload
    pub value: String,
    /// Event creation timestamp
    pub created_at: DateTime<Utc>,
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

    /// Record a single audit event.
    pub async fn record_event(&self, key: String, value: String) -> AppResult<()> {
        let request = tonic::Request::new(RecordEventRequest { key, value });

        let mut client = self.client.clone();
        client.record_event(request).await.map_err(AppError::from)?;
        Ok(())
    }

    /// List the most recent audit events.
    pub async fn list_events(&self, limit: Option<u32>) -> AppResult<Vec<EventResponse>> {
        let request = tonic::Request::new(ListEventsRequest { limit });

        let mut client = self.client.clone();
        let response = client.list_events(request).await.map_err(AppError::from)?;

        response
            .into_inner()
            .events
            .into_iter()
            .map(|record| {
                let created_at = chrono::DateTime::parse_from_rfc3339(&record.created_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|_| AppError::internal("Invalid created_at from audit-service"))?;

                Ok(EventResponse {
                    id: record.id,
                    key: record.key,
                    value: record.value,
                    created_at,
                })
            })
            .collect()
    }
}
