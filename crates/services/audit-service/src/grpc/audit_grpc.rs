//! gRPC implementation for AuditService.

use std::sync::Arc;

use tonic::{Request, Response, Status};

use crate::repository::AuditEventRepository;
use crate::service::AuditWorker;
use domain::{AuditEvent, MAX_EVENT_KEY_LENGTH};
use proto::audit::{
    audit_service_server::AuditService as AuditServiceProto, EventRecord, ListEventsRequest,
    ListEventsResponse, RecordEventRequest, RecordEventResponse,
};

/// Default and maximum page sizes for event listing.
const DEFAULT_LIST_LIMIT: u32 = 50;
const MAX_LIST_LIMIT: u32 = 500;

/// gRPC service wrapper for the audit worker and repository.
pub struct AuditGrpcService {
    worker: Arc<AuditWorker>,
    events: Arc<dyn AuditEventRepository>,
}

impl AuditGrpcService {
    /// Create a new gRPC service wrapper.
    pub fn new(worker: Arc<AuditWorker>, events: Arc<dyn AuditEventRepository>) -> Self {
        Self { worker, events }
    }
}

#[tonic::async_trait]
impl AuditServiceProto for AuditGrpcService {
    async fn record_event(
        &self,
        request: Request<RecordEventRequest>,
    ) -> Result<Response<RecordEventResponse>, Status> {
        let req = request.into_inner();
        validate_event_key(&req.key)?;

        // The event is buffered unconditionally; only the synchronous
        // forwarding leg can fail here.
        let event = AuditEvent::new(req.key, req.value);
        self.worker
            .log_and_send(event)
            .await
            .map_err(Status::from)?;

        Ok(Response::new(RecordEventResponse { accepted: true }))
    }

    async fn list_events(
        &self,
        request: Request<ListEventsRequest>,
    ) -> Result<Response<ListEventsResponse>, Status> {
        let req = request.into_inner();
        let limit = req.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);

        let events = self
            .events
            .list_recent(limit as u64)
            .await
            .map_err(Status::from)?;
        let total = events.len() as i32;
        let events: Vec<EventRecord> = events.iter().map(event_to_proto).collect();

        Ok(Response::new(ListEventsResponse { events, total }))
    }
}

/// Validate an incoming event key.
fn validate_event_key(key: &str) -> Result<(), Status> {
    if key.is_empty() {
        return Err(Status::invalid_argument("Event key cannot be empty"));
    }
    if key.len() > MAX_EVENT_KEY_LENGTH {
        return Err(Status::invalid_argument("Event key is too long"));
    }
    Ok(())
}

/// Convert domain AuditEvent to proto EventRecord.
fn event_to_proto(event: &AuditEvent) -> EventRecord {
    EventRecord {
        id: event.id.unwrap_or_default(),
        key: event.key.clone(),
        value: event.value.clone(),
        created_at: event.created_at.to_rfc3339(),
        updated_at: event.updated_at.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_key_validation() {
        assert!(validate_event_key("user_created").is_ok());
        assert!(validate_event_key("").is_err());
        assert!(validate_event_key(&"k".repeat(MAX_EVENT_KEY_LENGTH + 1)).is_err());
    }

    #[test]
    fn proto_conversion_carries_identifier() {
        let mut event = AuditEvent::new("demo_events", "{}");
        event.id = Some(42);

        let record = event_to_proto(&event);
        assert_eq!(record.id, 42);
        assert_eq!(record.key, "demo_events");
        assert_eq!(record.created_at, event.created_at.to_rfc3339());
    }
}
