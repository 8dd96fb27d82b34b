//! Audit event handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use common::AppResult;

use crate::clients::EventResponse;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Event recording request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordEventRequest {
    /// Event key
    #[validate(length(min = 1, max = 255, message = "Event key must be 1-255 characters"))]
    #[schema(example = "payment_settled")]
    pub key: String,
    /// Event payload
    #[schema(example = "{\"order_id\": 42}")]
    pub value: String,
}

/// Acknowledgement for a recorded event.
///
/// The event is buffered at this point, not yet durable.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordEventResponse {
    pub accepted: bool,
}

/// Event listing query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListEventsQuery {
    /// Maximum number of events to return (newest first)
    pub limit: Option<u32>,
}

/// Create event routes
pub fn event_routes() -> Router<AppState> {
    Router::new().route("/", get(list_events).post(record_event))
}

/// Record an audit event
#[utoipa::path(
    post,
    path = "/events",
    tag = "Audit Events",
    request_body = RecordEventRequest,
    responses(
        (status = 202, description = "Event accepted for buffered persistence", body = RecordEventResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn record_event(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RecordEventRequest>,
) -> AppResult<(StatusCode, Json<RecordEventResponse>)> {
    state
        .audit_client
        .record_event(payload.key, payload.value)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(RecordEventResponse { accepted: true }),
    ))
}

/// List recent audit events
#[utoipa::path(
    get,
    path = "/events",
    tag = "Audit Events",
    params(ListEventsQuery),
    responses(
        (status = 200, description = "Most recent events, newest first", body = Vec<EventResponse>)
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> AppResult<Json<Vec<EventResponse>>> {
    let events = state.audit_client.list_events(query.limit).await?;
    Ok(Json(events))
}
