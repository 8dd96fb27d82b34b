//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::clients::EventResponse;
use crate::handlers::event_handler::{RecordEventRequest, RecordEventResponse};
use crate::handlers::user_handler::{
    AttributeInput, CreateUserRequest, UpdateUserRequest, UserDetailResponse,
};
use domain::{UserAttribute, UserResponse};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::user_handler::create_user,
        crate::handlers::user_handler::list_users,
        crate::handlers::user_handler::list_deleted_users,
        crate::handlers::user_handler::get_user,
        crate::handlers::user_handler::get_user_by_username,
        crate::handlers::user_handler::update_user,
        crate::handlers::user_handler::delete_user,
        crate::handlers::user_handler::hard_delete_user,
        crate::handlers::user_handler::restore_user,
        crate::handlers::event_handler::record_event,
        crate::handlers::event_handler::list_events,
    ),
    components(
        schemas(
            AttributeInput,
            CreateUserRequest,
            UpdateUserRequest,
            UserResponse,
            UserAttribute,
            UserDetailResponse,
            RecordEventRequest,
            RecordEventResponse,
            EventResponse,
        )
    ),
    tags(
        (name = "Users", description = "User management endpoints"),
        (name = "Audit Events", description = "Buffered audit event endpoints"),
    )
)]
pub struct ApiDoc;
