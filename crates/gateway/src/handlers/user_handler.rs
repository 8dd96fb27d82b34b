//! User handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::AppResult;
use domain::{KeyValuePair, UserAttribute, UserResponse};

use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Attribute input pair
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AttributeInput {
    /// Attribute key
    #[schema(example = "team")]
    pub key: String,
    /// Attribute value
    #[schema(example = "platform")]
    pub value: String,
}

/// User creation request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// Unique login name
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    #[schema(example = "jdoe")]
    pub username: String,
    /// Password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "hunter2hunter2")]
    pub password: String,
    /// Display name
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    #[schema(example = "Jane Doe")]
    pub name: String,
    /// Optional contact email
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
    /// Free-form key/value attributes
    #[serde(default)]
    pub attributes: Vec<AttributeInput>,
}

/// User update request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    /// New display name
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    /// New contact email
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
}

/// User profile with its attributes
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDetailResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    /// Attributes attached to the user
    pub attributes: Vec<UserAttribute>,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/deleted", get(list_deleted_users))
        .route("/by-username/:username", get(get_user_by_username))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/hard", axum::routing::delete(hard_delete_user))
        .route("/:id/restore", post(restore_user))
}

/// Create a new user with attributes
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserDetailResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserDetailResponse>)> {
    let attributes = payload
        .attributes
        .into_iter()
        .map(|pair| KeyValuePair {
            key: pair.key,
            value: pair.value,
        })
        .collect();

    let created = state
        .user_client
        .create_user(
            payload.username,
            payload.password,
            payload.name,
            payload.email,
            attributes,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserDetailResponse {
            user: UserResponse::from(created.user),
            attributes: created.attributes,
        }),
    ))
}

/// List all active users
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "List of all active users", body = Vec<UserResponse>)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.user_client.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// List soft-deleted users
#[utoipa::path(
    get,
    path = "/users/deleted",
    tag = "Users",
    responses(
        (status = 200, description = "List of soft-deleted users", body = Vec<UserResponse>)
    )
)]
pub async fn list_deleted_users(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.user_client.list_deleted_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserDetailResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserDetailResponse>> {
    let found = state.user_client.get_user(id).await?;
    Ok(Json(UserDetailResponse {
        user: UserResponse::from(found.user),
        attributes: found.attributes,
    }))
}

/// Get user by username
#[utoipa::path(
    get,
    path = "/users/by-username/{username}",
    tag = "Users",
    params(
        ("username" = String, Path, description = "Login name")
    ),
    responses(
        (status = 200, description = "User profile", body = UserDetailResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<UserDetailResponse>> {
    let found = state.user_client.get_user_by_username(&username).await?;
    Ok(Json(UserDetailResponse {
        user: UserResponse::from(found.user),
        attributes: found.attributes,
    }))
}

/// Update user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .user_client
        .update_user(id, payload.name, payload.email)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Soft delete user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.user_client.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Permanently delete user
#[utoipa::path(
    delete,
    path = "/users/{id}/hard",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User permanently deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn hard_delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.user_client.hard_delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Restore soft-deleted user
#[utoipa::path(
    post,
    path = "/users/{id}/restore",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID to restore")
    ),
    responses(
        (status = 200, description = "User restored successfully", body = UserResponse),
        (status = 404, description = "User not found or not deleted")
    )
)]
pub async fn restore_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_client.restore_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}
