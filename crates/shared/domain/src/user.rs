//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user_attribute::KeyValuePair;

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp (None = active, Some = deleted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new active user
    pub fn new(
        id: Uuid,
        username: String,
        password_hash: String,
        name: String,
        email: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            password_hash,
            username,
            name,
            email,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Check if user is soft deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Check if user is active (not deleted)
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Update user's name
    pub fn update_name(&mut self, name: String) {
        self.name = name;
        self.updated_at = Utc::now();
    }

    /// Soft delete the user
    pub fn soft_delete(&mut self) {
        self.deleted_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    /// Restore a soft-deleted user
    pub fn restore(&mut self) {
        self.deleted_at = None;
        self.updated_at = Utc::now();
    }
}

/// User creation data transfer object
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    /// Unique login name
    pub username: String,
    /// User password (minimum 8 characters)
    pub password: String,
    /// User display name
    pub name: String,
    /// Optional contact email
    pub email: Option<String>,
    /// Free-form key/value attributes stored with the user
    #[serde(default)]
    pub attributes: Vec<KeyValuePair>,
}

/// User update data transfer object
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUser {
    /// New display name
    pub name: Option<String>,
    /// New contact email
    pub email: Option<String>,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    /// Unique user identifier
    pub id: Uuid,
    /// Login name
    pub username: String,
    /// User display name
    pub name: String,
    /// Contact email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Soft delete timestamp (if deleted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            deleted_at: user.deleted_at,
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
            deleted_at: user.deleted_at,
        }
    }
}
