//! User attribute entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Plain key/value input pair, as submitted by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
}

/// Persisted attribute attached to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserAttribute {
    /// Storage-assigned identifier (None before persistence)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub user_id: Uuid,
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAttribute {
    /// Build an unpersisted attribute for a user from an input pair.
    pub fn new(user_id: Uuid, pair: KeyValuePair) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            user_id,
            key: pair.key,
            value: pair.value,
            created_at: now,
            updated_at: now,
        }
    }
}
