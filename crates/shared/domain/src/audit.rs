//! Audit event entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single audit log entry.
///
/// Events are produced by callers as plain key/value records and persisted in
/// batches; the identifier is assigned by storage and is absent until then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Storage-assigned identifier (None before persistence)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Build an unpersisted event.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            key: key.into(),
            value: value.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_event_has_no_identifier() {
        let event = AuditEvent::new("user_created", "{}");
        assert!(event.id.is_none());
        assert_eq!(event.key, "user_created");
    }
}
