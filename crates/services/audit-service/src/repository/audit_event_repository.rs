//! Audit event repository.

use async_trait::async_trait;
use sea_orm::{ActiveValue::NotSet, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};

use super::entities::audit_event::{self, ActiveModel, Entity as AuditEventEntity};
use common::{AppError, AppResult};
use domain::AuditEvent;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Durable sink for audit event batches.
///
/// `create_many` must be all-or-nothing per call: the worker requeues a failed
/// batch wholesale and would persist duplicates if a call could partially
/// succeed.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuditEventRepository: Send + Sync {
    /// Persist a batch atomically, returning the stored copies with
    /// identifiers assigned.
    async fn create_many(&self, events: &[AuditEvent]) -> AppResult<Vec<AuditEvent>>;

    /// Most recent events, newest first.
    async fn list_recent(&self, limit: u64) -> AppResult<Vec<AuditEvent>>;
}

/// Concrete implementation of AuditEventRepository
pub struct AuditEventStore {
    db: DatabaseConnection,
}

impl AuditEventStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditEventRepository for AuditEventStore {
    async fn create_many(&self, events: &[AuditEvent]) -> AppResult<Vec<AuditEvent>> {
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let models = events.iter().map(|event| ActiveModel {
            id: NotSet,
            key: Set(event.key.clone()),
            value: Set(event.value.clone()),
            created_at: Set(event.created_at),
            updated_at: Set(event.updated_at),
        });

        // Single INSERT .. RETURNING statement keeps the batch all-or-nothing.
        let inserted = AuditEventEntity::insert_many(models)
            .exec_with_returning_many(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(inserted.into_iter().map(AuditEvent::from).collect())
    }

    async fn list_recent(&self, limit: u64) -> AppResult<Vec<AuditEvent>> {
        let models = AuditEventEntity::find()
            .order_by_desc(audit_event::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(AuditEvent::from).collect())
    }
}
