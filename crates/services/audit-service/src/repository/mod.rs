//! Repository layer for data access.

pub mod entities;
mod audit_event_repository;

pub use audit_event_repository::{AuditEventRepository, AuditEventStore};

#[cfg(any(test, feature = "test-utils"))]
pub use audit_event_repository::MockAuditEventRepository;
