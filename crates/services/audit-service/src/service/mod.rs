//! Service layer - buffered audit event worker.

mod audit_worker;

pub use audit_worker::{AuditWorker, EventForwarder};

#[cfg(any(test, feature = "test-utils"))]
pub use audit_worker::MockEventForwarder;
