//! gRPC clients for calling other services.

mod audit_client;

pub use audit_client::{AuditClient, AuditServiceClient};

#[cfg(any(test, feature = "test-utils"))]
pub use audit_client::MockAuditServiceClient;
