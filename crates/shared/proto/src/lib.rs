//! gRPC protocol buffer definitions.
//!
//! This crate contains the generated gRPC service definitions for:
//! - UserService: User management (CRUD, attributes, soft delete)
//! - AuditService: Audit event recording and retrieval

/// User service definitions.
pub mod user {
    tonic::include_proto!("user");
}

/// Audit service definitions.
pub mod audit {
    tonic::include_proto!("audit");
}

// Re-export commonly used items
pub use audit::audit_service_client::AuditServiceClient;
pub use audit::audit_service_server::{AuditService, AuditServiceServer};
pub use user::user_service_client::UserServiceClient;
pub use user::user_service_server::{UserService, UserServiceServer};
