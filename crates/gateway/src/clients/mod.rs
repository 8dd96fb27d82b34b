//! gRPC clients for calling microservices.

mod audit_client;
mod user_client;

pub use audit_client::{AuditClient, EventResponse};
pub use user_client::{UserClient, UserWithAttributes};
