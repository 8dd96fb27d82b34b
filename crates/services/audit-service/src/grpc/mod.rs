//! gRPC service wrappers.

mod audit_grpc;

pub use audit_grpc::AuditGrpcService;
