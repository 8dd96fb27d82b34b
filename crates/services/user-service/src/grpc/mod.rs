//! gRPC service wrappers.

mod user_grpc;

pub use user_grpc::UserGrpcService;
