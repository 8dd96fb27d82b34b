//! Audit Service Library
//!
//! This crate provides buffered audit event logging via gRPC.
//! It can be run as a standalone service or embedded in the combined binary.

pub mod client;
pub mod config;
pub mod grpc;
pub mod infra;
pub mod producer;
pub mod repository;
pub mod service;

use std::net::SocketAddr;
use std::sync::Arc;

use tonic::transport::Server;
use tracing::info;

use crate::client::FakeForwarder;
use crate::config::AuditServiceConfig;
use crate::grpc::AuditGrpcService;
use crate::infra::Database;
use crate::producer::DemoProducer;
use crate::repository::{AuditEventRepository, AuditEventStore};
use crate::service::{AuditWorker, EventForwarder};
use common::ProducerConfig;

/// Run the audit service as an embedded component (for combined binary).
pub async fn run_embedded(host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let config = AuditServiceConfig::from_env();
    run_server_with_config(host, port, config).await
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = AuditServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database_url).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Run the gRPC server with the given configuration.
async fn run_server_with_config(
    host: &str,
    port: u16,
    config: AuditServiceConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize database
    let db = Database::connect(&config.database_url).await?;

    // Create repository, forwarder and the buffered worker
    let events: Arc<dyn AuditEventRepository> =
        Arc::new(AuditEventStore::new(db.get_connection()));
    let forwarder: Arc<dyn EventForwarder> = Arc::new(FakeForwarder::new(config.forwarder));
    let worker = Arc::new(AuditWorker::new(
        config.worker,
        Arc::clone(&events),
        Some(forwarder),
    ));
    Arc::clone(&worker).start().await;

    // Optional synthetic traffic for local development
    let demo_producer = config.demo_producer_interval_ms.map(|interval_ms| {
        DemoProducer::new(ProducerConfig { interval_ms }, Arc::clone(&worker))
    });
    if let Some(producer) = &demo_producer {
        producer.start().await;
    }

    // Create gRPC service
    let grpc_service = AuditGrpcService::new(Arc::clone(&worker), events);

    // Build address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Audit service listening on {}", addr);

    // Run server until interrupted
    Server::builder()
        .add_service(proto::AuditServiceServer::new(grpc_service))
        .serve_with_shutdown(addr, shutdown_signal())
        .await?;

    // Drain: producer first so no new events arrive, then the worker's final
    // flush. A failed drain surfaces here and the buffered events are lost.
    if let Some(producer) = &demo_producer {
        producer.stop().await;
    }
    worker.stop().await?;

    Ok(())
}

/// Resolve when the process receives an interrupt.
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
