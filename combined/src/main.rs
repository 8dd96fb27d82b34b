//! Combined binary for development - runs all services in one process.

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "userlog")]
#[command(about = "Combined microservices binary for development")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all services in a single process (development mode)
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value = "3000")]
        gateway_port: u16,
        #[arg(long, default_value = "50052")]
        user_port: u16,
        #[arg(long, default_value = "50053")]
        audit_port: u16,
    },
    /// Run database migrations for all services
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            gateway_port,
            user_port,
            audit_port,
        } => {
            info!("Starting combined services in development mode");
            info!("  Gateway:       http://{}:{}", host, gateway_port);
            info!("  User service:  http://{}:{}", host, user_port);
            info!("  Audit service: http://{}:{}", host, audit_port);

            // Point the user-service at the in-process audit-service unless
            // explicitly configured otherwise
            if std::env::var("AUDIT_SERVICE_URL").is_err() {
                std::env::set_var(
                    "AUDIT_SERVICE_URL",
                    format!("http://{}:{}", host, audit_port),
                );
            }

            // Spawn audit-service first (user-service reports into it)
            let audit_host = host.clone();
            let audit_handle = tokio::spawn(async move {
                if let Err(e) = audit_service_lib::run_embedded(&audit_host, audit_port).await {
                    error!("Audit service failed: {}", e);
                }
            });

            // Wait a moment for audit-service to start
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;

            // Spawn user-service
            let user_host = host.clone();
            let user_handle = tokio::spawn(async move {
                if let Err(e) = user_service_lib::run_embedded(&user_host, user_port).await {
                    error!("User service failed: {}", e);
                }
            });

            // Wait a moment for user-service to start
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;

            // Spawn gateway (depends on both services)
            let gateway_host = host.clone();
            let gateway_handle = tokio::spawn(async move {
                if let Err(e) =
                    gateway_lib::run_embedded(&gateway_host, gateway_port, user_port, audit_port)
                        .await
                {
                    error!("Gateway failed: {}", e);
                }
            });

            // Wait for any service to exit (which would indicate an error)
            tokio::select! {
                _ = audit_handle => {
                    error!("Audit service exited unexpectedly");
                }
                _ = user_handle => {
                    error!("User service exited unexpectedly");
                }
                _ = gateway_handle => {
                    error!("Gateway exited unexpectedly");
                }
            }
        }
        Commands::Migrate { action } => {
            let user_action = match action {
                MigrateAction::Up => user_service_lib::MigrateAction::Up,
                MigrateAction::Down => user_service_lib::MigrateAction::Down,
                MigrateAction::Status => user_service_lib::MigrateAction::Status,
                MigrateAction::Fresh => user_service_lib::MigrateAction::Fresh,
            };
            let audit_action = match action {
                MigrateAction::Up => audit_service_lib::MigrateAction::Up,
                MigrateAction::Down => audit_service_lib::MigrateAction::Down,
                MigrateAction::Status => audit_service_lib::MigrateAction::Status,
                MigrateAction::Fresh => audit_service_lib::MigrateAction::Fresh,
            };

            // Each service owns its schema
            user_service_lib::run_migrations(user_action).await?;
            audit_service_lib::run_migrations(audit_action).await?;
        }
    }

    Ok(())
}
