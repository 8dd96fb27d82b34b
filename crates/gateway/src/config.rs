//! Gateway configuration.

use std::env;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// User service gRPC endpoint
    pub user_service_url: String,
    /// Audit service gRPC endpoint
    pub audit_service_url: String,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            user_service_url: env::var("USER_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:50052".to_string()),
            audit_service_url: env::var("AUDIT_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:50053".to_string()),
            host: env::var("GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("GATEWAY_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        }
    }

    /// Extract user service port from URL.
    pub fn user_port(&self) -> u16 {
        self.user_service_url
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .unwrap_or(50052)
    }

    /// Extract audit service port from URL.
    pub fn audit_port(&self) -> u16 {
        self.audit_service_url
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .unwrap_or(50053)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            user_service_url: "http://localhost:50052".to_string(),
            audit_service_url: "http://localhost:50053".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}
