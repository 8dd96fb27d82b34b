//! Application state for dependency injection.

use std::sync::Arc;

use crate::clients::{AuditClient, UserClient};
use crate::config::GatewayConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub user_client: Arc<UserClient>,
    pub audit_client: Arc<AuditClient>,
    pub config: GatewayConfig,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        user_client: Arc<UserClient>,
        audit_client: Arc<AuditClient>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            user_client,
            audit_client,
            config,
        }
    }
}
