//! Gateway state
//!
//! Application state for the gateway server.

use crate::presence::PresenceRegistry;
use coach_common::AppConfig;
use coach_service::ServiceContext;
use std::sync::Arc;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    /// Service context with repositories and services
    service_context: Arc<ServiceContext>,
    /// Presence and session registry
    presence: Arc<PresenceRegistry>,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Create a new gateway state
    pub fn new(
        service_context: ServiceContext,
        presence: Arc<PresenceRegistry>,
        config: AppConfig,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            presence,
            config: Arc::new(config),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the presence registry
    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("presence", &self.presence)
            .field("config", &"AppConfig")
            .finish()
    }
}
