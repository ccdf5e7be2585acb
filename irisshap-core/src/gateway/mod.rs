//! # HTTP Gateway
//!
//! Serves the dashboard page and a small JSON API over a single immutable
//! [`DashboardSnapshot`](crate::snapshot::DashboardSnapshot). Handlers are
//! pure reads of the snapshot; nothing is locked or cached.

mod error;
mod page;
mod server;

pub use error::ApiError;
pub use server::{router as dashboard_router, run as run_dashboard, DashboardServer, SharedDashboard};

use crate::config::DashboardConfig;
use serde::{Deserialize, Serialize};

/// Address the gateway binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl GatewayConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

impl From<&DashboardConfig> for GatewayConfig {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_config_default() {
        let config = GatewayConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8050);
        assert_eq!(config.addr(), "127.0.0.1:8050");
    }

    #[test]
    fn test_gateway_config_from_dashboard() {
        let dashboard = DashboardConfig {
            host: "0.0.0.0".into(),
            port: 9090,
            ..DashboardConfig::default()
        };
        let config = GatewayConfig::from(&dashboard);
        assert_eq!(config.addr(), "0.0.0.0:9090");
    }
}
