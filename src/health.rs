//! Dependency health checks
//!
//! A dependency is healthy when its probe answers `200 OK`. Failures come back
//! as [`Error::Unavailable`]; deciding whether to abort is left to the caller.

use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use crate::connector::{GatewayConnector, endpoint};
use crate::{Error, Result};

/// Dependency name reported for the admin API
pub const GATEWAY: &str = "gateway admin API";
/// Dependency name reported for the secret service
pub const SECRET_SERVICE: &str = "secret service";

/// Probes the gateway and the secret service
pub struct HealthCheck {
    connector: Arc<dyn GatewayConnector>,
    secret_health_path: String,
}

impl HealthCheck {
    /// Create a health check probing `secret_health_path` on the secret service
    #[must_use]
    pub fn new(connector: Arc<dyn GatewayConnector>, secret_health_path: impl Into<String>) -> Self {
        Self {
            connector,
            secret_health_path: secret_health_path.into(),
        }
    }

    /// `GET` the admin API root
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] unless the admin API answers `200 OK`.
    pub async fn check_gateway(&self) -> Result<()> {
        let url = self.connector.admin_base_url().clone();
        self.probe(GATEWAY, url).await
    }

    /// `GET` the secret service health endpoint
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] unless the endpoint answers `200 OK`.
    pub async fn check_secret_service(&self) -> Result<()> {
        let url = endpoint(self.connector.secret_base_url(), &self.secret_health_path)?;
        self.probe(SECRET_SERVICE, url).await
    }

    async fn probe(&self, dependency: &str, url: Url) -> Result<()> {
        debug!(dependency, url = %url, "Health check");
        let unavailable = |reason: String| {
            warn!(dependency, reason = %reason, "Dependency unavailable");
            Error::Unavailable {
                dependency: dependency.to_string(),
                reason,
            }
        };

        match self.connector.http_client().get(url).send().await {
            Ok(response) if response.status() == StatusCode::OK => Ok(()),
            Ok(response) => Err(unavailable(format!("status {}", response.status()))),
            Err(e) => Err(unavailable(e.to_string())),
        }
    }
}
