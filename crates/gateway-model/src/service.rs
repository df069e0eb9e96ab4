//! Services and routes

use serde::{Deserialize, Serialize};

/// Backend service registered with the gateway, identified by `name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayService {
    /// Service name (resource identity)
    pub name: String,
    /// Upstream host
    pub host: String,
    /// Upstream port
    pub port: u16,
    /// Upstream protocol (`http`, `https`)
    pub protocol: String,
}

/// Service as echoed back by the admin API after creation
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceRecord {
    /// Gateway-assigned id
    pub id: String,
    /// Service name
    #[serde(default)]
    pub name: Option<String>,
}

/// Route attached to a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Route name
    pub name: String,
    /// Path prefixes matched by the route
    pub paths: Vec<String>,
    /// Host/SNI matches; omitted when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
}

impl Route {
    /// The route provisioned for a service: named after it and bound to `/{service}`
    #[must_use]
    pub fn for_service(service: &str, hosts: Vec<String>) -> Self {
        Self {
            name: service.to_string(),
            paths: vec![format!("/{service}")],
            hosts,
        }
    }
}
