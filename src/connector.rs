//! Gateway connection: endpoint URLs plus the shared HTTP client
//!
//! Every component reaches the gateway, its TLS application port and the
//! secret service through a [`GatewayConnector`], so tests can point them at
//! in-process fakes.

use std::path::Path;
use std::time::Duration;

use reqwest::{Certificate, Client};
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::{Error, Result};

/// Endpoint and client accessors shared by every component
pub trait GatewayConnector: Send + Sync {
    /// Admin API base URL (trailing slash)
    fn admin_base_url(&self) -> &Url;
    /// TLS application base URL the OAuth2 token endpoint hangs off (trailing slash)
    fn application_base_url(&self) -> &Url;
    /// Secret service base URL (trailing slash)
    fn secret_base_url(&self) -> &Url;
    /// Shared HTTP client
    fn http_client(&self) -> &Client;
}

/// Resolve `path` relative to `base`
///
/// # Errors
///
/// Returns [`Error::Config`] if the joined URL is invalid.
pub fn endpoint(base: &Url, path: &str) -> Result<Url> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| Error::Config(format!("Invalid endpoint {base}{path}: {e}")))
}

/// Concrete connector built from configuration
pub struct HttpConnector {
    admin: Url,
    application: Url,
    secret: Url,
    client: Client,
}

impl HttpConnector {
    /// Create a connector from explicit base URLs
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if any URL fails to parse.
    pub fn new(admin: &str, application: &str, secret: &str, client: Client) -> Result<Self> {
        Ok(Self {
            admin: parse_base(admin)?,
            application: parse_base(application)?,
            secret: parse_base(secret)?,
            client,
        })
    }

    /// Build the HTTP client and endpoints from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the CA bundle cannot be read or the client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_client(
            config.gateway.request_timeout,
            config.gateway.insecure_skip_verify,
            config.secret_service.ca_cert_path.as_deref().map(Path::new),
        )?;
        Self::new(
            &config.admin_base_url(),
            &config.application_base_url(),
            &config.secret_base_url(),
            client,
        )
    }
}

impl GatewayConnector for HttpConnector {
    fn admin_base_url(&self) -> &Url {
        &self.admin
    }

    fn application_base_url(&self) -> &Url {
        &self.application
    }

    fn secret_base_url(&self) -> &Url {
        &self.secret
    }

    fn http_client(&self) -> &Client {
        &self.client
    }
}

/// Build the one HTTP client shared by every call
///
/// # Errors
///
/// Returns an error if `ca_cert` cannot be read or parsed, or the client cannot be built.
pub fn build_client(timeout: Duration, insecure: bool, ca_cert: Option<&Path>) -> Result<Client> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_nodelay(true)
        .danger_accept_invalid_certs(insecure);

    if let Some(path) = ca_cert {
        let pem = std::fs::read(path)?;
        let cert = Certificate::from_pem(&pem)
            .map_err(|e| Error::Config(format!("Invalid CA certificate {}: {e}", path.display())))?;
        builder = builder.add_root_certificate(cert);
        debug!(ca = %path.display(), "Trusting extra CA certificate");
    }

    builder
        .build()
        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))
}

fn parse_base(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| Error::Config(format!("Invalid URL {raw}: {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
