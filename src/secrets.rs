//! Secret-service client
//!
//! Reads the bootstrap token written by the secret-service initialiser and
//! exchanges it for the gateway's TLS certificate/key pair.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gateway_model::{BootstrapTokenFile, CertificatePair, SecretEnvelope};
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::connector::{GatewayConnector, endpoint};
use crate::{Error, Result};

/// Header carrying the bootstrap token on secret-service requests
pub const SECRET_TOKEN_HEADER: &str = "X-Vault-Token";

/// Opaque bootstrap token
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapToken(String);

impl BootstrapToken {
    /// Wrap a raw token
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BootstrapToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BootstrapToken([redacted])")
    }
}

/// Client for the secret-management service
pub struct SecretClient {
    connector: Arc<dyn GatewayConnector>,
    token_path: PathBuf,
    cert_path: String,
}

impl SecretClient {
    /// Create a secret client reading `token_path` and fetching `cert_path`
    #[must_use]
    pub fn new(
        connector: Arc<dyn GatewayConnector>,
        token_path: impl Into<PathBuf>,
        cert_path: impl Into<String>,
    ) -> Self {
        Self {
            connector,
            token_path: token_path.into(),
            cert_path: cert_path.into(),
        }
    }

    /// Read and decode the bootstrap token file
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, [`Error::Decode`] if it is
    /// not `{"root_token": "..."}`, and [`Error::Validation`] if the token is empty.
    pub fn read_bootstrap_token(&self) -> Result<BootstrapToken> {
        read_token_file(&self.token_path)
    }

    /// Exchange a bootstrap token for the certificate pair
    ///
    /// # Errors
    ///
    /// Returns a transport, status or decode error from the secret service, or
    /// [`Error::Validation`] if either half of the pair is empty.
    pub async fn fetch_cert_pair(&self, token: &BootstrapToken) -> Result<CertificatePair> {
        let url = endpoint(self.connector.secret_base_url(), &self.cert_path)?;
        debug!(path = %self.cert_path, "Fetching certificate pair");

        let response = self
            .connector
            .http_client()
            .get(url)
            .header(SECRET_TOKEN_HEADER, token.expose())
            .send()
            .await
            .map_err(|e| Error::transport(&self.cert_path, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.ok();
            return Err(Error::Status {
                resource: self.cert_path.clone(),
                status,
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::transport(&self.cert_path, e))?;
        let envelope: SecretEnvelope =
            serde_json::from_slice(&bytes).map_err(|e| Error::decode(&self.cert_path, e))?;

        if !envelope.data.is_complete() {
            return Err(Error::Validation("empty certificate pair".to_string()));
        }

        info!(path = %self.cert_path, "Retrieved certificate pair");
        Ok(envelope.data)
    }

    /// Read the token and fetch the pair in one step
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub async fn load_cert_pair(&self) -> Result<CertificatePair> {
        let token = self.read_bootstrap_token()?;
        self.fetch_cert_pair(&token).await
    }
}

fn read_token_file(path: &Path) -> Result<BootstrapToken> {
    let raw = std::fs::read(path)?;
    let file: BootstrapTokenFile = serde_json::from_slice(&raw)
        .map_err(|e| Error::decode(path.display().to_string(), e))?;
    if file.root_token.is_empty() {
        return Err(Error::Validation(format!(
            "bootstrap token in {} is empty",
            path.display()
        )));
    }
    Ok(BootstrapToken(file.root_token))
}
