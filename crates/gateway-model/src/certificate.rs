//! TLS certificate material and the secret-service envelopes carrying it

use std::fmt;

use serde::{Deserialize, Serialize};

/// Certificate and private key, PEM encoded
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificatePair {
    /// Certificate chain
    #[serde(default)]
    pub cert: String,
    /// Private key
    #[serde(default)]
    pub key: String,
}

impl CertificatePair {
    /// Both halves present
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.cert.is_empty() && !self.key.is_empty()
    }
}

impl fmt::Debug for CertificatePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificatePair")
            .field("cert_len", &self.cert.len())
            .field("key", &"[redacted]")
            .finish()
    }
}

/// Secret service read response: `{"data": {"cert": ..., "key": ...}}`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SecretEnvelope {
    /// Stored pair
    #[serde(default)]
    pub data: CertificatePair,
}

/// Body of `POST certificates`
#[derive(Clone, Serialize, Deserialize)]
pub struct CertificateUpload {
    /// Certificate chain
    pub cert: String,
    /// Private key
    pub key: String,
    /// Server names the certificate is served for
    pub snis: Vec<String>,
}

impl CertificateUpload {
    /// Bind a pair to a list of SNIs
    #[must_use]
    pub fn new(pair: CertificatePair, snis: Vec<String>) -> Self {
        Self {
            cert: pair.cert,
            key: pair.key,
            snis,
        }
    }
}

impl fmt::Debug for CertificateUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateUpload")
            .field("snis", &self.snis)
            .finish_non_exhaustive()
    }
}

/// Bootstrap token file written by the secret-service initialiser
#[derive(Deserialize, Serialize)]
pub struct BootstrapTokenFile {
    /// Token granting read access to the certificate path
    pub root_token: String,
}
