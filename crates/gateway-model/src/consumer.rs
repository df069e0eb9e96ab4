//! Consumers and the credentials issued against them

use std::fmt;

use serde::{Deserialize, Serialize};

/// OAuth2 grant type used to mint consumer tokens
pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

/// Consumer upsert body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumer {
    /// Username (resource identity)
    pub username: String,
}

/// ACL group association (form-encoded)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclGroup {
    /// Group name
    pub group: String,
}

/// JWT credential returned by `POST consumers/{name}/jwt`
#[derive(Clone, Deserialize, Serialize)]
pub struct JwtCredential {
    /// Key identifying the credential
    pub key: String,
    /// HMAC signing secret
    pub secret: String,
    /// Credential id
    #[serde(default)]
    pub id: Option<String>,
}

impl fmt::Debug for JwtCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtCredential")
            .field("key", &self.key)
            .field("secret", &"[redacted]")
            .field("id", &self.id)
            .finish()
    }
}

/// OAuth2 application registration for a consumer (form-encoded)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Application {
    /// Application name
    pub name: String,
    /// Client id
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
    /// Redirect URI required by the admin API even for client-credentials clients
    pub redirect_uris: String,
}

/// Client-credentials token request (form-encoded)
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientCredentialsRequest {
    /// Client id
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
    /// Always [`CLIENT_CREDENTIALS_GRANT`]
    pub grant_type: String,
    /// Requested scope(s), space separated
    pub scope: String,
}

impl fmt::Debug for ClientCredentialsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsRequest")
            .field("client_id", &self.client_id)
            .field("grant_type", &self.grant_type)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Token endpoint response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Bearer access token
    pub access_token: String,
    /// Usually `bearer`
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
}
