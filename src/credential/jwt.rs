//! JWT issuance from a gateway-generated credential

use gateway_model::{Collection, JwtCredential};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::Username;
use crate::admin::ResourceClient;
use crate::config::ProvisioningConfig;
use crate::{Error, Result};

/// Claims carried by a consumer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerClaims {
    /// Issuer: the configured service name
    pub iss: String,
    /// Subject: the consumer
    pub sub: String,
    /// Consumer account
    pub account: String,
    /// Credential key
    pub key: String,
}

pub(super) async fn issue(
    client: &ResourceClient,
    config: &dyn ProvisioningConfig,
    user: &Username,
) -> Result<String> {
    let path = format!("{}/jwt", Collection::Consumers.item_path(user.as_str()));
    let credential: JwtCredential = client.create_empty(&path).await?.json()?;
    if credential.secret.is_empty() {
        return Err(Error::Validation(format!(
            "gateway returned an empty JWT secret for {user}"
        )));
    }
    info!(consumer = %user, "Retrieved JWT credential");

    sign(config.service_name(), user.as_str(), &credential)
}

fn sign(issuer: &str, username: &str, credential: &JwtCredential) -> Result<String> {
    let claims = ConsumerClaims {
        iss: issuer.to_string(),
        sub: username.to_string(),
        account: username.to_string(),
        key: credential.key.clone(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(credential.secret.as_bytes()),
    )?;
    Ok(token)
}
