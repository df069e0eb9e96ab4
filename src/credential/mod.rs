//! Consumer lifecycle and token issuance
//!
//! Usernames are checked against `^[A-Za-z]+$` before anything is sent to the
//! gateway. Token issuance follows the configured authentication method.

mod jwt;
mod oauth2;

use std::fmt;
use std::sync::{Arc, OnceLock};

use gateway_model::{AclGroup, Collection, Consumer};
use regex::Regex;
use tracing::info;

use crate::admin::ResourceClient;
use crate::config::{AuthMethod, ProvisioningConfig};
use crate::{Error, Result};

pub use jwt::ConsumerClaims;

/// A consumer name that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    /// Validate a raw username
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] unless the name is one or more ASCII letters.
    pub fn parse(raw: &str) -> Result<Self> {
        static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
        let re = USERNAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z]+$").expect("valid username pattern"));

        if re.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(Error::Validation(format!(
                "username {raw:?} may only contain letters"
            )))
        }
    }

    /// The validated name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creates and deletes consumers and mints their tokens
pub struct CredentialIssuer {
    client: ResourceClient,
    config: Arc<dyn ProvisioningConfig>,
}

impl CredentialIssuer {
    /// Create an issuer
    #[must_use]
    pub fn new(client: ResourceClient, config: Arc<dyn ProvisioningConfig>) -> Self {
        Self { client, config }
    }

    /// Create a consumer and add it to an ACL group
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a bad username, or the first failing
    /// admin API call. A failed group association fails the whole operation.
    pub async fn create(&self, username: &str, group: &str) -> Result<()> {
        let user = Username::parse(username)?;
        let path = Collection::Consumers.item_path(user.as_str());

        let outcome = self
            .client
            .upsert(
                &path,
                &Consumer {
                    username: user.to_string(),
                },
            )
            .await?;
        if outcome.already_exists() {
            info!(consumer = %user, "Consumer already exists");
        } else {
            info!(consumer = %user, "Created consumer");
        }

        self.client
            .create_form(
                &format!("{path}/acls"),
                &AclGroup {
                    group: group.to_string(),
                },
            )
            .await?;
        info!(consumer = %user, group, "Associated consumer with ACL group");
        Ok(())
    }

    /// Delete a consumer
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a bad username, or a status error when the
    /// gateway does not confirm the deletion (including a missing consumer).
    pub async fn delete(&self, username: &str) -> Result<()> {
        let user = Username::parse(username)?;
        self.client
            .delete(Collection::Consumers, user.as_str())
            .await?;
        info!(consumer = %user, "Deleted consumer");
        Ok(())
    }

    /// Mint a token for an existing consumer using the configured method
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a bad username or an unknown method, and
    /// [`Error::TokenIssuance`] wrapping the first failing step otherwise.
    pub async fn create_token(&self, username: &str) -> Result<String> {
        let user = Username::parse(username)?;
        let method = self.config.auth_method();

        let issued = match AuthMethod::parse(method) {
            Some(AuthMethod::Jwt) => jwt::issue(&self.client, self.config.as_ref(), &user).await,
            Some(AuthMethod::OAuth2) => {
                oauth2::issue(&self.client, self.config.as_ref(), &user).await
            }
            None => {
                return Err(Error::Validation(format!(
                    "unknown authentication method: {method}"
                )));
            }
        };

        issued.map_err(|e| Error::TokenIssuance {
            username: user.to_string(),
            source: Box::new(e),
        })
    }
}
