//! OAuth2 client-credentials issuance
//!
//! The consumer is registered as an OAuth2 application whose client id and
//! secret are both the username, then a client-credentials grant is run
//! against the gateway's TLS application port.

use gateway_model::{
    CLIENT_CREDENTIALS_GRANT, ClientCredentialsRequest, Collection, OAuth2Application,
    TokenResponse,
};
use reqwest::StatusCode;
use tracing::{debug, info};

use super::Username;
use crate::admin::ResourceClient;
use crate::config::ProvisioningConfig;
use crate::connector::endpoint;
use crate::{Error, Result};

/// Statuses accepted from the token endpoint
const TOKEN_SUCCESS: [StatusCode; 2] = [StatusCode::OK, StatusCode::CREATED];

pub(super) async fn issue(
    client: &ResourceClient,
    config: &dyn ProvisioningConfig,
    user: &Username,
) -> Result<String> {
    register(client, config, user).await?;
    request_token(client, config, user).await
}

async fn register(
    client: &ResourceClient,
    config: &dyn ProvisioningConfig,
    user: &Username,
) -> Result<()> {
    let path = format!("{}/oauth2", Collection::Consumers.item_path(user.as_str()));
    let application = OAuth2Application {
        name: config.service_name().to_string(),
        client_id: user.to_string(),
        client_secret: user.to_string(),
        redirect_uris: format!("http://{}", config.service_name()),
    };
    let outcome = client.create_form(&path, &application).await?;
    if outcome.already_exists() {
        info!(consumer = %user, "OAuth2 application already registered");
    } else {
        info!(consumer = %user, "Registered OAuth2 application");
    }
    Ok(())
}

async fn request_token(
    client: &ResourceClient,
    config: &dyn ProvisioningConfig,
    user: &Username,
) -> Result<String> {
    let connector = client.connector();
    let resource = format!(
        "{}/oauth2/token",
        config.token_resource().trim_matches('/')
    );
    let url = endpoint(connector.application_base_url(), &resource)?;

    let form = ClientCredentialsRequest {
        client_id: user.to_string(),
        client_secret: user.to_string(),
        grant_type: CLIENT_CREDENTIALS_GRANT.to_string(),
        scope: config.oauth2_scopes().join(" "),
    };
    debug!(consumer = %user, url = %url, "Requesting client-credentials token");

    let response = connector
        .http_client()
        .post(url)
        .form(&form)
        .send()
        .await
        .map_err(|e| Error::transport(&resource, e))?;

    let status = response.status();
    if !TOKEN_SUCCESS.contains(&status) {
        let body = response.text().await.ok();
        return Err(Error::Status {
            resource,
            status,
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::transport(&resource, e))?;
    let token: TokenResponse =
        serde_json::from_slice(&bytes).map_err(|e| Error::decode(&resource, e))?;
    if token.access_token.is_empty() {
        return Err(Error::decode(&resource, "empty access_token"));
    }

    info!(consumer = %user, expires_in = ?token.expires_in, "Issued OAuth2 token");
    Ok(token.access_token)
}
