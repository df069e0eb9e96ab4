//! Gateway admin API resource client
//!
//! Create, list and delete against the admin API collections with a single
//! idempotency policy: writes succeed on `200`, `201` and `409` (the resource
//! already exists), deletes on `200`, `201` and `204`. Nothing is retried.

use std::collections::HashSet;
use std::sync::Arc;

use gateway_model::{Collection, Page, ResourceId};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::connector::{GatewayConnector, endpoint};
use crate::{Error, Result};

/// Statuses accepted for create/upsert
pub const WRITE_SUCCESS: [StatusCode; 3] =
    [StatusCode::OK, StatusCode::CREATED, StatusCode::CONFLICT];

/// Statuses accepted for delete
pub const DELETE_SUCCESS: [StatusCode; 3] =
    [StatusCode::OK, StatusCode::CREATED, StatusCode::NO_CONTENT];

/// Result of an accepted write
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// Resource path written to
    pub resource: String,
    /// Status returned by the admin API
    pub status: StatusCode,
    body: String,
}

impl WriteOutcome {
    /// The resource was already present (`409 Conflict`)
    #[must_use]
    pub fn already_exists(&self) -> bool {
        self.status == StatusCode::CONFLICT
    }

    /// Decode the response body
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the body is not the expected JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| Error::decode(&self.resource, e))
    }
}

/// Admin API client shared by the provisioner, resetter and credential issuer
#[derive(Clone)]
pub struct ResourceClient {
    connector: Arc<dyn GatewayConnector>,
}

impl ResourceClient {
    /// Create a resource client over a connector
    #[must_use]
    pub fn new(connector: Arc<dyn GatewayConnector>) -> Self {
        Self { connector }
    }

    /// The connector this client talks through
    #[must_use]
    pub fn connector(&self) -> &Arc<dyn GatewayConnector> {
        &self.connector
    }

    /// `POST` a JSON body to an append-only collection or sub-resource
    pub async fn create<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<WriteOutcome> {
        self.write(Method::POST, path, |req| req.json(body)).await
    }

    /// `POST` a form-encoded body
    pub async fn create_form<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<WriteOutcome> {
        self.write(Method::POST, path, |req| req.form(body)).await
    }

    /// `POST` without a body, letting the gateway generate the resource
    pub async fn create_empty(&self, path: &str) -> Result<WriteOutcome> {
        self.write(Method::POST, path, |req| req).await
    }

    /// `PUT` a JSON body to a resource addressed by its identity
    pub async fn upsert<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<WriteOutcome> {
        self.write(Method::PUT, path, |req| req.json(body)).await
    }

    async fn write(
        &self,
        method: Method,
        path: &str,
        with_body: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<WriteOutcome> {
        let url = endpoint(self.connector.admin_base_url(), path)?;
        debug!(%method, resource = path, "Admin API write");

        let request = self.connector.http_client().request(method, url);
        let response = with_body(request)
            .send()
            .await
            .map_err(|e| Error::transport(path, e))?;

        let status = response.status();
        if !WRITE_SUCCESS.contains(&status) {
            let body = response.text().await.ok();
            return Err(Error::Status {
                resource: path.to_string(),
                status,
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(path, e))?;
        Ok(WriteOutcome {
            resource: path.to_string(),
            status,
            body,
        })
    }

    /// List every item id in a collection, following pagination
    ///
    /// A cursor the admin API already handed out is a [`Error::Decode`].
    pub async fn list(&self, collection: Collection) -> Result<Vec<ResourceId>> {
        let url = endpoint(self.connector.admin_base_url(), collection.path())?;
        let mut ids = Vec::new();
        let mut offset: Option<String> = None;
        let mut seen = HashSet::new();

        loop {
            let mut request = self.connector.http_client().get(url.clone());
            if let Some(ref off) = offset {
                request = request.query(&[("offset", off)]);
            }
            let response = request
                .send()
                .await
                .map_err(|e| Error::transport(collection.path(), e))?;

            let status = response.status();
            if status != StatusCode::OK {
                let body = response.text().await.ok();
                return Err(Error::Status {
                    resource: collection.path().to_string(),
                    status,
                    body,
                });
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| Error::transport(collection.path(), e))?;
            let page: Page = serde_json::from_slice(&bytes)
                .map_err(|e| Error::decode(collection.path(), e))?;
            ids.extend(page.data);

            match page.offset {
                Some(next) if !seen.insert(next.clone()) => {
                    return Err(Error::decode(
                        collection.path(),
                        format!("pagination cursor {next:?} repeated"),
                    ));
                }
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        debug!(collection = %collection, count = ids.len(), "Listed collection");
        Ok(ids)
    }

    /// Delete one item of a collection by id (or name, where the API accepts it)
    pub async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let path = collection.item_path(id);
        let url = endpoint(self.connector.admin_base_url(), &path)?;
        debug!(resource = %path, "Admin API delete");

        let response = self
            .connector
            .http_client()
            .delete(url)
            .send()
            .await
            .map_err(|e| Error::transport(&path, e))?;

        let status = response.status();
        if DELETE_SUCCESS.contains(&status) {
            Ok(())
        } else {
            let body = response.text().await.ok();
            Err(Error::Status {
                resource: path,
                status,
                body,
            })
        }
    }
}
