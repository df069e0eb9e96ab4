//! Gateway provisioning and credential issuance
//!
//! Drives an API gateway's admin API into a known baseline and manages the
//! consumers allowed through it.
//!
//! # Components
//!
//! - **`ResourceClient`**: create/list/delete with one idempotency policy
//! - **`SecretClient`**: bootstrap token and TLS certificate pair retrieval
//! - **`Provisioner`**: certificate, services, routes, auth and ACL plugins
//! - **`Resetter`**: deletes every managed resource in dependency order
//! - **`CredentialIssuer`**: consumers, ACL groups, JWT and OAuth2 tokens
//!
//! The library only emits `tracing` events; installing a subscriber is up to
//! the binary (see [`setup_tracing`]).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod admin;
pub mod cli;
pub mod config;
pub mod connector;
pub mod credential;
pub mod error;
pub mod health;
pub mod provision;
pub mod reset;
pub mod secrets;

pub use admin::ResourceClient;
pub use connector::{GatewayConnector, HttpConnector};
pub use credential::CredentialIssuer;
pub use error::{Error, Result};
pub use health::HealthCheck;
pub use provision::{ProvisionReport, Provisioner, Stage};
pub use reset::{ResetReport, Resetter};
pub use secrets::SecretClient;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
///
/// # Errors
///
/// Returns [`Error::Config`] if a global subscriber is already installed.
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    let installed = match format {
        Some("json") => subscriber.with(fmt::layer().json()).try_init(),
        _ => subscriber.with(fmt::layer()).try_init(),
    };

    installed.map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {e}")))
}
