//! Gateway admin API wire types
//!
//! Request and response bodies exchanged with the gateway admin API, the
//! secret-management service and the OAuth2 token endpoint. Everything here is
//! plain data; HTTP handling lives in the `gateway-provision` crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod certificate;
mod collection;
mod consumer;
mod plugin;
mod service;

pub use certificate::{BootstrapTokenFile, CertificatePair, CertificateUpload, SecretEnvelope};
pub use collection::{Collection, Page, ResourceId};
pub use consumer::{
    AclGroup, ClientCredentialsRequest, Consumer, JwtCredential, OAuth2Application, TokenResponse,
    CLIENT_CREDENTIALS_GRANT,
};
pub use plugin::{AclPluginConfig, OAuth2PluginConfig, Plugin, PluginConfig, PluginKind};
pub use service::{GatewayService, Route, ServiceRecord};
