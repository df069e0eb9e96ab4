//! Gateway plugins: authentication (jwt, oauth2) and access control (acl)

use std::fmt;

use serde::{Deserialize, Serialize};

/// Plugin kinds installed by the provisioner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    /// JSON Web Token authentication
    Jwt,
    /// OAuth2 authentication
    #[serde(rename = "oauth2")]
    OAuth2,
    /// Access control list
    Acl,
}

impl PluginKind {
    /// Name the admin API knows the plugin by
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jwt => "jwt",
            Self::OAuth2 => "oauth2",
            Self::Acl => "acl",
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OAuth2 plugin parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2PluginConfig {
    /// Scopes clients may request
    pub scopes: Vec<String>,
    /// Reject token requests that carry no scope
    pub mandatory_scope: bool,
    /// Allow the client-credentials grant
    pub enable_client_credentials: bool,
    /// Share credentials across every service using the plugin
    pub global_credentials: bool,
    /// Access token lifetime in seconds
    pub token_expiration: u64,
}

/// ACL plugin parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclPluginConfig {
    /// Groups allowed through
    pub whitelist: Vec<String>,
}

/// Kind-specific parameter bag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginConfig {
    /// `oauth2` parameters
    OAuth2(OAuth2PluginConfig),
    /// `acl` parameters
    Acl(AclPluginConfig),
}

/// Plugin installation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    /// Plugin kind
    pub name: PluginKind,
    /// Parameters; the JWT plugin takes none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<PluginConfig>,
}

impl Plugin {
    /// JWT plugin with default parameters
    #[must_use]
    pub const fn jwt() -> Self {
        Self {
            name: PluginKind::Jwt,
            config: None,
        }
    }

    /// OAuth2 plugin
    #[must_use]
    pub fn oauth2(config: OAuth2PluginConfig) -> Self {
        Self {
            name: PluginKind::OAuth2,
            config: Some(PluginConfig::OAuth2(config)),
        }
    }

    /// ACL plugin admitting a single group
    #[must_use]
    pub fn acl(group: impl Into<String>) -> Self {
        Self {
            name: PluginKind::Acl,
            config: Some(PluginConfig::Acl(AclPluginConfig {
                whitelist: vec![group.into()],
            })),
        }
    }
}
