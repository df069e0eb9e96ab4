//! Configuration management

use std::{
    collections::HashMap,
    env, fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use gateway_model::GatewayService;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Environment files to load before processing config.
    /// Paths support ~ expansion. Loaded in order, later files override earlier.
    /// Variables are set into the process environment for `${VAR}` resolution.
    #[serde(default)]
    pub env_files: Vec<String>,
    /// Name the gateway is provisioned for; JWT issuer and OAuth2 application name
    pub service_name: String,
    /// Gateway endpoints and HTTP client settings
    pub gateway: GatewayConfig,
    /// Authentication method configuration
    pub auth: AuthConfig,
    /// Access control configuration
    pub acl: AclConfig,
    /// Secret-management service configuration
    pub secret_service: SecretServiceConfig,
    /// Backend services fronted by the gateway, keyed by service name
    pub services: HashMap<String, ServiceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env_files: Vec::new(),
            service_name: "gateway".to_string(),
            gateway: GatewayConfig::default(),
            auth: AuthConfig::default(),
            acl: AclConfig::default(),
            secret_service: SecretServiceConfig::default(),
            services: HashMap::new(),
        }
    }
}

/// Gateway endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Gateway host
    pub server: String,
    /// Admin API port
    pub admin_port: u16,
    /// Admin API scheme
    pub admin_scheme: String,
    /// TLS application port (serves the OAuth2 token endpoint)
    pub application_port_ssl: u16,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Skip TLS verification (self-signed gateway/secret-service certificates)
    pub insecure_skip_verify: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: "localhost".to_string(),
            admin_port: 8001,
            admin_scheme: "http".to_string(),
            application_port_ssl: 8443,
            request_timeout: Duration::from_secs(10),
            insecure_skip_verify: false,
        }
    }
}

/// Authentication method configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// `jwt` or `oauth2`
    pub method: String,
    /// OAuth2 scopes
    pub scopes: Vec<String>,
    /// Require a scope on OAuth2 token requests
    pub mandatory_scope: bool,
    /// OAuth2 access token lifetime in seconds
    pub token_ttl: u64,
    /// Route prefix the OAuth2 token endpoint is reached through
    pub resource: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            method: AuthMethod::Jwt.as_str().to_string(),
            scopes: vec!["all".to_string()],
            mandatory_scope: true,
            token_ttl: 7200,
            resource: "coredata".to_string(),
        }
    }
}

/// Access control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    /// Group admitted by the gateway-wide ACL plugin
    pub whitelist: String,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            whitelist: "admin".to_string(),
        }
    }
}

/// Secret-management service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretServiceConfig {
    /// Secret service host
    pub server: String,
    /// Secret service port
    pub port: u16,
    /// Secret service scheme
    pub scheme: String,
    /// Health endpoint, relative to the base URL
    pub health_check_path: String,
    /// Certificate secret path, relative to the base URL
    pub cert_path: String,
    /// Bootstrap token file (supports ~ and `${VAR}`)
    pub token_path: String,
    /// Extra PEM root certificate trusted by the HTTP client
    pub ca_cert_path: Option<String>,
    /// Server names the uploaded certificate is bound to
    pub snis: Vec<String>,
}

impl Default for SecretServiceConfig {
    fn default() -> Self {
        Self {
            server: "localhost".to_string(),
            port: 8200,
            scheme: "https".to_string(),
            health_check_path: "v1/sys/health".to_string(),
            cert_path: "v1/secret/gateway/pki/tls/gateway".to_string(),
            token_path: "res/resp-init.json".to_string(),
            ca_cert_path: None,
            snis: vec!["gateway".to_string()],
        }
    }
}

/// Backend service definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Upstream host
    pub host: String,
    /// Upstream port
    pub port: u16,
    /// Upstream protocol
    #[serde(default = "default_protocol")]
    pub protocol: String,
    /// Host matches added to the service's route
    #[serde(default)]
    pub hosts: Vec<String>,
}

fn default_protocol() -> String {
    "http".to_string()
}

/// Authentication protocol; exactly one is active on the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Signed JWT issued from a consumer credential
    Jwt,
    /// OAuth2 client-credentials bearer token
    OAuth2,
}

impl AuthMethod {
    /// Parse a configured method name; `None` for anything unsupported
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "jwt" => Some(Self::Jwt),
            "oauth2" => Some(Self::OAuth2),
            _ => None,
        }
    }

    /// Configured name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jwt => "jwt",
            Self::OAuth2 => "oauth2",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A service to register, plus the host matches for its route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTarget {
    /// Service resource
    pub service: GatewayService,
    /// Route host matches
    pub hosts: Vec<String>,
}

/// What the engine needs to know about the target topology
pub trait ProvisioningConfig: Send + Sync {
    /// JWT issuer / OAuth2 application name
    fn service_name(&self) -> &str;
    /// Services to register, in no guaranteed order
    fn services(&self) -> Vec<ServiceTarget>;
    /// Configured authentication method name, unparsed
    fn auth_method(&self) -> &str;
    /// OAuth2 scopes
    fn oauth2_scopes(&self) -> &[String];
    /// OAuth2 mandatory-scope flag
    fn mandatory_scope(&self) -> bool;
    /// OAuth2 token lifetime in seconds
    fn token_ttl(&self) -> u64;
    /// Route prefix of the OAuth2 token endpoint
    fn token_resource(&self) -> &str;
    /// ACL whitelist group
    fn acl_whitelist(&self) -> &str;
    /// SNIs for the uploaded certificate
    fn snis(&self) -> &[String];
    /// Certificate secret path on the secret service
    fn cert_path(&self) -> &str;
    /// Bootstrap token file
    fn token_path(&self) -> PathBuf;
}

impl ProvisioningConfig for Config {
    fn service_name(&self) -> &str {
        &self.service_name
    }

    fn services(&self) -> Vec<ServiceTarget> {
        self.services
            .iter()
            .map(|(name, svc)| ServiceTarget {
                service: GatewayService {
                    name: name.clone(),
                    host: svc.host.clone(),
                    port: svc.port,
                    protocol: svc.protocol.clone(),
                },
                hosts: svc.hosts.clone(),
            })
            .collect()
    }

    fn auth_method(&self) -> &str {
        &self.auth.method
    }

    fn oauth2_scopes(&self) -> &[String] {
        &self.auth.scopes
    }

    fn mandatory_scope(&self) -> bool {
        self.auth.mandatory_scope
    }

    fn token_ttl(&self) -> u64 {
        self.auth.token_ttl
    }

    fn token_resource(&self) -> &str {
        &self.auth.resource
    }

    fn acl_whitelist(&self) -> &str {
        &self.acl.whitelist
    }

    fn snis(&self) -> &[String] {
        &self.secret_service.snis
    }

    fn cert_path(&self) -> &str {
        &self.secret_service.cert_path
    }

    fn token_path(&self) -> PathBuf {
        PathBuf::from(expand_home(&self.secret_service.token_path))
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        // GATEWAY_PROVISION_GATEWAY__SERVER=... overrides gateway.server
        figment = figment.merge(Env::prefixed("GATEWAY_PROVISION_").split("__"));

        let mut config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        config.load_env_files();
        config.expand_env_vars()?;
        config.validate()?;

        Ok(config)
    }

    /// Load environment files into the process environment.
    /// Supports ~ expansion. Files that don't exist are silently skipped.
    fn load_env_files(&self) {
        for path_str in &self.env_files {
            let expanded = expand_home(path_str);
            let path = Path::new(&expanded);
            if path.exists() {
                match dotenvy::from_path(path) {
                    Ok(()) => {
                        tracing::info!("Loaded env file: {expanded}");
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load env file {expanded}: {e}");
                    }
                }
            } else {
                tracing::debug!("Env file not found (skipped): {expanded}");
            }
        }
    }

    /// Expand ${VAR} and ${VAR:-default} patterns in endpoint and secret settings
    fn expand_env_vars(&mut self) -> Result<()> {
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
            .map_err(|e| Error::Config(e.to_string()))?;

        self.gateway.server = Self::expand_string(&re, &self.gateway.server);
        let secret = &mut self.secret_service;
        secret.server = Self::expand_string(&re, &secret.server);
        secret.cert_path = Self::expand_string(&re, &secret.cert_path);
        secret.token_path = Self::expand_string(&re, &secret.token_path);
        if let Some(ca) = secret.ca_cert_path.as_mut() {
            *ca = Self::expand_string(&re, ca);
        }
        Ok(())
    }

    /// Expand environment variables in a string
    fn expand_string(re: &Regex, value: &str) -> String {
        re.replace_all(value, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default = caps.get(2).map_or("", |m| m.as_str());
            env::var(var_name).unwrap_or_else(|_| default.to_string())
        })
        .into_owned()
    }

    /// Reject settings no gateway would accept
    fn validate(&self) -> Result<()> {
        if self.service_name.is_empty() {
            return Err(Error::Config("service_name must not be empty".to_string()));
        }
        if self.acl.whitelist.is_empty() {
            return Err(Error::Config("acl.whitelist must not be empty".to_string()));
        }
        for (name, svc) in &self.services {
            if !is_path_segment(name) {
                return Err(Error::Config(format!("invalid service name '{name}'")));
            }
            if svc.port == 0 {
                return Err(Error::Config(format!("service '{name}' has port 0")));
            }
        }
        Ok(())
    }

    /// Admin API base URL, with trailing slash
    #[must_use]
    pub fn admin_base_url(&self) -> String {
        format!(
            "{}://{}:{}/",
            self.gateway.admin_scheme, self.gateway.server, self.gateway.admin_port
        )
    }

    /// Secret service base URL, with trailing slash
    #[must_use]
    pub fn secret_base_url(&self) -> String {
        format!(
            "{}://{}:{}/",
            self.secret_service.scheme, self.secret_service.server, self.secret_service.port
        )
    }

    /// Gateway TLS application base URL, with trailing slash
    #[must_use]
    pub fn application_base_url(&self) -> String {
        format!(
            "https://{}:{}/",
            self.gateway.server, self.gateway.application_port_ssl
        )
    }
}

/// A service name is used verbatim as a URL path segment
fn is_path_segment(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '~' | '-'))
}

/// Replace a leading `~` with the home directory
fn expand_home(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.display().to_string(), 1);
        }
    }
    path.to_string()
}

/// Custom humantime serde module for Duration
pub mod humantime_serde {
    use std::time::Duration;

    use serde::{self, Deserialize, Deserializer, Serializer};

    /// Serialize Duration to human-readable string (e.g., "30s")
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the serializer fails.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    /// Deserialize human-readable duration string (e.g., "30s", "5m", "100ms")
    ///
    /// # Errors
    ///
    /// Returns a deserialization error if the string cannot be parsed as a duration.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        // "ms" must be checked before "s"
        if let Some(ms) = s.strip_suffix("ms") {
            ms.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(serde::de::Error::custom)
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(serde::de::Error::custom)
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(serde::de::Error::custom)
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(serde::de::Error::custom)
        }
    }
}
