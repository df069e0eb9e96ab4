//! Gateway provisioning
//!
//! `init` walks a fixed sequence of stages and never backtracks:
//!
//! ```text
//! Start -> CertLoaded -> ServicesAndRoutesCreated -> AuthPluginInstalled -> AclInstalled -> Done
//! ```
//!
//! Every stage is attempted regardless of earlier failures. Failures are logged
//! and collected in the returned [`ProvisionReport`].

use std::fmt;
use std::sync::Arc;

use gateway_model::{CertificateUpload, Collection, OAuth2PluginConfig, Plugin, Route, ServiceRecord};
use tracing::{debug, error, info, warn};

use crate::Result;
use crate::admin::ResourceClient;
use crate::config::{AuthMethod, ProvisioningConfig, ServiceTarget};
use crate::secrets::SecretClient;

/// Provisioning stage most recently passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Nothing attempted yet
    Start,
    /// Certificate stage attempted
    CertLoaded,
    /// Every configured service and its route attempted
    ServicesAndRoutesCreated,
    /// Authentication plugin attempted
    AuthPluginInstalled,
    /// ACL plugin attempted
    AclInstalled,
    /// Run complete
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::CertLoaded => "cert-loaded",
            Self::ServicesAndRoutesCreated => "services-and-routes-created",
            Self::AuthPluginInstalled => "auth-plugin-installed",
            Self::AclInstalled => "acl-installed",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// A step that failed during `init`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// Stage the step belongs to
    pub stage: Stage,
    /// What was being attempted
    pub step: String,
    /// Rendered error
    pub error: String,
}

/// Outcome of a provisioning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Last stage reached
    pub stage: Stage,
    /// Services created or already present
    pub services: usize,
    /// Routes created or already present
    pub routes: usize,
    /// Failed steps, in order
    pub failures: Vec<StepFailure>,
}

impl ProvisionReport {
    fn new() -> Self {
        Self {
            stage: Stage::Start,
            services: 0,
            routes: 0,
            failures: Vec::new(),
        }
    }

    /// Every step succeeded
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn advance(&mut self, stage: Stage) {
        debug!(from = %self.stage, to = %stage, "Provisioning stage");
        self.stage = stage;
    }

    fn fail(&mut self, stage: Stage, step: impl Into<String>, err: &crate::Error) {
        let step = step.into();
        error!(stage = %stage, step = %step, error = %err, "Provisioning step failed");
        self.failures.push(StepFailure {
            stage,
            step,
            error: err.to_string(),
        });
    }
}

/// Applies the baseline gateway topology
pub struct Provisioner {
    client: ResourceClient,
    secrets: SecretClient,
    config: Arc<dyn ProvisioningConfig>,
}

impl Provisioner {
    /// Create a provisioner
    #[must_use]
    pub fn new(
        client: ResourceClient,
        secrets: SecretClient,
        config: Arc<dyn ProvisioningConfig>,
    ) -> Self {
        Self {
            client,
            secrets,
            config,
        }
    }

    /// Run every provisioning stage in order
    pub async fn init(&self) -> ProvisionReport {
        let mut report = ProvisionReport::new();
        info!("Provisioning gateway");

        if let Err(e) = self.load_certificate().await {
            report.fail(Stage::CertLoaded, "upload certificate", &e);
        }
        report.advance(Stage::CertLoaded);

        let mut targets = self.config.services();
        targets.sort_by(|a, b| a.service.name.cmp(&b.service.name));
        for target in &targets {
            self.register_service(target, &mut report).await;
        }
        report.advance(Stage::ServicesAndRoutesCreated);

        if let Err(e) = self.install_auth_plugin().await {
            report.fail(Stage::AuthPluginInstalled, "install authentication plugin", &e);
        }
        report.advance(Stage::AuthPluginInstalled);

        if let Err(e) = self.install_acl_plugin().await {
            report.fail(Stage::AclInstalled, "install ACL plugin", &e);
        }
        report.advance(Stage::AclInstalled);

        report.advance(Stage::Done);
        info!(
            services = report.services,
            routes = report.routes,
            failures = report.failures.len(),
            "Provisioning finished"
        );
        report
    }

    async fn load_certificate(&self) -> Result<()> {
        let pair = self.secrets.load_cert_pair().await?;
        let upload = CertificateUpload::new(pair, self.config.snis().to_vec());
        let outcome = self
            .client
            .create(Collection::Certificates.path(), &upload)
            .await?;
        if outcome.already_exists() {
            info!(snis = ?upload.snis, "Certificate already exists");
        } else {
            info!(snis = ?upload.snis, "Uploaded certificate");
        }
        Ok(())
    }

    async fn register_service(&self, target: &ServiceTarget, report: &mut ProvisionReport) {
        let name = &target.service.name;
        let path = Collection::Services.item_path(name);

        let outcome = match self.client.upsert(&path, &target.service).await {
            Ok(outcome) => outcome,
            Err(e) => {
                report.fail(Stage::ServicesAndRoutesCreated, format!("create service {name}"), &e);
                return;
            }
        };
        report.services += 1;
        if outcome.already_exists() {
            info!(service = %name, "Service already exists");
        } else {
            match outcome.json::<ServiceRecord>() {
                Ok(record) => info!(service = %name, id = %record.id, "Created service"),
                Err(e) => warn!(service = %name, error = %e, "Created service, response not decoded"),
            }
        }

        let route = Route::for_service(name, target.hosts.clone());
        let route_path = format!("{path}/routes");
        match self.client.create(&route_path, &route).await {
            Ok(outcome) => {
                report.routes += 1;
                if outcome.already_exists() {
                    info!(service = %name, route = %route.name, "Route already exists");
                } else {
                    info!(service = %name, route = %route.name, paths = ?route.paths, "Created route");
                }
            }
            Err(e) => {
                report.fail(Stage::ServicesAndRoutesCreated, format!("create route {name}"), &e);
            }
        }
    }

    async fn install_auth_plugin(&self) -> Result<()> {
        let method = self.config.auth_method();
        let plugin = match AuthMethod::parse(method) {
            Some(AuthMethod::Jwt) => Plugin::jwt(),
            Some(AuthMethod::OAuth2) => Plugin::oauth2(OAuth2PluginConfig {
                scopes: self.config.oauth2_scopes().to_vec(),
                mandatory_scope: self.config.mandatory_scope(),
                enable_client_credentials: true,
                global_credentials: true,
                token_expiration: self.config.token_ttl(),
            }),
            None => {
                return Err(crate::Error::Validation(format!(
                    "unsupported authentication method: {method}"
                )));
            }
        };
        self.install_plugin(&plugin).await
    }

    async fn install_acl_plugin(&self) -> Result<()> {
        self.install_plugin(&Plugin::acl(self.config.acl_whitelist()))
            .await
    }

    async fn install_plugin(&self, plugin: &Plugin) -> Result<()> {
        let outcome = self
            .client
            .create(Collection::Plugins.path(), plugin)
            .await?;
        if outcome.already_exists() {
            info!(plugin = plugin.name.as_str(), "Plugin already installed");
        } else {
            info!(plugin = plugin.name.as_str(), "Installed plugin");
        }
        Ok(())
    }
}
