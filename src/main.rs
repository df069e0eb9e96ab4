//! gateway-provision - gateway baseline provisioning and consumer credentials

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use gateway_provision::{
    CredentialIssuer, HealthCheck, HttpConnector, Provisioner, ResourceClient, Resetter,
    SecretClient,
    cli::{Cli, Command},
    config::{Config, ProvisioningConfig},
    connector::GatewayConnector,
    setup_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(mut config) => {
            if cli.insecure_skip_verify {
                config.gateway.insecure_skip_verify = true;
            }
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        admin = %config.admin_base_url(),
        services = config.services.len(),
        auth = %config.auth.method,
        "Starting gateway-provision"
    );

    let connector: Arc<dyn GatewayConnector> = match HttpConnector::from_config(&config) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!("Failed to build HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let health = HealthCheck::new(
        Arc::clone(&connector),
        config.secret_service.health_check_path.clone(),
    );
    if let Err(e) = health.check_gateway().await {
        error!("{e}");
        return ExitCode::FAILURE;
    }
    if cli.command.needs_secret_service() {
        if let Err(e) = health.check_secret_service().await {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    }

    let config: Arc<dyn ProvisioningConfig> = Arc::new(config);
    let client = ResourceClient::new(Arc::clone(&connector));

    match cli.command {
        Command::Init => {
            let secrets = SecretClient::new(
                Arc::clone(&connector),
                config.token_path(),
                config.cert_path(),
            );
            let report = Provisioner::new(client, secrets, config).init().await;
            if report.is_clean() {
                info!(stage = %report.stage, "Gateway provisioned");
            } else {
                warn!(
                    stage = %report.stage,
                    failures = report.failures.len(),
                    "Gateway provisioned with failures"
                );
            }
            ExitCode::SUCCESS
        }
        Command::Reset => {
            let report = Resetter::new(client).reset().await;
            if report.is_clean() {
                info!(deleted = report.deleted, "Gateway reset");
            } else {
                warn!(
                    deleted = report.deleted,
                    failures = report.failures.len(),
                    "Gateway reset with failures"
                );
            }
            ExitCode::SUCCESS
        }
        Command::UserAdd { username, group } => {
            let group = group.unwrap_or_else(|| config.acl_whitelist().to_string());
            let issuer = CredentialIssuer::new(client, Arc::clone(&config));
            if let Err(e) = issuer.create(&username, &group).await {
                error!("Failed to create consumer {username}: {e}");
                return ExitCode::FAILURE;
            }
            match issuer.create_token(&username).await {
                Ok(token) => {
                    println!("Token for consumer {username}: {token}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("{e}");
                    ExitCode::FAILURE
                }
            }
        }
        Command::UserDel { username } => {
            let issuer = CredentialIssuer::new(client, config);
            match issuer.delete(&username).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!("Failed to delete consumer {username}: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
