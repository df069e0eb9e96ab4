//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Provision an API gateway and issue consumer credentials
#[derive(Parser, Debug)]
#[command(name = "gateway-provision")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "GATEWAY_PROVISION_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Accept invalid TLS certificates from the gateway and secret service
    #[arg(long, env = "GATEWAY_PROVISION_INSECURE_SKIP_VERIFY", global = true)]
    pub insecure_skip_verify: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        long,
        default_value = "info",
        env = "GATEWAY_PROVISION_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "GATEWAY_PROVISION_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Upload the TLS certificate and register services, routes and plugins
    Init,

    /// Delete every route, service, consumer, plugin and certificate
    Reset,

    /// Create a consumer and print a token for it
    UserAdd {
        /// Consumer name (letters only)
        username: String,

        /// ACL group to join (defaults to the configured whitelist group)
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Delete a consumer
    UserDel {
        /// Consumer name (letters only)
        username: String,
    },
}

impl Command {
    /// Whether the command needs the secret service
    #[must_use]
    pub fn needs_secret_service(&self) -> bool {
        matches!(self, Self::Init)
    }
}
