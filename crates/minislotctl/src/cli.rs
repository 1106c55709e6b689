//! Command-line flags for minislotctl

use anyhow::{bail, Result};
use clap::{ArgAction, Parser};
use minislot_common::{DeploymentRequest, TierCatalog};
use std::time::Duration;

// Version is embedded at build time
const VERSION: &str = env!("MINISLOT_VERSION");

#[derive(Parser, Debug)]
#[command(name = "minislotctl")]
#[command(about = "CLI for the minislot deployment server", long_about = None)]
// --version is the katana image tag, so the CLI's own version moves to -V
#[command(version = VERSION, disable_version_flag = true)]
pub struct Cli {
    /// Print minislotctl version
    #[arg(short = 'V', long = "cli-version", action = ArgAction::Version)]
    pub cli_version: Option<bool>,

    /// Deployment server URL
    #[arg(long, default_value = "http://localhost:8080")]
    pub server: String,

    /// Deployment ID
    #[arg(long)]
    pub id: String,

    /// Kubernetes namespace
    #[arg(long, default_value = "default")]
    pub namespace: String,

    /// Katana version (image tag)
    #[arg(long, default_value = "latest")]
    pub version: String,

    /// Seed value
    #[arg(long, default_value_t = 0)]
    pub seed: i64,

    /// Chain ID
    #[arg(long, default_value_t = 1)]
    pub chain_id: i64,

    /// Block time
    #[arg(long, default_value_t = 0)]
    pub block_time: i64,

    /// Resource tier (free, professional, enterprise)
    #[arg(long, default_value = "free")]
    pub tier: String,

    /// Storage class
    #[arg(long, default_value = "standard")]
    pub storage_class: String,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

impl Cli {
    /// Build the request, rejecting an unknown tier before any network call
    pub fn to_request(&self, catalog: &TierCatalog) -> Result<DeploymentRequest> {
        if !catalog.contains(&self.tier) {
            bail!(
                "invalid tier: {} (expected one of: {})",
                self.tier,
                catalog.names().join(", ")
            );
        }

        Ok(DeploymentRequest {
            id: self.id.clone(),
            namespace: self.namespace.clone(),
            version: self.version.clone(),
            seed: self.seed,
            chain_id: self.chain_id,
            block_time: self.block_time,
            tier: self.tier.clone(),
            storage_class: self.storage_class.clone(),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
