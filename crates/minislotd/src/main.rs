//! Minislot Daemon - deploys katana dev-node instances onto Kubernetes
//!
//! Loads the manifest template once, then serves POST /deploy.

use anyhow::{Context, Result};
use minislot_common::TierCatalog;
use minislotd::config::ServerConfig;
use minislotd::control_plane::KubeControlPlane;
use minislotd::deploy::Deployer;
use minislotd::server::{self, AppState};
use minislotd::template::ManifestTemplate;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Minislot Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::load().context("Failed to load configuration")?;

    let template = ManifestTemplate::load(&config.template_path)
        .with_context(|| format!("Failed to load template {}", config.template_path.display()))?;
    info!(
        "  Loaded template {} ({} placeholders)",
        template.name(),
        template.fields().len()
    );

    let control_plane = KubeControlPlane::connect()
        .await
        .context("Failed to create Kubernetes client")?;

    let deployer = Deployer::new(
        Arc::new(TierCatalog::standard()),
        Arc::new(template),
        Arc::new(control_plane),
        &config.default_namespace,
        config.create_timeout(),
    );

    server::run(AppState::new(deployer), &config.listen_addr()).await
}
