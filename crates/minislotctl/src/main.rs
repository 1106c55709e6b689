//! Minislot Control - CLI client for the minislot deployment server
//!
//! Validates the tier locally, then submits a deployment request.

use anyhow::Result;
use clap::Parser;
use minislot_common::TierCatalog;
use minislotctl::cli::Cli;
use minislotctl::client::DeployClient;
use owo_colors::OwoColorize;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let request = cli.to_request(&TierCatalog::standard())?;
    let client = DeployClient::new(&cli.server, cli.request_timeout())?;
    let response = client.deploy(&request).await?;

    println!("{}", response.message.green().bold());
    for resource in &response.resources {
        println!(
            "  {} {}/{}",
            resource.kind.dimmed(),
            response.namespace,
            resource.name
        );
    }

    Ok(())
}
