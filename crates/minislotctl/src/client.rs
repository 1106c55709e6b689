//! HTTP client for the minislot deployment server

use anyhow::{Context, Result};
use minislot_common::{DeployResponse, DeploymentRequest, ErrorResponse};
use reqwest::StatusCode;
use std::time::Duration;

/// Client for POST /deploy
pub struct DeployClient {
    client: reqwest::Client,
    base_url: String,
}

impl DeployClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Submit a deployment; any status other than 201 is an error carrying the server's message
    pub async fn deploy(&self, request: &DeploymentRequest) -> Result<DeployResponse> {
        let url = format!("{}/deploy", self.base_url);

        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Error sending request to {}", url))?;

        let status = resp.status();
        if status != StatusCode::CREATED {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Deployment failed ({}): {}", status, error_message(&text, status));
        }

        resp.json()
            .await
            .context("Failed to parse deployment response")
    }
}

/// Server `error` field, or the raw body, or the status text
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(err) = serde_json::from_str::<ErrorResponse>(body) {
        return err.error;
    }
    if !body.trim().is_empty() {
        return body.trim().to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unexpected status code")
        .to_string()
}
