//! JSON schemas for the minislot API

use serde::{Deserialize, Serialize};

use crate::tiers::DEFAULT_TIER;

/// Request to deploy a katana instance.
///
/// Only `id` is required. An empty `namespace` means the daemon's
/// configured default namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRequest {
    pub id: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub seed: i64,
    #[serde(default = "default_chain_id")]
    pub chain_id: i64,
    #[serde(default)]
    pub block_time: i64,
    #[serde(default = "default_tier")]
    pub tier: String,
    #[serde(default = "default_storage_class")]
    pub storage_class: String,
}

pub fn default_version() -> String {
    "latest".to_string()
}

pub fn default_chain_id() -> i64 {
    1
}

pub fn default_tier() -> String {
    DEFAULT_TIER.to_string()
}

pub fn default_storage_class() -> String {
    "standard".to_string()
}

impl DeploymentRequest {
    /// Request with the given id and every other field at its default
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            namespace: String::new(),
            version: default_version(),
            seed: 0,
            chain_id: default_chain_id(),
            block_time: 0,
            tier: default_tier(),
            storage_class: default_storage_class(),
        }
    }
}

/// A resource created on the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResourceInfo {
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

/// Successful deploy response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployResponse {
    pub message: String,
    pub namespace: String,
    #[serde(default)]
    pub resources: Vec<CreatedResourceInfo>,
}

/// Error body returned with any non-2xx status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub alive: bool,
    #[serde(default)]
    pub uptime_seconds: u64,
}
