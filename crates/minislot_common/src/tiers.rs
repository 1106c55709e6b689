//! Resource tiers - named presets of storage, memory and CPU quantities.
//!
//! Quantities use Kubernetes quantity syntax ("2Gi", "500m") and are passed
//! through to the rendered manifest untouched.

use serde::{Deserialize, Serialize};

/// Tier used when a request does not name one
pub const DEFAULT_TIER: &str = "free";

/// A named bundle of resource quantities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTier {
    /// Persistent volume claim size
    pub storage: String,
    pub memory_request: String,
    pub memory_limit: String,
    pub cpu_request: String,
    pub cpu_limit: String,
}

impl ResourceTier {
    fn new(
        storage: &str,
        memory_request: &str,
        memory_limit: &str,
        cpu_request: &str,
        cpu_limit: &str,
    ) -> Self {
        Self {
            storage: storage.to_string(),
            memory_request: memory_request.to_string(),
            memory_limit: memory_limit.to_string(),
            cpu_request: cpu_request.to_string(),
            cpu_limit: cpu_limit.to_string(),
        }
    }
}

/// Fixed catalog of tiers, built once at startup and only ever read.
#[derive(Debug, Clone)]
pub struct TierCatalog {
    tiers: Vec<(String, ResourceTier)>,
}

impl TierCatalog {
    /// The standard catalog: free, professional, enterprise
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                (
                    "free".to_string(),
                    ResourceTier::new("1Gi", "1Gi", "2Gi", "500m", "1"),
                ),
                (
                    "professional".to_string(),
                    ResourceTier::new("10Gi", "2Gi", "4Gi", "1", "2"),
                ),
                (
                    "enterprise".to_string(),
                    ResourceTier::new("50Gi", "4Gi", "8Gi", "2", "4"),
                ),
            ],
        }
    }

    /// Look up a tier by exact name
    pub fn lookup(&self, name: &str) -> Option<&ResourceTier> {
        self.tiers
            .iter()
            .find(|(tier_name, _)| tier_name == name)
            .map(|(_, tier)| tier)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Tier names in catalog order
    pub fn names(&self) -> Vec<&str> {
        self.tiers.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl Default for TierCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
