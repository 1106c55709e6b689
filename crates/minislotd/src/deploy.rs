//! Deployment pipeline - validate, render, decode, submit.
//!
//! One request walks the stages once, in order:
//! Received → Validated → Rendered → Decoded → Submitting → Succeeded | Failed.
//! The first failing stage ends the request. Nothing is retried.

use crate::control_plane::{ControlPlane, CreateError};
use crate::manifest::{self, DecodeError};
use crate::submitter;
use crate::template::{ManifestTemplate, RenderContext, TemplateError};
use minislot_common::{CreatedResourceInfo, DeploymentRequest, ResourceTier, TierCatalog};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("deployment id must not be empty")]
    EmptyId,

    #[error("invalid deployment id '{0}' (lowercase letters, digits and '-', at most 63 characters, starting and ending alphanumeric)")]
    InvalidId(String),

    #[error("invalid tier '{tier}' (expected one of: {known})")]
    UnknownTier { tier: String, known: String },
}

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("error rendering manifest: {0}")]
    Template(#[from] TemplateError),

    #[error("error decoding manifest: {0}")]
    Decode(#[from] DecodeError),

    #[error("unsupported resource kind '{kind}' at position {position}")]
    UnsupportedKind { position: usize, kind: String },

    #[error("error creating {kind} '{name}' (resource {position}): {source}")]
    Submission {
        position: usize,
        kind: String,
        name: String,
        #[source]
        source: CreateError,
    },
}

impl DeployError {
    /// Pipeline stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            DeployError::Validation(_) => "validation",
            DeployError::Template(_) => "render",
            DeployError::Decode(_) => "decode",
            DeployError::UnsupportedKind { .. } | DeployError::Submission { .. } => "submit",
        }
    }

    /// Caller's fault (400) rather than the server's (500)
    pub fn is_client_error(&self) -> bool {
        matches!(self, DeployError::Validation(_))
    }
}

/// DNS-1123 label; the id is spliced into resource names and raw YAML
fn id_regex() -> &'static Regex {
    static ID_RE: OnceLock<Regex> = OnceLock::new();
    ID_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([-a-z0-9]{0,61}[a-z0-9])?$").expect("id regex is valid")
    })
}

/// Result of a successful deployment
#[derive(Debug, Clone)]
pub struct DeploymentOutcome {
    pub namespace: String,
    pub resources: Vec<CreatedResourceInfo>,
}

/// Composes the tier catalog, template and control plane.
///
/// Catalog and template are immutable after startup and shared by every
/// request without locking.
pub struct Deployer {
    catalog: Arc<TierCatalog>,
    template: Arc<ManifestTemplate>,
    control_plane: Arc<dyn ControlPlane>,
    default_namespace: String,
    create_timeout: Duration,
}

impl Deployer {
    pub fn new(
        catalog: Arc<TierCatalog>,
        template: Arc<ManifestTemplate>,
        control_plane: Arc<dyn ControlPlane>,
        default_namespace: &str,
        create_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            template,
            control_plane,
            default_namespace: default_namespace.to_string(),
            create_timeout,
        }
    }

    /// Check the request and resolve its tier. Nothing is rendered before this passes.
    pub fn validate<'a>(&'a self, request: &DeploymentRequest) -> Result<&'a ResourceTier, ValidationError> {
        if request.id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if !id_regex().is_match(&request.id) {
            return Err(ValidationError::InvalidId(request.id.clone()));
        }

        self.catalog
            .lookup(&request.tier)
            .ok_or_else(|| ValidationError::UnknownTier {
                tier: request.tier.clone(),
                known: self.catalog.names().join(", "),
            })
    }

    /// Namespace the request deploys into, trimmed so rendering and submission agree
    pub fn effective_namespace<'a>(&'a self, request: &'a DeploymentRequest) -> &'a str {
        match request.namespace.trim() {
            "" => self.default_namespace.trim(),
            namespace => namespace,
        }
    }

    /// Render the manifest for a request without submitting it
    pub fn render(&self, request: &DeploymentRequest) -> Result<String, DeployError> {
        let tier = self.validate(request)?;
        let namespace = self.effective_namespace(request);
        let context = RenderContext::new(request, namespace, tier);
        Ok(self.template.render(&context)?)
    }

    /// Run the whole pipeline for one request
    pub async fn deploy(&self, request: &DeploymentRequest) -> Result<DeploymentOutcome, DeployError> {
        let namespace = self.effective_namespace(request).to_string();

        let rendered = self.render(request).map_err(|e| {
            warn!("  Deployment {} rejected at {}: {}", request.id, e.stage(), e);
            e
        })?;
        info!(
            "  Rendered manifest for {} (tier {}, namespace {})",
            request.id, request.tier, namespace
        );

        let resources = manifest::decode(&rendered)?;
        info!("  Decoded {} resources for {}", resources.len(), request.id);

        let result = submitter::submit(
            self.control_plane.as_ref(),
            &namespace,
            &resources,
            self.create_timeout,
        )
        .await;

        if let Some((position, kind, name, error)) = result.failure() {
            return Err(match error {
                CreateError::UnsupportedKind { kind } => DeployError::UnsupportedKind {
                    position: position + 1,
                    kind: kind.clone(),
                },
                other => DeployError::Submission {
                    position: position + 1,
                    kind: kind.to_string(),
                    name: name.to_string(),
                    source: other.clone(),
                },
            });
        }

        info!("  Deployment {} created in {}", request.id, namespace);
        Ok(DeploymentOutcome {
            namespace,
            resources: result.created(),
        })
    }
}
