//! Manifest decoding - rendered multi-document YAML into typed resources.
//!
//! serde_yaml splits the stream into documents, decoded in source order.
//! Empty documents are skipped. Any malformed document aborts the whole
//! decode; partial results are never returned.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Service};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;

pub const KIND_PERSISTENT_VOLUME_CLAIM: &str = "PersistentVolumeClaim";
pub const KIND_DEPLOYMENT: &str = "Deployment";
pub const KIND_SERVICE: &str = "Service";

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("document {document} is not valid YAML: {message}")]
    Syntax { document: usize, message: String },

    #[error("document {document} has no 'kind' field")]
    MissingKind { document: usize },

    #[error("document {document} is not a valid {kind}: {message}")]
    InvalidBody {
        document: usize,
        kind: String,
        message: String,
    },
}

/// A decoded manifest document
#[derive(Debug, Clone)]
pub enum Resource {
    PersistentVolumeClaim(PersistentVolumeClaim),
    Deployment(Deployment),
    Service(Service),
    /// A kind with no create operation; submission stops when it reaches one
    Unsupported {
        api_version: String,
        kind: String,
        name: String,
    },
}

impl Resource {
    pub fn kind(&self) -> &str {
        match self {
            Resource::PersistentVolumeClaim(_) => KIND_PERSISTENT_VOLUME_CLAIM,
            Resource::Deployment(_) => KIND_DEPLOYMENT,
            Resource::Service(_) => KIND_SERVICE,
            Resource::Unsupported { kind, .. } => kind,
        }
    }

    pub fn name(&self) -> &str {
        let name = match self {
            Resource::PersistentVolumeClaim(pvc) => pvc.metadata.name.as_deref(),
            Resource::Deployment(deployment) => deployment.metadata.name.as_deref(),
            Resource::Service(service) => service.metadata.name.as_deref(),
            Resource::Unsupported { name, .. } => Some(name.as_str()),
        };
        name.unwrap_or("")
    }
}

fn typed<T: DeserializeOwned>(value: Value, document: usize, kind: &str) -> Result<T, DecodeError> {
    serde_yaml::from_value(value).map_err(|e| DecodeError::InvalidBody {
        document,
        kind: kind.to_string(),
        message: e.to_string(),
    })
}

fn classify(value: Value, document: usize) -> Result<Resource, DecodeError> {
    let mapping = value
        .as_mapping()
        .ok_or(DecodeError::MissingKind { document })?;
    let kind = mapping
        .get("kind")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingKind { document })?
        .to_string();
    let api_version = mapping
        .get("apiVersion")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let resource = match (api_version.as_str(), kind.as_str()) {
        ("v1", KIND_PERSISTENT_VOLUME_CLAIM) => {
            Resource::PersistentVolumeClaim(typed(value, document, &kind)?)
        }
        ("apps/v1", KIND_DEPLOYMENT) => Resource::Deployment(typed(value, document, &kind)?),
        ("v1", KIND_SERVICE) => Resource::Service(typed(value, document, &kind)?),
        _ => {
            let name = mapping
                .get("metadata")
                .and_then(|m| m.get("name"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Resource::Unsupported {
                api_version,
                kind,
                name,
            }
        }
    };

    Ok(resource)
}

/// Decode rendered manifest text into resources, preserving document order
pub fn decode(text: &str) -> Result<Vec<Resource>, DecodeError> {
    let mut resources = Vec::new();

    for (i, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let index = i + 1;
        let value = Value::deserialize(document).map_err(|e| DecodeError::Syntax {
            document: index,
            message: e.to_string(),
        })?;
        if value.is_null() {
            continue;
        }

        resources.push(classify(value, index)?);
    }

    Ok(resources)
}
