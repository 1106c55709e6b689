//! Control plane abstraction - the three create operations the pipeline needs.
//!
//! Production code uses `KubeControlPlane`, backed by a kube `Client`.
//! Tests use `FakeControlPlane`, which records every call and can be
//! scripted to fail at a given call.

use crate::manifest::{Resource, KIND_DEPLOYMENT, KIND_PERSISTENT_VOLUME_CLAIM, KIND_SERVICE};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Service};
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, PostParams};
use kube::{Client, ResourceExt};
use minislot_common::CreatedResourceInfo;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Why a create call failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreateError {
    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: String, name: String },

    #[error("invalid {kind} '{name}': {message}")]
    InvalidSpec {
        kind: String,
        name: String,
        message: String,
    },

    #[error("control plane unavailable: {0}")]
    Transient(String),

    #[error("no create operation for kind '{kind}'")]
    UnsupportedKind { kind: String },

    #[error("create call exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

// ============================================================================
// Control Plane Trait
// ============================================================================

/// Create operations against the cluster, each scoped to a namespace
#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn create_persistent_volume_claim(
        &self,
        namespace: &str,
        claim: &PersistentVolumeClaim,
    ) -> Result<CreatedResourceInfo, CreateError>;

    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<CreatedResourceInfo, CreateError>;

    async fn create_service(
        &self,
        namespace: &str,
        service: &Service,
    ) -> Result<CreatedResourceInfo, CreateError>;
}

// ============================================================================
// Kubernetes Control Plane (Production)
// ============================================================================

/// Control plane backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeControlPlane {
    client: Client,
}

impl KubeControlPlane {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using in-cluster config or the local kubeconfig
    pub async fn connect() -> Result<Self, kube::Error> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }

    async fn create<K>(
        &self,
        kind: &str,
        namespace: &str,
        resource: &K,
    ) -> Result<CreatedResourceInfo, CreateError>
    where
        K: kube::Resource<Scope = NamespaceResourceScope>
            + Clone
            + Debug
            + Serialize
            + DeserializeOwned,
        K::DynamicType: Default,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let name = resource.name_any();

        let created = api
            .create(&PostParams::default(), resource)
            .await
            .map_err(|e| map_kube_error(kind, &name, e))?;

        Ok(CreatedResourceInfo {
            kind: kind.to_string(),
            name: created.name_any(),
            uid: created.uid(),
        })
    }
}

fn map_kube_error(kind: &str, name: &str, err: kube::Error) -> CreateError {
    match err {
        kube::Error::Api(resp) if resp.code == 409 => CreateError::AlreadyExists {
            kind: kind.to_string(),
            name: name.to_string(),
        },
        kube::Error::Api(resp) if resp.code == 400 || resp.code == 422 => {
            CreateError::InvalidSpec {
                kind: kind.to_string(),
                name: name.to_string(),
                message: resp.message,
            }
        }
        other => CreateError::Transient(other.to_string()),
    }
}

#[async_trait]
impl ControlPlane for KubeControlPlane {
    async fn create_persistent_volume_claim(
        &self,
        namespace: &str,
        claim: &PersistentVolumeClaim,
    ) -> Result<CreatedResourceInfo, CreateError> {
        self.create(KIND_PERSISTENT_VOLUME_CLAIM, namespace, claim).await
    }

    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<CreatedResourceInfo, CreateError> {
        self.create(KIND_DEPLOYMENT, namespace, deployment).await
    }

    async fn create_service(
        &self,
        namespace: &str,
        service: &Service,
    ) -> Result<CreatedResourceInfo, CreateError> {
        self.create(KIND_SERVICE, namespace, service).await
    }
}

// ============================================================================
// Fake Control Plane (Testing)
// ============================================================================

/// One create call seen by the fake
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub namespace: String,
    pub resource: Resource,
}

/// Fake control plane for deterministic testing.
///
/// Succeeds by default. `failing_at(n, err)` makes the n-th call (1-based)
/// fail; `with_delay` makes every call sleep first, for deadline tests.
#[derive(Clone, Default)]
pub struct FakeControlPlane {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    fail_at: Option<(usize, CreateError)>,
    delay: Option<Duration>,
}

impl FakeControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(call: usize, error: CreateError) -> Self {
        Self {
            fail_at: Some((call, error)),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn record(&self, namespace: &str, resource: Resource) -> Result<CreatedResourceInfo, CreateError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let kind = resource.kind().to_string();
        let name = resource.name().to_string();
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                namespace: namespace.to_string(),
                resource,
            });
            calls.len()
        };

        match &self.fail_at {
            Some((n, error)) if *n == call => Err(error.clone()),
            _ => Ok(CreatedResourceInfo {
                kind,
                name,
                uid: Some(format!("fake-uid-{}", call)),
            }),
        }
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn create_persistent_volume_claim(
        &self,
        namespace: &str,
        claim: &PersistentVolumeClaim,
    ) -> Result<CreatedResourceInfo, CreateError> {
        self.record(namespace, Resource::PersistentVolumeClaim(claim.clone()))
            .await
    }

    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<CreatedResourceInfo, CreateError> {
        self.record(namespace, Resource::Deployment(deployment.clone()))
            .await
    }

    async fn create_service(
        &self,
        namespace: &str,
        service: &Service,
    ) -> Result<CreatedResourceInfo, CreateError> {
        self.record(namespace, Resource::Service(service.clone())).await
    }
}
