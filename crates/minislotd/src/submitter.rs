//! Resource submission - create each decoded resource in order, stop at the first failure.
//!
//! Creation order is decode order: the template lists dependencies (the
//! volume claim) before their dependents. Nothing already created is rolled
//! back when a later create fails.

use crate::control_plane::{ControlPlane, CreateError};
use crate::manifest::Resource;
use minislot_common::CreatedResourceInfo;
use std::time::Duration;
use tracing::{error, info};

/// Outcome of one create call
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceOutcome {
    Created(CreatedResourceInfo),
    Failed {
        kind: String,
        name: String,
        error: CreateError,
    },
}

/// Per-resource outcomes in submission order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionResult {
    pub outcomes: Vec<ResourceOutcome>,
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o, ResourceOutcome::Created(_)))
    }

    pub fn created(&self) -> Vec<CreatedResourceInfo> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ResourceOutcome::Created(info) => Some(info.clone()),
                ResourceOutcome::Failed { .. } => None,
            })
            .collect()
    }

    /// The failing resource: (0-based position, kind, name, error)
    pub fn failure(&self) -> Option<(usize, &str, &str, &CreateError)> {
        self.outcomes.iter().enumerate().find_map(|(i, o)| match o {
            ResourceOutcome::Failed { kind, name, error } => {
                Some((i, kind.as_str(), name.as_str(), error))
            }
            ResourceOutcome::Created(_) => None,
        })
    }
}

async fn create_one(
    client: &dyn ControlPlane,
    namespace: &str,
    resource: &Resource,
) -> Result<CreatedResourceInfo, CreateError> {
    match resource {
        Resource::PersistentVolumeClaim(claim) => {
            client.create_persistent_volume_claim(namespace, claim).await
        }
        Resource::Deployment(deployment) => client.create_deployment(namespace, deployment).await,
        Resource::Service(service) => client.create_service(namespace, service).await,
        Resource::Unsupported { kind, .. } => Err(CreateError::UnsupportedKind { kind: kind.clone() }),
    }
}

/// Submit resources sequentially; each call is bounded by `deadline`
pub async fn submit(
    client: &dyn ControlPlane,
    namespace: &str,
    resources: &[Resource],
    deadline: Duration,
) -> SubmissionResult {
    let mut result = SubmissionResult::default();

    for resource in resources {
        let kind = resource.kind().to_string();
        let name = resource.name().to_string();

        let outcome = tokio::time::timeout(deadline, create_one(client, namespace, resource))
            .await
            .unwrap_or(Err(CreateError::DeadlineExceeded(deadline)));

        match outcome {
            Ok(created) => {
                info!("  Created {} {}/{}", kind, namespace, created.name);
                result.outcomes.push(ResourceOutcome::Created(created));
            }
            Err(e) => {
                error!("  Failed to create {} {}/{}: {}", kind, namespace, name, e);
                result
                    .outcomes
                    .push(ResourceOutcome::Failed { kind, name, error: e });
                break;
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_plane::FakeControlPlane;
    use crate::manifest::decode;

    const THREE: &str = "apiVersion: v1
kind: PersistentVolumeClaim
metadata:
  name: katana-data-a
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: katana-a
---
apiVersion: v1
kind: Service
metadata:
  name: katana-a
";

    const DEADLINE: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_submit_all_in_order() {
        let fake = FakeControlPlane::new();
        let resources = decode(THREE).unwrap();

        let result = submit(&fake, "ns", &resources, DEADLINE).await;

        assert!(result.is_success());
        assert_eq!(result.created().len(), 3);
        let kinds: Vec<String> = fake
            .calls()
            .iter()
            .map(|c| c.resource.kind().to_string())
            .collect();
        assert_eq!(kinds, vec!["PersistentVolumeClaim", "Deployment", "Service"]);
        assert!(fake.calls().iter().all(|c| c.namespace == "ns"));
    }

    #[tokio::test]
    async fn test_fail_fast_on_second_resource() {
        let fake = FakeControlPlane::failing_at(
            2,
            CreateError::AlreadyExists {
                kind: "Deployment".to_string(),
                name: "katana-a".to_string(),
            },
        );
        let resources = decode(THREE).unwrap();

        let result = submit(&fake, "ns", &resources, DEADLINE).await;

        assert!(!result.is_success());
        assert_eq!(fake.call_count(), 2);
        assert_eq!(result.outcomes.len(), 2);
        assert_eq!(result.created().len(), 1);

        let (index, kind, name, _) = result.failure().unwrap();
        assert_eq!(index, 1);
        assert_eq!(kind, "Deployment");
        assert_eq!(name, "katana-a");
    }

    #[tokio::test]
    async fn test_unsupported_kind_stops_submission() {
        let text = "apiVersion: v1
kind: PersistentVolumeClaim
metadata:
  name: data
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: cfg
---
apiVersion: v1
kind: Service
metadata:
  name: web
";
        let fake = FakeControlPlane::new();
        let resources = decode(text).unwrap();

        let result = submit(&fake, "ns", &resources, DEADLINE).await;

        assert_eq!(fake.call_count(), 1);
        let (index, kind, _, error) = result.failure().unwrap();
        assert_eq!(index, 1);
        assert_eq!(kind, "ConfigMap");
        assert!(matches!(error, CreateError::UnsupportedKind { .. }));
    }

    #[tokio::test]
    async fn test_empty_resource_list_succeeds() {
        let fake = FakeControlPlane::new();
        let result = submit(&fake, "ns", &[], DEADLINE).await;
        assert!(result.is_success());
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_create_hits_deadline() {
        let fake = FakeControlPlane::new().with_delay(Duration::from_secs(60));
        let resources = decode(THREE).unwrap();

        let result = submit(&fake, "ns", &resources, Duration::from_secs(1)).await;

        assert!(!result.is_success());
        assert_eq!(result.outcomes.len(), 1);
        let (_, _, _, error) = result.failure().unwrap();
        assert_eq!(*error, CreateError::DeadlineExceeded(Duration::from_secs(1)));
    }
}
