//! Pipeline tests against the shipped katana template.
//!
//! The control plane is a FakeControlPlane; no cluster is needed.

use minislot_common::{DeploymentRequest, TierCatalog};
use minislotd::control_plane::{CreateError, FakeControlPlane};
use minislotd::deploy::{DeployError, Deployer};
use minislotd::manifest::{decode, Resource};
use minislotd::template::ManifestTemplate;
use std::sync::Arc;
use std::time::Duration;

const KATANA_TEMPLATE: &str = include_str!("../../../katana-template.yaml");

fn deployer(fake: &FakeControlPlane) -> Deployer {
    Deployer::new(
        Arc::new(TierCatalog::standard()),
        Arc::new(ManifestTemplate::parse("katana-template.yaml", KATANA_TEMPLATE).unwrap()),
        Arc::new(fake.clone()),
        "default",
        Duration::from_secs(5),
    )
}

fn sample_request() -> DeploymentRequest {
    DeploymentRequest {
        id: "test-001".to_string(),
        namespace: "my-namespace".to_string(),
        version: "latest".to_string(),
        seed: 42,
        chain_id: 1,
        block_time: 5,
        tier: "free".to_string(),
        storage_class: "standard".to_string(),
    }
}

// ============================================================================
// Render + Decode
// ============================================================================

#[test]
fn test_render_is_byte_identical() {
    let d = deployer(&FakeControlPlane::new());
    let first = d.render(&sample_request()).unwrap();
    let second = d.render(&sample_request()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_decode_follows_template_order() {
    let d = deployer(&FakeControlPlane::new());

    for tier in ["free", "professional", "enterprise"] {
        let mut req = sample_request();
        req.tier = tier.to_string();
        let resources = decode(&d.render(&req).unwrap()).unwrap();

        let kinds: Vec<&str> = resources.iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, vec!["PersistentVolumeClaim", "Deployment", "Service"]);
    }
}

#[test]
fn test_sample_request_manifest_contents() {
    let d = deployer(&FakeControlPlane::new());
    let resources = decode(&d.render(&sample_request()).unwrap()).unwrap();
    assert_eq!(resources.len(), 3);

    match &resources[0] {
        Resource::PersistentVolumeClaim(pvc) => {
            assert_eq!(pvc.metadata.name.as_deref(), Some("katana-data-test-001"));
            let spec = pvc.spec.as_ref().unwrap();
            assert_eq!(spec.storage_class_name.as_deref(), Some("standard"));
            assert_eq!(spec.access_modes.as_ref().unwrap(), &vec!["ReadWriteOnce".to_string()]);
            let requests = spec.resources.as_ref().unwrap().requests.as_ref().unwrap();
            assert_eq!(requests["storage"].0, "1Gi");
        }
        other => panic!("expected PVC first, got {}", other.kind()),
    }

    match &resources[1] {
        Resource::Deployment(deployment) => {
            assert_eq!(deployment.metadata.name.as_deref(), Some("katana-test-001"));
            assert_eq!(deployment.metadata.namespace.as_deref(), Some("my-namespace"));

            let spec = deployment.spec.as_ref().unwrap();
            assert_eq!(spec.replicas, Some(1));
            let pod = spec.template.spec.as_ref().unwrap();
            let container = &pod.containers[0];
            assert_eq!(container.name, "katana");
            assert_eq!(container.image.as_deref(), Some("ghcr.io/dojoengine/dojo:latest"));

            let args = container.args.as_ref().unwrap();
            assert_eq!(
                args[0],
                "katana --seed=42 --chain-id=1 --block-time=5 2>&1 | tee -a /data/katana.log"
            );

            let volume = &pod.volumes.as_ref().unwrap()[0];
            assert_eq!(
                volume.persistent_volume_claim.as_ref().unwrap().claim_name,
                "katana-data-test-001"
            );
        }
        other => panic!("expected Deployment second, got {}", other.kind()),
    }

    match &resources[2] {
        Resource::Service(service) => {
            assert_eq!(service.metadata.name.as_deref(), Some("katana-test-001"));
            let spec = service.spec.as_ref().unwrap();
            assert_eq!(spec.type_.as_deref(), Some("ClusterIP"));
            assert_eq!(spec.ports.as_ref().unwrap()[0].port, 80);
        }
        other => panic!("expected Service third, got {}", other.kind()),
    }
}

// ============================================================================
// Submission
// ============================================================================

#[tokio::test]
async fn test_professional_tier_quantities_reach_control_plane() {
    let fake = FakeControlPlane::new();
    let d = deployer(&fake);
    let mut req = sample_request();
    req.tier = "professional".to_string();

    d.deploy(&req).await.unwrap();

    let calls = fake.calls();
    assert_eq!(calls.len(), 3);

    match &calls[0].resource {
        Resource::PersistentVolumeClaim(pvc) => {
            let spec = pvc.spec.as_ref().unwrap();
            let requests = spec.resources.as_ref().unwrap().requests.as_ref().unwrap();
            assert_eq!(requests["storage"].0, "10Gi");
        }
        other => panic!("expected PVC, got {}", other.kind()),
    }

    match &calls[1].resource {
        Resource::Deployment(deployment) => {
            let pod = deployment.spec.as_ref().unwrap().template.spec.as_ref().unwrap();
            let resources = pod.containers[0].resources.as_ref().unwrap();
            assert_eq!(resources.requests.as_ref().unwrap()["cpu"].0, "1");
            assert_eq!(resources.limits.as_ref().unwrap()["cpu"].0, "2");
            assert_eq!(resources.requests.as_ref().unwrap()["memory"].0, "2Gi");
            assert_eq!(resources.limits.as_ref().unwrap()["memory"].0, "4Gi");
        }
        other => panic!("expected Deployment, got {}", other.kind()),
    }
}

#[tokio::test]
async fn test_failure_on_second_resource_stops_submission() {
    let fake = FakeControlPlane::failing_at(
        2,
        CreateError::InvalidSpec {
            kind: "Deployment".to_string(),
            name: "katana-test-001".to_string(),
            message: "spec.selector: Required value".to_string(),
        },
    );
    let d = deployer(&fake);

    let err = d.deploy(&sample_request()).await.unwrap_err();

    assert_eq!(fake.call_count(), 2);
    assert!(matches!(err, DeployError::Submission { position: 2, .. }));
    assert!(err.to_string().contains("katana-test-001"));
}

#[tokio::test]
async fn test_duplicate_id_surfaces_as_conflict() {
    let fake = FakeControlPlane::failing_at(
        1,
        CreateError::AlreadyExists {
            kind: "PersistentVolumeClaim".to_string(),
            name: "katana-data-test-001".to_string(),
        },
    );
    let d = deployer(&fake);

    let err = d.deploy(&sample_request()).await.unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert_eq!(fake.call_count(), 1);
}

#[tokio::test]
async fn test_resources_created_in_request_namespace() {
    let fake = FakeControlPlane::new();
    let d = deployer(&fake);

    let outcome = d.deploy(&sample_request()).await.unwrap();

    assert_eq!(outcome.namespace, "my-namespace");
    assert_eq!(outcome.resources.len(), 3);
    assert!(fake.calls().iter().all(|c| c.namespace == "my-namespace"));
}
