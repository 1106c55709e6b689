//! Client tests against a real minislotd router on a loopback port.
//!
//! The daemon runs with a FakeControlPlane, so no cluster is needed.

use minislot_common::{DeploymentRequest, TierCatalog};
use minislotctl::client::DeployClient;
use minislotd::control_plane::{CreateError, FakeControlPlane};
use minislotd::deploy::Deployer;
use minislotd::server::{app, AppState};
use minislotd::template::ManifestTemplate;
use std::sync::Arc;
use std::time::Duration;

const KATANA_TEMPLATE: &str = include_str!("../../../katana-template.yaml");

/// Serve the daemon router in the background; returns its base URL
async fn spawn_server(fake: &FakeControlPlane) -> String {
    let deployer = Deployer::new(
        Arc::new(TierCatalog::standard()),
        Arc::new(ManifestTemplate::parse("katana-template.yaml", KATANA_TEMPLATE).unwrap()),
        Arc::new(fake.clone()),
        "default",
        Duration::from_secs(5),
    );
    let router = app(AppState::new(deployer));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_deploy_round_trip() {
    let fake = FakeControlPlane::new();
    let url = spawn_server(&fake).await;
    let client = DeployClient::new(&url, Duration::from_secs(5)).unwrap();

    let mut request = DeploymentRequest::new("cli-001");
    request.namespace = "slots".to_string();
    let response = client.deploy(&request).await.unwrap();

    assert_eq!(response.message, "Deployment created successfully");
    assert_eq!(response.namespace, "slots");
    assert_eq!(response.resources.len(), 3);
    assert_eq!(fake.call_count(), 3);
}

#[tokio::test]
async fn test_server_error_text_is_reported() {
    let fake = FakeControlPlane::failing_at(
        1,
        CreateError::AlreadyExists {
            kind: "PersistentVolumeClaim".to_string(),
            name: "katana-data-cli-002".to_string(),
        },
    );
    let url = spawn_server(&fake).await;
    let client = DeployClient::new(&url, Duration::from_secs(5)).unwrap();

    let err = client
        .deploy(&DeploymentRequest::new("cli-002"))
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("500"));
    assert!(message.contains("already exists"));
}

#[tokio::test]
async fn test_unreachable_server_fails() {
    let client = DeployClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
    let result = client.deploy(&DeploymentRequest::new("cli-003")).await;
    assert!(result.is_err());
}
