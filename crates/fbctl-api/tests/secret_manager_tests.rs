//! Secret Manager client against a mock server

mod common;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::*;
use fbctl_api::secret_manager::{
    is_firebase_managed, to_secret_version_resource_name, SecretManagerClient, State,
    FIREBASE_MANAGED,
};
use serde_json::json;
use std::collections::BTreeMap;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client(server: &MockServer) -> SecretManagerClient {
    SecretManagerClient::new(&server.uri(), &test_options()).unwrap()
}

#[tokio::test]
async fn test_get_secret_parses_labels() {
    let server = MockServer::start().await;
    mock_json(
        &server,
        "GET",
        "/v1/projects/my-project/secrets/API_KEY",
        200,
        json!({
            "name": "projects/123456789/secrets/API_KEY",
            "labels": { "firebase-managed": "true" }
        }),
    )
    .await;

    let secret = client(&server)
        .await
        .get_secret(PROJECT_ID, "API_KEY")
        .await
        .unwrap();
    assert_eq!(secret.name, "API_KEY");
    assert_eq!(secret.project_id, PROJECT_NUMBER);
    assert!(is_firebase_managed(&secret));
}

#[tokio::test]
async fn test_get_missing_secret_is_not_found() {
    let server = MockServer::start().await;
    mock_json(
        &server,
        "GET",
        "/v1/projects/my-project/secrets/NOPE",
        404,
        error_body(404, "Secret not found"),
    )
    .await;

    let err = client(&server)
        .await
        .get_secret(PROJECT_ID, "NOPE")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_create_secret_with_labels() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/my-project/secrets"))
        .and(query_param("secretId", "API_KEY"))
        .and(body_partial_json(json!({
            "replication": { "automatic": {} },
            "labels": { "firebase-managed": "true" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/my-project/secrets/API_KEY",
            "labels": { "firebase-managed": "true" }
        })))
        .mount(&server)
        .await;

    let labels = BTreeMap::from([(FIREBASE_MANAGED.to_string(), "true".to_string())]);
    let secret = client(&server)
        .await
        .create_secret(PROJECT_ID, "API_KEY", labels)
        .await
        .unwrap();
    assert!(is_firebase_managed(&secret));
}

#[tokio::test]
async fn test_add_version_encodes_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/my-project/secrets/API_KEY:addVersion"))
        .and(body_partial_json(json!({
            "payload": { "data": BASE64.encode("s3cr3t") }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/123456789/secrets/API_KEY/versions/4",
            "state": "ENABLED"
        })))
        .mount(&server)
        .await;

    let version = client(&server)
        .await
        .add_version(PROJECT_ID, "API_KEY", "s3cr3t")
        .await
        .unwrap();
    assert_eq!(version.version_id, "4");
    assert_eq!(
        to_secret_version_resource_name(&version),
        "projects/my-project/secrets/API_KEY/versions/4"
    );
}

#[tokio::test]
async fn test_list_versions_and_access() {
    let server = MockServer::start().await;
    mock_json(
        &server,
        "GET",
        "/v1/projects/my-project/secrets/API_KEY/versions",
        200,
        json!({
            "versions": [
                { "name": "projects/123/secrets/API_KEY/versions/2", "state": "ENABLED" },
                { "name": "projects/123/secrets/API_KEY/versions/1", "state": "DESTROYED" }
            ]
        }),
    )
    .await;
    mock_json(
        &server,
        "GET",
        "/v1/projects/my-project/secrets/API_KEY/versions/latest:access",
        200,
        json!({
            "name": "projects/123/secrets/API_KEY/versions/2",
            "payload": { "data": BASE64.encode("hello") }
        }),
    )
    .await;

    let client = client(&server).await;
    let versions = client
        .list_secret_versions(PROJECT_ID, "API_KEY")
        .await
        .unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[1].state, Some(State::Destroyed));

    let value = client
        .access_secret_version(PROJECT_ID, "API_KEY", "latest")
        .await
        .unwrap();
    assert_eq!(value, "hello");
}

#[tokio::test]
async fn test_patch_labels_uses_update_mask() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/v1/projects/my-project/secrets/API_KEY"))
        .and(query_param("updateMask", "labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/my-project/secrets/API_KEY",
            "labels": { "firebase-managed": "true", "team": "core" }
        })))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let mut secret =
        fbctl_api::secret_manager::parse_secret_resource_name("projects/my-project/secrets/API_KEY")
            .unwrap();
    secret
        .labels
        .insert(FIREBASE_MANAGED.to_string(), "true".to_string());
    let patched = client.patch_secret_labels(&secret).await.unwrap();
    assert_eq!(patched.labels.len(), 2);
}
