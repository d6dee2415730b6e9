//! Secret creation and version rollout against a mocked backend

mod common;

use common::*;
use fbctl_api::functions::FunctionsClient;
use fbctl_api::secret_manager::{is_firebase_managed, SecretManagerClient, SecretVersion};
use fbctl_deploy::secrets::{
    endpoints_using, ensure_secret, update_endpoint_secret, update_endpoints, EndpointUpdate,
};
use fbctl_deploy::SourceTokenScraper;
use serde_json::json;
use std::cell::RefCell;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn secret_path() -> String {
    format!("/v1/projects/{}/secrets/{}", PROJECT_ID, SECRET_NAME)
}

fn secret_json(labels: serde_json::Value) -> serde_json::Value {
    json!({
        "name": format!("projects/{}/secrets/{}", PROJECT_ID, SECRET_NAME),
        "labels": labels
    })
}

#[tokio::test]
async fn test_missing_secret_is_created_managed() {
    let server = MockServer::start().await;
    mock_json(&server, "GET", &secret_path(), 404, error_body(404, "not found")).await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/projects/{}/secrets", PROJECT_ID)))
        .and(query_param("secretId", SECRET_NAME))
        .and(body_partial_json(json!({ "labels": { "firebase-managed": "true" } })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(secret_json(json!({ "firebase-managed": "true" }))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = SecretManagerClient::new(&server.uri(), &test_options()).unwrap();
    let secret = ensure_secret(&client, PROJECT_ID, SECRET_NAME, false, |_| {
        panic!("no prompt for a new secret")
    })
    .await
    .unwrap();
    assert!(is_firebase_managed(&secret));
}

#[tokio::test]
async fn test_unmanaged_secret_can_be_adopted() {
    let server = MockServer::start().await;
    mock_json(&server, "GET", &secret_path(), 200, secret_json(json!({ "team": "core" }))).await;
    Mock::given(method("PATCH"))
        .and(path(secret_path()))
        .and(query_param("updateMask", "labels"))
        .and(body_partial_json(json!({
            "labels": { "team": "core", "firebase-managed": "true" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(secret_json(
            json!({ "team": "core", "firebase-managed": "true" }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = SecretManagerClient::new(&server.uri(), &test_options()).unwrap();
    let secret = ensure_secret(&client, PROJECT_ID, SECRET_NAME, false, |s| {
        assert_eq!(s.name, SECRET_NAME);
        Ok(true)
    })
    .await
    .unwrap();
    assert!(is_firebase_managed(&secret));
}

#[tokio::test]
async fn test_unmanaged_secret_left_alone_with_force() {
    let server = MockServer::start().await;
    mock_json(&server, "GET", &secret_path(), 200, secret_json(json!({}))).await;

    let client = SecretManagerClient::new(&server.uri(), &test_options()).unwrap();
    let secret = ensure_secret(&client, PROJECT_ID, SECRET_NAME, true, |_| {
        panic!("no prompt with force")
    })
    .await
    .unwrap();
    assert!(!is_firebase_managed(&secret));
}

#[tokio::test]
async fn test_other_lookup_errors_propagate() {
    let server = MockServer::start().await;
    mock_json(&server, "GET", &secret_path(), 403, error_body(403, "denied")).await;

    let client = SecretManagerClient::new(&server.uri(), &test_options()).unwrap();
    assert!(ensure_secret(&client, PROJECT_ID, SECRET_NAME, false, |_| Ok(true))
        .await
        .is_err());
}

fn new_version() -> SecretVersion {
    SecretVersion {
        secret: fbctl_api::secret_manager::Secret {
            project_id: PROJECT_ID.to_string(),
            name: SECRET_NAME.to_string(),
            labels: Default::default(),
        },
        version_id: "2".to_string(),
        state: None,
    }
}

fn function_path(id: &str) -> String {
    format!("/v1/projects/{}/locations/us-central1/functions/{}", PROJECT_ID, id)
}

#[tokio::test]
async fn test_rollout_shares_source_token_within_region() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(function_path("first")))
        .and(query_param("updateMask", "secretEnvironmentVariables"))
        .and(body_partial_json(json!({
            "secretEnvironmentVariables": [{ "secret": SECRET_NAME, "version": "2" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "operations/op-first" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(function_path("second")))
        .and(body_partial_json(json!({ "sourceToken": "tok-123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "operations/op-second" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(function_path("third")))
        .and(body_partial_json(json!({ "sourceToken": "tok-123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "operations/op-third" })))
        .expect(1)
        .mount(&server)
        .await;
    mock_json(
        &server,
        "GET",
        "/v1/operations/op-first",
        200,
        json!({
            "name": "operations/op-first",
            "done": true,
            "metadata": {
                "sourceToken": "tok-123",
                "target": format!("projects/{}/locations/us-central1/functions/first", PROJECT_ID)
            },
            "response": {}
        }),
    )
    .await;
    mock_json(
        &server,
        "GET",
        "/v1/operations/op-second",
        200,
        json!({ "name": "operations/op-second", "done": true, "response": {} }),
    )
    .await;
    mock_json(
        &server,
        "GET",
        "/v1/operations/op-third",
        200,
        json!({ "name": "operations/op-third", "done": true, "response": {} }),
    )
    .await;

    let all = vec![
        bound_endpoint("first", "us-central1"),
        bound_endpoint("second", "us-central1"),
        bound_endpoint("third", "us-central1"),
    ];
    let version = new_version();
    let stale = endpoints_using(&project_info(), &version.secret, &all);
    assert_eq!(stale.len(), 3);

    let events = RefCell::new(Vec::new());
    let client = FunctionsClient::new(&server.uri(), &test_options()).unwrap();
    let updated = update_endpoints(&client, &project_info(), &version, &stale, &fast_poll(), |e| {
        events.borrow_mut().push(e)
    })
    .await
    .unwrap();

    assert_eq!(updated.len(), 3);
    assert!(updated
        .iter()
        .all(|e| e.secret_environment_variables[0].version.as_deref() == Some("2")));
    let events = events.into_inner();
    assert!(events.contains(&EndpointUpdate::Updated("first(us-central1)".into())));
    assert!(events.contains(&EndpointUpdate::Updated("second(us-central1)".into())));
    assert!(events.contains(&EndpointUpdate::Updated("third(us-central1)".into())));
}

#[tokio::test]
async fn test_token_survives_updates_that_finish_without_one() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(function_path("first")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "operations/op-first" })))
        .expect(1)
        .mount(&server)
        .await;
    for id in ["second", "third"] {
        Mock::given(method("PATCH"))
            .and(path(function_path(id)))
            .and(body_partial_json(json!({ "sourceToken": "tok-123" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "name": format!("operations/op-{}", id) })),
            )
            .expect(1)
            .mount(&server)
            .await;
        mock_json(
            &server,
            "GET",
            &format!("/v1/operations/op-{}", id),
            200,
            json!({ "name": format!("operations/op-{}", id), "done": true }),
        )
        .await;
    }
    mock_json(
        &server,
        "GET",
        "/v1/operations/op-first",
        200,
        json!({
            "name": "operations/op-first",
            "done": true,
            "metadata": { "sourceToken": "tok-123" }
        }),
    )
    .await;

    let client = FunctionsClient::new(&server.uri(), &test_options()).unwrap();
    let scraper = SourceTokenScraper::default();
    let version = new_version();
    for id in ["first", "second", "third"] {
        let endpoint = bound_endpoint(id, "us-central1");
        update_endpoint_secret(
            &client,
            &project_info(),
            &version,
            &endpoint,
            &scraper,
            &fast_poll(),
        )
        .await
        .unwrap();
    }
    assert_eq!(scraper.get_token().await.unwrap().as_deref(), Some("tok-123"));
}

#[tokio::test]
async fn test_failed_fetch_releases_waiting_updates() {
    let server = MockServer::start().await;
    mock_json(&server, "PATCH", &function_path("first"), 500, error_body(500, "boom")).await;
    Mock::given(method("PATCH"))
        .and(path(function_path("second")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "operations/op-second" })))
        .expect(1)
        .mount(&server)
        .await;
    mock_json(
        &server,
        "GET",
        "/v1/operations/op-second",
        200,
        json!({ "name": "operations/op-second", "done": true }),
    )
    .await;

    let first = bound_endpoint("first", "us-central1");
    let second = bound_endpoint("second", "us-central1");
    let client = FunctionsClient::new(&server.uri(), &test_options()).unwrap();
    let result = update_endpoints(
        &client,
        &project_info(),
        &new_version(),
        &[&first, &second],
        &fast_poll(),
        |_| {},
    )
    .await;
    assert!(result.is_err());
}
