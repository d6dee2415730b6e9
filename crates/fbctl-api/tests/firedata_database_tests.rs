//! Database instance listing via FireData and the management API

mod common;

use common::*;
use fbctl_api::database::{DatabaseClient, DatabaseLocation};
use fbctl_api::firedata::FiredataClient;
use fbctl_api::ApiError;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_firedata_lists_instances() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/projects/{}/databases", PROJECT_NUMBER)))
        .and(header("authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "instance": [
                {"instance": "my-project", "projectNumber": PROJECT_NUMBER, "type": "DEFAULT_REALTIME_DATABASE"},
                {"instance": "my-project-other"}
            ]
        })))
        .mount(&server)
        .await;

    let client = FiredataClient::new(&server.uri(), &test_options()).unwrap();
    let instances = client.list_database_instances(PROJECT_NUMBER).await.unwrap();
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[1].instance, "my-project-other");
}

#[tokio::test]
async fn test_firedata_service_error_uses_body_message() {
    let server = MockServer::start().await;
    mock_json(
        &server,
        "GET",
        &format!("/v1/projects/{}/databases", PROJECT_NUMBER),
        403,
        error_body(403, "The caller does not have permission"),
    )
    .await;

    let client = FiredataClient::new(&server.uri(), &test_options()).unwrap();
    let err = client
        .list_database_instances(PROJECT_NUMBER)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "The caller does not have permission");
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_firedata_unexpected_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/projects/{}/databases", PROJECT_NUMBER)))
        .respond_with(ResponseTemplate::new(500).set_body_string("gateway exploded"))
        .mount(&server)
        .await;

    let client = FiredataClient::new(&server.uri(), &test_options()).unwrap();
    let err = client
        .list_database_instances(PROJECT_NUMBER)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Service { exit_code: 2, .. }));
    assert_eq!(err.to_string(), "Unexpected error encountered with FireData.");
}

#[tokio::test]
async fn test_management_listing_follows_page_tokens() {
    let server = MockServer::start().await;
    let route = format!("/v1beta/projects/{}/locations/-/instances", PROJECT_ID);

    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .and(query_param("pageSize", "100"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "instances": [{
                "name": "projects/123/locations/us-central1/instances/db-one",
                "project": "projects/123",
                "databaseUrl": "https://db-one.firebaseio.com",
                "type": "DEFAULT_DATABASE",
                "state": "ACTIVE"
            }],
            "nextPageToken": "page-2"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "instances": [{
                "name": "projects/123/locations/europe-west1/instances/db-two",
                "databaseUrl": "https://db-two.europe-west1.firebasedatabase.app",
                "type": "USER_DATABASE",
                "state": "DISABLED"
            }]
        })))
        .mount(&server)
        .await;

    let client = DatabaseClient::new(&server.uri(), &test_options()).unwrap();
    let instances = client
        .list_database_instances(PROJECT_ID, DatabaseLocation::Any)
        .await
        .unwrap();

    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].name, "db-one");
    assert_eq!(instances[0].location, "us-central1");
    assert_eq!(instances[1].name, "db-two");
    assert_eq!(instances[1].location, "europe-west1");
    assert_eq!(instances[1].state, "DISABLED");
}

#[tokio::test]
async fn test_management_listing_empty() {
    let server = MockServer::start().await;
    mock_json(
        &server,
        "GET",
        &format!("/v1beta/projects/{}/locations/us-central1/instances", PROJECT_ID),
        200,
        json!({}),
    )
    .await;

    let client = DatabaseClient::new(&server.uri(), &test_options()).unwrap();
    let instances = client
        .list_database_instances(PROJECT_ID, DatabaseLocation::UsCentral1)
        .await
        .unwrap();
    assert!(instances.is_empty());
}
