//! Cloud Storage client against a mock server

mod common;

use common::*;
use fbctl_api::storage::StorageClient;
use serde_json::json;
use std::collections::BTreeMap;
use tempfile::TempDir;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn storage(server: &MockServer) -> StorageClient {
    StorageClient::new(&server.uri(), &server.uri(), &test_options()).unwrap()
}

#[tokio::test]
async fn test_default_bucket() {
    let server = MockServer::start().await;
    mock_json(
        &server,
        "GET",
        "/v1/apps/my-project",
        200,
        json!({ "defaultBucket": "my-project.appspot.com" }),
    )
    .await;

    let bucket = storage(&server).get_default_bucket(PROJECT_ID).await.unwrap();
    assert_eq!(bucket, "my-project.appspot.com");
}

#[tokio::test]
async fn test_default_bucket_still_being_set_up() {
    let server = MockServer::start().await;
    mock_json(
        &server,
        "GET",
        "/v1/apps/my-project",
        200,
        json!({ "defaultBucket": "undefined" }),
    )
    .await;

    let err = storage(&server)
        .get_default_bucket(PROJECT_ID)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Your project is being set up. Please wait a minute before deploying again."
    );
}

#[tokio::test]
async fn test_upload_object_requires_zip() {
    let server = MockServer::start().await;
    let err = storage(&server)
        .upload_object(std::path::Path::new("/tmp/source.tar"), "bucket")
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Expected a file name ending in .zip, got /tmp/source.tar"
    );
}

#[tokio::test]
async fn test_upload_object_puts_archive() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/my-bucket/source.zip"))
        .and(header("content-type", "application/zip"))
        .and(header_exists("x-goog-content-length-range"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-goog-generation", "1700"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("source.zip");
    std::fs::write(&archive, b"PK\x03\x04").unwrap();

    let uploaded = storage(&server)
        .upload_object(&archive, "my-bucket")
        .await
        .unwrap();
    assert_eq!(uploaded.bucket, "my-bucket");
    assert_eq!(uploaded.object, "source.zip");
    assert_eq!(uploaded.generation.as_deref(), Some("1700"));
}

#[tokio::test]
async fn test_upload_to_signed_url_keeps_query() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/upload/path"))
        .and(query_param("X-Goog-Signature", "abc"))
        .and(header("x-extra", "1"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-goog-generation", "42"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("fn.zip");
    std::fs::write(&archive, b"zip").unwrap();

    let url = format!("{}/upload/path?X-Goog-Signature=abc", server.uri());
    let headers = BTreeMap::from([("x-extra".to_string(), "1".to_string())]);
    let generation = storage(&server)
        .upload(&archive, &url, &headers)
        .await
        .unwrap();
    assert_eq!(generation.as_deref(), Some("42"));
}

#[tokio::test]
async fn test_list_buckets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/storage/v1/b"))
        .and(query_param("project", PROJECT_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "name": "a" }, { "name": "b" }]
        })))
        .mount(&server)
        .await;

    let names = storage(&server).list_buckets(PROJECT_ID).await.unwrap();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn test_failures_are_described() {
    let server = MockServer::start().await;
    let client = storage(&server);

    let err = client.get_bucket("nope").await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to obtain the storage bucket");
    assert!(err.is_not_found());

    let err = client.list_buckets(PROJECT_ID).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to read the storage buckets");

    let err = client.get_service_account(PROJECT_ID).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to obtain the Cloud Storage service agent"
    );
}
