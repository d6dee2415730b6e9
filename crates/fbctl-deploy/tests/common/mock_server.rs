//! Mock server helpers for deploy tests

use fbctl_api::functions::{Endpoint, SecretEnvVar};
use fbctl_api::{ClientOptions, PollOptions};
use fbctl_deploy::ProjectInfo;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::constants::*;

pub fn test_options() -> ClientOptions {
    ClientOptions {
        access_token: Some(TEST_TOKEN.to_string()),
        user_agent: "fbctl-tests".to_string(),
        timeout: Duration::from_secs(5),
    }
}

pub fn fast_poll() -> PollOptions {
    PollOptions {
        initial_backoff: Duration::from_millis(5),
        max_backoff: Duration::from_millis(10),
        backoff_multiplier: 2.0,
        master_timeout: Duration::from_secs(5),
    }
}

pub fn project_info() -> ProjectInfo {
    ProjectInfo {
        project_id: PROJECT_ID.to_string(),
        project_number: PROJECT_NUMBER.to_string(),
    }
}

pub fn error_body(code: u16, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}

/// An endpoint binding `SECRET_NAME` at version 1
pub fn bound_endpoint(id: &str, region: &str) -> Endpoint {
    Endpoint {
        id: id.to_string(),
        region: region.to_string(),
        project: PROJECT_ID.to_string(),
        runtime: Some("nodejs18".to_string()),
        secret_environment_variables: vec![SecretEnvVar {
            key: SECRET_NAME.to_string(),
            project_id: PROJECT_NUMBER.to_string(),
            secret: SECRET_NAME.to_string(),
            version: Some("1".to_string()),
        }],
    }
}

pub async fn mock_json(server: &MockServer, verb: &str, route: &str, status: u16, body: Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}
