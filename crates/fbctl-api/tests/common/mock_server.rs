//! Mock server helpers for API tests

use fbctl_api::ClientOptions;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::constants::*;

/// Client options pointing nowhere in particular, carrying a test token
pub fn test_options() -> ClientOptions {
    ClientOptions {
        access_token: Some(TEST_TOKEN.to_string()),
        user_agent: "fbctl-tests".to_string(),
        timeout: Duration::from_secs(5),
    }
}

/// Google-style error body
pub fn error_body(code: u16, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}

/// Mount a JSON response for `verb path`
pub async fn mock_json(server: &MockServer, verb: &str, route: &str, status: u16, body: Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}
