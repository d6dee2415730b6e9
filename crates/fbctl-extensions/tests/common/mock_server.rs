//! Mock server helpers for publisher and registry API tests

use fbctl_api::ClientOptions;
use serde_json::{json, Value};
use std::time::Duration;

use super::constants::TEST_TOKEN;

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

/// A published extension as the API returns it
pub fn extension_json(extension_id: &str, version: &str, create_time: &str) -> Value {
    json!({
        "name": format!("publishers/acme/extensions/{}", extension_id),
        "ref": format!("acme/{}", extension_id),
        "state": "PUBLISHED",
        "createTime": create_time,
        "latestVersion": version,
    })
}
