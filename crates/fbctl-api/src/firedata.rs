//! FireData: legacy Realtime Database instance listing by project number

use crate::client::{ApiClient, ClientOptions};
use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const API_VERSION: &str = "v1";

/// Exit code for FireData failures
pub const FIREDATA_EXIT_CODE: i32 = 2;

/// One database instance as reported by FireData
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiredataInstance {
    /// Instance name (the `<name>` in `<name>.firebaseio.com`)
    pub instance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    instance: Vec<FiredataInstance>,
}

/// Client for the FireData API
#[derive(Debug, Clone)]
pub struct FiredataClient {
    client: ApiClient,
}

impl FiredataClient {
    pub fn new(origin: &str, options: &ClientOptions) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(origin, options)?.with_api_version(API_VERSION),
        })
    }

    /// List the database instances of a project
    pub async fn list_database_instances(
        &self,
        project_number: &str,
    ) -> Result<Vec<FiredataInstance>> {
        let response = self
            .client
            .get_raw(&format!("/projects/{}/databases", project_number))
            .await?;

        if response.status.as_u16() == 200 {
            let body: Option<ListResponse> = response.json()?;
            return Ok(body.map(|b| b.instance).unwrap_or_default());
        }

        let body: Option<serde_json::Value> = response.json().ok().flatten();
        if let Some(error) = body.as_ref().and_then(|b| b.get("error")) {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(ApiError::Service {
                message,
                exit_code: FIREDATA_EXIT_CODE,
            });
        }

        debug!(
            "[firedata] error: {} {}",
            response.status.as_u16(),
            response.body
        );
        Err(ApiError::Service {
            message: "Unexpected error encountered with FireData.".to_string(),
            exit_code: FIREDATA_EXIT_CODE,
        })
    }
}
