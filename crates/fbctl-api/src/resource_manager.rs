//! Cloud Resource Manager: permission checks

use crate::client::{ApiClient, ClientOptions};
use crate::error::{ApiError, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const API_VERSION: &str = "v1";

#[derive(Debug, Default, Deserialize)]
struct TestPermissionsResponse {
    #[serde(default)]
    permissions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ResourceManagerClient {
    client: ApiClient,
}

impl ResourceManagerClient {
    pub fn new(origin: &str, options: &ClientOptions) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(origin, options)?.with_api_version(API_VERSION),
        })
    }

    /// Subset of `permissions` the caller holds on the project
    pub async fn test_iam_permissions(
        &self,
        project_id: &str,
        permissions: &[&str],
    ) -> Result<Vec<String>> {
        let response = self
            .client
            .post::<_, Option<TestPermissionsResponse>>(
                &format!("/projects/{}:testIamPermissions", project_id),
                &json!({ "permissions": permissions }),
            )
            .await?;
        Ok(response.body.unwrap_or_default().permissions)
    }

    /// Fail listing every permission the caller lacks
    pub async fn require_permissions(&self, project_id: &str, permissions: &[&str]) -> Result<()> {
        if permissions.is_empty() {
            return Ok(());
        }
        debug!(
            "[iam] checking project {} for permissions {:?}",
            project_id, permissions
        );
        let granted = self.test_iam_permissions(project_id, permissions).await?;
        let missing: Vec<String> = permissions
            .iter()
            .filter(|p| !granted.iter().any(|g| g == *p))
            .map(|p| p.to_string())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(ApiError::MissingPermissions {
            project: project_id.to_string(),
            permissions: missing,
        })
    }
}
