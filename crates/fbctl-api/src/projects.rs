//! Firebase management API: project metadata

use crate::client::{ApiClient, ClientOptions};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

const API_VERSION: &str = "v1beta1";

/// Default resources provisioned for a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultProjectResources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosting_site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime_database_instance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseProject {
    pub project_id: String,
    pub project_number: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<DefaultProjectResources>,
}

/// Client for the Firebase management API
#[derive(Debug, Clone)]
pub struct ProjectsClient {
    client: ApiClient,
}

impl ProjectsClient {
    pub fn new(origin: &str, options: &ClientOptions) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(origin, options)?.with_api_version(API_VERSION),
        })
    }

    pub async fn get_firebase_project(&self, project_id: &str) -> Result<FirebaseProject> {
        let response = self
            .client
            .get::<FirebaseProject>(&format!("/projects/{}", project_id))
            .await
            .map_err(|e| {
                e.context(format!(
                    "Failed to get Firebase project {}. Please make sure the project exists and your account has permission to access it.",
                    project_id
                ))
            })?;
        Ok(response.body)
    }

    /// Project number of a project id
    pub async fn need_project_number(&self, project_id: &str) -> Result<String> {
        Ok(self.get_firebase_project(project_id).await?.project_number)
    }

    /// The project's default hosting site, or the project id when none is provisioned
    pub async fn get_default_hosting_site(&self, project_id: &str) -> Result<String> {
        let project = self.get_firebase_project(project_id).await?;
        match project.resources.and_then(|r| r.hosting_site) {
            Some(site) if !site.is_empty() => Ok(site),
            _ => {
                debug!(
                    "No default hosting site found for project: {}. Using projectId as hosting site name.",
                    project_id
                );
                Ok(project_id.to_string())
            }
        }
    }
}
