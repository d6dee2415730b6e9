//! IAM API: predefined role metadata

use crate::client::{ApiClient, ClientOptions};
use crate::error::Result;
use serde::{Deserialize, Serialize};

const API_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct IamClient {
    client: ApiClient,
}

impl IamClient {
    pub fn new(origin: &str, options: &ClientOptions) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(origin, options)?.with_api_version(API_VERSION),
        })
    }

    /// Look up a role, e.g. `roles/secretmanager.secretAccessor`
    pub async fn get_role(&self, role: &str) -> Result<Role> {
        let role = role.strip_prefix("roles/").unwrap_or(role);
        let response = self.client.get::<Role>(&format!("/roles/{}", role)).await?;
        Ok(response.body)
    }
}
