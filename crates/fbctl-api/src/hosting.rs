//! Firebase Hosting API: sites

use crate::client::{ApiClient, ApiRequest, ClientOptions};
use crate::error::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

const API_VERSION: &str = "v1beta1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub name: String,
    #[serde(default)]
    pub default_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

/// Client for the Firebase Hosting API
#[derive(Debug, Clone)]
pub struct HostingClient {
    client: ApiClient,
}

impl HostingClient {
    pub fn new(origin: &str, options: &ClientOptions) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(origin, options)?.with_api_version(API_VERSION),
        })
    }

    /// Create a site, optionally linked to a web app
    ///
    /// The raw HTTP error is returned untouched so callers can react to 409.
    pub async fn create_site(
        &self,
        project_id: &str,
        site_id: &str,
        app_id: Option<&str>,
    ) -> Result<Site> {
        let req = ApiRequest::new(Method::POST, format!("/projects/{}/sites", project_id))
            .query("siteId", site_id)
            .json(&json!({ "appId": app_id.unwrap_or_default() }))?;
        Ok(self.client.request::<Site>(req).await?.body)
    }
}
