//! Realtime Database management API

use crate::client::{ApiClient, ApiRequest, ClientOptions};
use crate::error::{ApiError, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const API_VERSION: &str = "v1beta";
const PAGE_SIZE: &str = "100";

/// Region a database instance lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseLocation {
    #[serde(rename = "us-central1")]
    UsCentral1,
    #[serde(rename = "europe-west1")]
    EuropeWest1,
    #[serde(rename = "asia-southeast1")]
    AsiaSoutheast1,
    /// Wildcard used when listing across every location
    #[serde(rename = "-")]
    Any,
}

impl DatabaseLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UsCentral1 => "us-central1",
            Self::EuropeWest1 => "europe-west1",
            Self::AsiaSoutheast1 => "asia-southeast1",
            Self::Any => "-",
        }
    }

    /// Parse an optional location, falling back to `default` when absent
    pub fn parse(location: Option<&str>, default: DatabaseLocation) -> Result<Self> {
        match location {
            None => Ok(default),
            Some(s) if s.is_empty() => Ok(default),
            Some(s) => s.parse(),
        }
    }
}

impl FromStr for DatabaseLocation {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "us-central1" => Ok(Self::UsCentral1),
            "europe-west1" => Ok(Self::EuropeWest1),
            "asia-southeast1" => Ok(Self::AsiaSoutheast1),
            "-" | "any" => Ok(Self::Any),
            other => Err(ApiError::invalid(format!(
                "Unexpected location value: {}. Only us-central1, europe-west1, and asia-southeast1 locations are supported",
                other
            ))),
        }
    }
}

impl fmt::Display for DatabaseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A database instance, with its resource name broken apart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseInstance {
    pub name: String,
    pub project: String,
    pub location: String,
    pub database_url: String,
    #[serde(rename = "type")]
    pub instance_type: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiInstance {
    name: String,
    #[serde(default)]
    project: String,
    #[serde(default)]
    database_url: String,
    #[serde(default, rename = "type")]
    instance_type: String,
    #[serde(default)]
    state: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    instances: Vec<ApiInstance>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl TryFrom<ApiInstance> for DatabaseInstance {
    type Error = ApiError;

    /// Resource names look like `projects/{n}/locations/{l}/instances/{id}`
    fn try_from(api: ApiInstance) -> Result<Self> {
        let parts: Vec<&str> = api.name.split('/').collect();
        if parts.len() != 6 || parts[0] != "projects" || parts[4] != "instances" {
            return Err(ApiError::invalid(format!(
                "Unexpected database instance name: {}",
                api.name
            )));
        }
        Ok(Self {
            name: parts[5].to_string(),
            project: if api.project.is_empty() {
                parts[1].to_string()
            } else {
                api.project
            },
            location: parts[3].to_string(),
            database_url: api.database_url,
            instance_type: api.instance_type,
            state: api.state,
        })
    }
}

/// Client for the Realtime Database management API
#[derive(Debug, Clone)]
pub struct DatabaseClient {
    client: ApiClient,
}

impl DatabaseClient {
    pub fn new(origin: &str, options: &ClientOptions) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(origin, options)?.with_api_version(API_VERSION),
        })
    }

    /// List every instance in a location, following page tokens
    pub async fn list_database_instances(
        &self,
        project_id: &str,
        location: DatabaseLocation,
    ) -> Result<Vec<DatabaseInstance>> {
        let path = format!("/projects/{}/locations/{}/instances", project_id, location);
        let mut instances = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = ApiRequest::new(Method::GET, &path).query("pageSize", PAGE_SIZE);
            if let Some(token) = &page_token {
                req = req.query("pageToken", token.as_str());
            }
            let page: Option<ListResponse> = self
                .client
                .request(req)
                .await
                .map_err(|e| {
                    e.context(format!(
                        "Failed to list Firebase Realtime Database instances{}",
                        if location == DatabaseLocation::Any {
                            String::new()
                        } else {
                            format!(" for location {}", location)
                        }
                    ))
                })?
                .body;
            let page = page.unwrap_or_default();

            for instance in page.instances {
                instances.push(DatabaseInstance::try_from(instance)?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Listed {} database instances", instances.len());
        Ok(instances)
    }
}
