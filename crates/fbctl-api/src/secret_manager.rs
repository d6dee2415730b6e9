//! Secret Manager API

use crate::client::{ApiClient, ApiRequest, ClientOptions};
use crate::error::{ApiError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;

const API_VERSION: &str = "v1";

/// Label marking secrets whose lifecycle the CLI manages
pub const FIREBASE_MANAGED: &str = "firebase-managed";

/// A secret, addressed by project and short name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    pub project_id: String,
    pub name: String,
    pub labels: BTreeMap<String, String>,
}

/// Lifecycle state of a secret version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    StateUnspecified,
    Enabled,
    Disabled,
    Destroyed,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StateUnspecified => "STATE_UNSPECIFIED",
            Self::Enabled => "ENABLED",
            Self::Disabled => "DISABLED",
            Self::Destroyed => "DESTROYED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretVersion {
    pub secret: Secret,
    pub version_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
}

#[derive(Debug, Deserialize)]
struct ApiSecret {
    name: String,
    #[serde(default)]
    labels: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ApiSecretVersion {
    name: String,
    #[serde(default)]
    state: Option<State>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListVersionsResponse {
    #[serde(default)]
    versions: Vec<ApiSecretVersion>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccessResponse {
    payload: Payload,
}

#[derive(Debug, Deserialize)]
struct Payload {
    data: String,
}

/// Whether the CLI created (or was allowed to manage) this secret
pub fn is_firebase_managed(secret: &Secret) -> bool {
    secret.labels.contains_key(FIREBASE_MANAGED)
}

/// `projects/{p}/secrets/{s}/versions/{v}`
pub fn to_secret_version_resource_name(version: &SecretVersion) -> String {
    format!(
        "projects/{}/secrets/{}/versions/{}",
        version.secret.project_id, version.secret.name, version.version_id
    )
}

/// Parse `projects/{p}/secrets/{s}` into a label-less secret
pub fn parse_secret_resource_name(resource: &str) -> Result<Secret> {
    match resource.split('/').collect::<Vec<_>>().as_slice() {
        ["projects", project, "secrets", name] => Ok(Secret {
            project_id: project.to_string(),
            name: name.to_string(),
            labels: BTreeMap::new(),
        }),
        _ => Err(ApiError::invalid(format!(
            "Invalid secret resource name [{}].",
            resource
        ))),
    }
}

/// Parse `projects/{p}/secrets/{s}/versions/{v}`
pub fn parse_secret_version_resource_name(resource: &str) -> Result<SecretVersion> {
    match resource.split('/').collect::<Vec<_>>().as_slice() {
        ["projects", project, "secrets", name, "versions", version] => Ok(SecretVersion {
            secret: Secret {
                project_id: project.to_string(),
                name: name.to_string(),
                labels: BTreeMap::new(),
            },
            version_id: version.to_string(),
            state: None,
        }),
        _ => Err(ApiError::invalid(format!(
            "Invalid secret version resource name [{}].",
            resource
        ))),
    }
}

fn secret_from_api(api: ApiSecret) -> Result<Secret> {
    let mut secret = parse_secret_resource_name(&api.name)?;
    secret.labels = api.labels;
    Ok(secret)
}

fn version_from_api(api: ApiSecretVersion) -> Result<SecretVersion> {
    let mut version = parse_secret_version_resource_name(&api.name)?;
    version.state = api.state;
    Ok(version)
}

/// Client for the Secret Manager API
#[derive(Debug, Clone)]
pub struct SecretManagerClient {
    client: ApiClient,
}

impl SecretManagerClient {
    pub fn new(origin: &str, options: &ClientOptions) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(origin, options)?.with_api_version(API_VERSION),
        })
    }

    pub async fn get_secret(&self, project_id: &str, name: &str) -> Result<Secret> {
        let response = self
            .client
            .get::<ApiSecret>(&format!("/projects/{}/secrets/{}", project_id, name))
            .await?;
        secret_from_api(response.body)
    }

    /// Create a secret with automatic replication
    pub async fn create_secret(
        &self,
        project_id: &str,
        name: &str,
        labels: BTreeMap<String, String>,
    ) -> Result<Secret> {
        let req = ApiRequest::new(Method::POST, format!("/projects/{}/secrets", project_id))
            .query("secretId", name)
            .json(&json!({
                "name": name,
                "replication": { "automatic": {} },
                "labels": labels,
            }))?;
        let response = self.client.request::<ApiSecret>(req).await?;
        secret_from_api(response.body)
    }

    /// Replace the labels of a secret
    pub async fn patch_secret_labels(&self, secret: &Secret) -> Result<Secret> {
        let path = format!("/projects/{}/secrets/{}", secret.project_id, secret.name);
        let body = json!({
            "name": format!("projects/{}/secrets/{}", secret.project_id, secret.name),
            "labels": secret.labels,
        });
        let response = self
            .client
            .patch::<_, ApiSecret>(&path, &body, &[("updateMask", "labels")])
            .await?;
        secret_from_api(response.body)
    }

    /// Add a new version holding `value`
    pub async fn add_version(
        &self,
        project_id: &str,
        name: &str,
        value: &str,
    ) -> Result<SecretVersion> {
        let response = self
            .client
            .post::<_, ApiSecretVersion>(
                &format!("/projects/{}/secrets/{}:addVersion", project_id, name),
                &json!({ "payload": { "data": BASE64.encode(value.as_bytes()) } }),
            )
            .await?;
        let mut version = version_from_api(response.body)?;
        // The API answers with the project number; keep the caller's id
        version.secret.project_id = project_id.to_string();
        version.state = version.state.or(Some(State::Enabled));
        Ok(version)
    }

    /// All versions of a secret, newest first as returned by the API
    pub async fn list_secret_versions(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<Vec<SecretVersion>> {
        let path = format!("/projects/{}/secrets/{}/versions", project_id, name);
        let mut versions = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = ApiRequest::new(Method::GET, &path);
            if let Some(token) = &page_token {
                req = req.query("pageToken", token.as_str());
            }
            let page: Option<ListVersionsResponse> = self.client.request(req).await?.body;
            let page = page.unwrap_or_default();
            for v in page.versions {
                versions.push(version_from_api(v)?);
            }
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(versions)
    }

    /// Decoded payload of a secret version (`latest` allowed)
    pub async fn access_secret_version(
        &self,
        project_id: &str,
        name: &str,
        version: &str,
    ) -> Result<String> {
        let response = self
            .client
            .get::<AccessResponse>(&format!(
                "/projects/{}/secrets/{}/versions/{}:access",
                project_id, name, version
            ))
            .await?;
        let bytes = BASE64
            .decode(response.body.payload.data.as_bytes())
            .map_err(|e| ApiError::invalid(format!("Secret payload is not valid base64: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| ApiError::invalid(format!("Secret payload is not valid UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_resource_name_roundtrip() {
        let v = parse_secret_version_resource_name("projects/p/secrets/API_KEY/versions/3").unwrap();
        assert_eq!(v.secret.project_id, "p");
        assert_eq!(v.secret.name, "API_KEY");
        assert_eq!(v.version_id, "3");
        assert_eq!(
            to_secret_version_resource_name(&v),
            "projects/p/secrets/API_KEY/versions/3"
        );
    }

    #[test]
    fn test_parse_rejects_bad_names() {
        assert!(parse_secret_version_resource_name("projects/p/secrets/s").is_err());
        assert!(parse_secret_resource_name("secrets/s").is_err());
    }

    #[test]
    fn test_is_firebase_managed() {
        let mut secret = parse_secret_resource_name("projects/p/secrets/s").unwrap();
        assert!(!is_firebase_managed(&secret));
        secret
            .labels
            .insert(FIREBASE_MANAGED.to_string(), "true".to_string());
        assert!(is_firebase_managed(&secret));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(State::Destroyed.to_string(), "DESTROYED");
        let s: State = serde_json::from_str("\"ENABLED\"").unwrap();
        assert_eq!(s, State::Enabled);
    }
}
