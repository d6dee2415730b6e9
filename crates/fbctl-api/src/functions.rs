//! Cloud Functions (v1) API: function listing and secret updates

use crate::client::{ApiClient, ApiRequest, ClientOptions};
use crate::error::{ApiError, Result};
use crate::operations::{poll_operation, Operation, PollOptions};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const API_VERSION: &str = "v1";

/// A secret bound to a function as an environment variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretEnvVar {
    pub key: String,
    /// Project id or number that owns the secret
    pub project_id: String,
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A deployed function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub id: String,
    pub region: String,
    pub project: String,
    pub runtime: Option<String>,
    pub secret_environment_variables: Vec<SecretEnvVar>,
}

impl Endpoint {
    /// Full resource name `projects/{p}/locations/{r}/functions/{id}`
    pub fn resource_name(&self) -> String {
        format!(
            "projects/{}/locations/{}/functions/{}",
            self.project, self.region, self.id
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CloudFunction {
    name: String,
    #[serde(default)]
    runtime: Option<String>,
    #[serde(default)]
    secret_environment_variables: Vec<SecretEnvVar>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFunctionsResponse {
    #[serde(default)]
    functions: Vec<CloudFunction>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl TryFrom<CloudFunction> for Endpoint {
    type Error = ApiError;

    fn try_from(f: CloudFunction) -> Result<Self> {
        match f.name.split('/').collect::<Vec<_>>().as_slice() {
            ["projects", project, "locations", region, "functions", id] => Ok(Self {
                id: id.to_string(),
                region: region.to_string(),
                project: project.to_string(),
                runtime: f.runtime,
                secret_environment_variables: f.secret_environment_variables,
            }),
            _ => Err(ApiError::invalid(format!(
                "Unexpected function name: {}",
                f.name
            ))),
        }
    }
}

/// Client for the Cloud Functions v1 API
#[derive(Debug, Clone)]
pub struct FunctionsClient {
    client: ApiClient,
}

impl FunctionsClient {
    pub fn new(origin: &str, options: &ClientOptions) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(origin, options)?.with_api_version(API_VERSION),
        })
    }

    /// Every function of the project across all regions
    pub async fn list_functions(&self, project_id: &str) -> Result<Vec<Endpoint>> {
        let path = format!("/projects/{}/locations/-/functions", project_id);
        let mut endpoints = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = ApiRequest::new(Method::GET, &path);
            if let Some(token) = &page_token {
                req = req.query("pageToken", token.as_str());
            }
            let page: Option<ListFunctionsResponse> = self
                .client
                .request(req)
                .await
                .map_err(|e| e.context("Failed to list functions"))?
                .body;
            let page = page.unwrap_or_default();
            for f in page.functions {
                endpoints.push(Endpoint::try_from(f)?);
            }
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(endpoints)
    }

    /// Replace the secret bindings of a function
    ///
    /// A `source_token` lets the backend reuse the previous build.
    pub async fn update_function_secrets(
        &self,
        endpoint: &Endpoint,
        secrets: &[SecretEnvVar],
        source_token: Option<&str>,
    ) -> Result<Operation> {
        let name = endpoint.resource_name();
        let mut body = json!({
            "name": name,
            "secretEnvironmentVariables": secrets,
        });
        if let Some(token) = source_token {
            body["sourceToken"] = Value::String(token.to_string());
        }
        let mut mask = "secretEnvironmentVariables".to_string();
        if source_token.is_some() {
            mask.push_str(",sourceToken");
        }
        let response = self
            .client
            .patch::<_, Operation>(
                &format!("/{}", name),
                &body,
                &[("updateMask", mask.as_str())],
            )
            .await
            .map_err(|e| e.context(format!("Failed to update function {}", endpoint.id)))?;
        Ok(response.body)
    }

    /// Poll a function operation until done
    pub async fn wait_for_operation<F>(
        &self,
        name: &str,
        options: &PollOptions,
        on_poll: F,
    ) -> Result<Option<Value>>
    where
        F: FnMut(&Operation),
    {
        poll_operation(&self.client, name, options, on_poll).await
    }
}
