//! Cloud Storage and App Engine default bucket lookups

use crate::client::{ApiClient, ApiRequest, ClientOptions};
use crate::error::{ApiError, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// Maximum accepted upload size (bytes) advertised to the storage API
const CONTENT_LENGTH_RANGE: &str = "0,123289600";

const APP_ENGINE_HINT: &str = "\n\nThere was an issue deploying your functions. Verify that your project has a Google App Engine instance setup at https://console.cloud.google.com/appengine and try again. If this issue persists, please contact support.";

/// Result of uploading an archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedObject {
    pub bucket: String,
    pub object: String,
    pub generation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub project_number: Option<String>,
    #[serde(default)]
    pub storage_class: Option<String>,
}

/// Cloud Storage service agent of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageServiceAccount {
    pub email_address: String,
    #[serde(default)]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppEngineApp {
    #[serde(default)]
    default_bucket: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BucketList {
    #[serde(default)]
    items: Vec<Bucket>,
}

/// Client for Cloud Storage (plus the App Engine app lookup)
#[derive(Debug, Clone)]
pub struct StorageClient {
    storage: ApiClient,
    appengine: ApiClient,
    options: ClientOptions,
}

impl StorageClient {
    pub fn new(
        storage_origin: &str,
        appengine_origin: &str,
        options: &ClientOptions,
    ) -> Result<Self> {
        Ok(Self {
            storage: ApiClient::new(storage_origin, options)?,
            appengine: ApiClient::new(appengine_origin, options)?.with_api_version("v1"),
            options: options.clone(),
        })
    }

    /// Default Cloud Storage bucket of the project's App Engine app
    pub async fn get_default_bucket(&self, project_id: &str) -> Result<String> {
        let result = self.fetch_default_bucket(project_id).await;
        if result.is_err() {
            info!("{}", APP_ENGINE_HINT);
        }
        result
    }

    async fn fetch_default_bucket(&self, project_id: &str) -> Result<String> {
        let app: AppEngineApp = self
            .appengine
            .get(&format!("/apps/{}", project_id))
            .await?
            .body;
        match app.default_bucket {
            Some(bucket) if bucket == "undefined" => {
                debug!("Default storage bucket is undefined.");
                Err(ApiError::invalid(
                    "Your project is being set up. Please wait a minute before deploying again.",
                ))
            }
            Some(bucket) => Ok(bucket),
            None => Err(ApiError::invalid(format!(
                "No default storage bucket found for project {}",
                project_id
            ))),
        }
    }

    /// PUT an archive to a signed upload URL; returns the object generation
    pub async fn upload(
        &self,
        source: &Path,
        upload_url: &str,
        extra_headers: &BTreeMap<String, String>,
    ) -> Result<Option<String>> {
        let url = Url::parse(upload_url)
            .map_err(|e| ApiError::invalid(format!("Invalid upload URL {}: {}", upload_url, e)))?;
        let client =
            ApiClient::new(url.origin().ascii_serialization(), &self.options)?.without_auth();

        let mut req = ApiRequest::new(Method::PUT, url.path())
            .header("content-type", "application/zip");
        for (key, value) in url.query_pairs() {
            req = req.query(key.into_owned(), value.into_owned());
        }
        for (key, value) in extra_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        let body = tokio::fs::read(source).await?;
        let response = client.send(req.bytes(body)).await?;
        Ok(response.header("x-goog-generation"))
    }

    /// Upload a `.zip` archive into a bucket under its file name
    pub async fn upload_object(&self, source: &Path, bucket: &str) -> Result<UploadedObject> {
        if source.extension().and_then(|e| e.to_str()) != Some("zip") {
            return Err(ApiError::invalid(format!(
                "Expected a file name ending in .zip, got {}",
                source.display()
            )));
        }
        let object = source
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let body = tokio::fs::read(source).await?;
        let req = ApiRequest::new(Method::PUT, format!("/{}/{}", bucket, object))
            .header("Content-Type", "application/zip")
            .header("x-goog-content-length-range", CONTENT_LENGTH_RANGE)
            .bytes(body);
        let response = self.storage.send(req).await?;

        Ok(UploadedObject {
            bucket: bucket.to_string(),
            object,
            generation: response.header("x-goog-generation"),
        })
    }

    /// Delete an object by its `/{bucket}/{object}` location
    pub async fn delete_object(&self, location: &str) -> Result<()> {
        self.storage
            .send(ApiRequest::new(Method::DELETE, location))
            .await?;
        Ok(())
    }

    pub async fn get_bucket(&self, name: &str) -> Result<Bucket> {
        self.storage
            .get::<Bucket>(&format!("/storage/v1/b/{}", name))
            .await
            .map(|r| r.body)
            .map_err(|e| {
                debug!("{}", e);
                e.context("Failed to obtain the storage bucket")
            })
    }

    /// Names of every bucket in a project
    pub async fn list_buckets(&self, project_id: &str) -> Result<Vec<String>> {
        let req = ApiRequest::new(Method::GET, "/storage/v1/b").query("project", project_id);
        self.storage
            .request::<Option<BucketList>>(req)
            .await
            .map(|r| {
                r.body
                    .unwrap_or_default()
                    .items
                    .into_iter()
                    .map(|b| b.name)
                    .collect()
            })
            .map_err(|e| {
                debug!("{}", e);
                e.context("Failed to read the storage buckets")
            })
    }

    pub async fn get_service_account(&self, project_id: &str) -> Result<StorageServiceAccount> {
        self.storage
            .get::<StorageServiceAccount>(&format!(
                "/storage/v1/projects/{}/serviceAccount",
                project_id
            ))
            .await
            .map(|r| r.body)
            .map_err(|e| {
                debug!("{}", e);
                e.context("Failed to obtain the Cloud Storage service agent")
            })
    }
}
