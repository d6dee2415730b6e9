//! Extensions publisher API: published extensions and publisher profiles

use crate::error::{ExtensionsError, Result};
use crate::refs::Ref;
use crate::types::{Extension, PublisherProfile};
use fbctl_api::{ApiClient, ApiError, ApiRequest, ClientOptions};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const API_VERSION: &str = "v1beta";
const PAGE_SIZE: &str = "100";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListExtensionsResponse {
    #[serde(default)]
    extensions: Vec<Extension>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Client for the extensions publisher API
#[derive(Debug, Clone)]
pub struct PublisherClient {
    client: ApiClient,
}

impl PublisherClient {
    pub fn new(origin: &str, options: &ClientOptions) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(origin, options)?.with_api_version(API_VERSION),
        })
    }

    /// Fetch a published extension
    pub async fn get_extension(&self, reference: &Ref) -> Result<Extension> {
        self.client
            .get::<Extension>(&format!("/{}", reference.to_extension_name()))
            .await
            .map(|r| r.body)
            .map_err(|e| match e.status() {
                Some(403) => ExtensionsError::validation(format!(
                    "{} doesn't exist or you don't have permission to access it.",
                    reference
                )),
                Some(404) => ref_not_found(reference),
                _ => ExtensionsError::validation(format!(
                    "Failed to query the extension '{}': {}",
                    reference, e
                )),
            })
    }

    /// Delete an extension and all of its versions
    pub async fn delete_extension(&self, reference: &Ref) -> Result<()> {
        self.client
            .delete::<serde_json::Value>(&format!("/{}", reference.to_extension_name()))
            .await
            .map(|_| ())
            .map_err(|e| owner_error(e, reference, "delete"))
    }

    /// Unpublish an extension; installed instances keep running
    pub async fn unpublish_extension(&self, reference: &Ref) -> Result<()> {
        let req = ApiRequest::new(
            Method::POST,
            format!("/{}:unpublish", reference.to_extension_name()),
        );
        self.client
            .send(req)
            .await
            .map(|_| ())
            .map_err(|e| owner_error(e, reference, "unpublish"))
    }

    /// Every extension of a publisher, across all pages
    pub async fn list_extensions(&self, publisher_id: &str) -> Result<Vec<Extension>> {
        let mut extensions = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = ApiRequest::new(
                Method::GET,
                format!("/publishers/{}/extensions", publisher_id),
            )
            .query("pageSize", PAGE_SIZE);
            if let Some(token) = &page_token {
                req = req.query("pageToken", token.as_str());
            }

            let page = self
                .client
                .request::<ListExtensionsResponse>(req)
                .await?
                .body;
            extensions.extend(page.extensions);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(
            "Listed {} extensions for publisher {}",
            extensions.len(),
            publisher_id
        );
        Ok(extensions)
    }

    /// Claim a publisher id for a project
    pub async fn register_publisher(
        &self,
        project_id: &str,
        publisher_id: &str,
    ) -> Result<PublisherProfile> {
        let path = format!("/projects/{}/publisherProfile:register", project_id);
        self.client
            .post::<_, PublisherProfile>(&path, &json!({ "publisherId": publisher_id }))
            .await
            .map(|r| r.body)
            .map_err(|e| match e.status() {
                Some(409) => ExtensionsError::validation(format!(
                    "The publisher ID '{}' has already been claimed by another project.",
                    publisher_id
                )),
                Some(400) => ExtensionsError::validation(format!(
                    "The publisher ID '{}' is invalid. Publisher IDs must be lowercase and may only contain letters, numbers and hyphens.",
                    publisher_id
                )),
                _ => ExtensionsError::Api(e.context(format!(
                    "Failed to register publisher ID {} for project {}",
                    publisher_id, project_id
                ))),
            })
    }
}

fn owner_error(e: ApiError, reference: &Ref, action: &str) -> ExtensionsError {
    match e.status() {
        Some(403) => ExtensionsError::validation(format!(
            "You are not the owner of extension '{}' and don't have the correct permissions to {} this extension.",
            reference, action
        )),
        Some(404) => ref_not_found(reference),
        _ => ExtensionsError::Api(e),
    }
}

fn ref_not_found(reference: &Ref) -> ExtensionsError {
    let name = match &reference.version {
        Some(v) => format!("{}@{}", reference.extension_id, v),
        None => reference.extension_id.clone(),
    };
    ExtensionsError::validation(format!(
        "The extension reference '{}' doesn't exist. This could happen for two reasons:\n  \
         -The publisher ID '{}' doesn't exist or could be misspelled\n  \
         -The name of the extension version '{}' doesn't exist or could be misspelled\n\n\
         Please correct the extension reference and try again.",
        reference, reference.publisher_id, name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_not_found_message() {
        let r = Ref::parse("acme/resize@1.0.0").unwrap();
        let msg = ref_not_found(&r).to_string();
        assert!(msg.starts_with("The extension reference 'acme/resize@1.0.0' doesn't exist."));
        assert!(msg.contains("\n  -The publisher ID 'acme'"));
        assert!(msg.contains("'resize@1.0.0' doesn't exist"));
    }

    #[test]
    fn test_owner_error_passes_other_statuses() {
        let r = Ref::parse("acme/resize").unwrap();
        let err = ApiError::Http {
            status: 500,
            message: "boom".into(),
            body: String::new(),
        };
        assert!(matches!(
            owner_error(err, &r, "delete"),
            ExtensionsError::Api(_)
        ));
    }
}
