//! Secret bookkeeping for Cloud Functions
//!
//! Keys are validated the way function environment variables are, secrets
//! created by the CLI carry the `firebase-managed` label, and a new secret
//! version can be rolled out to every function that binds the secret.

use crate::error::{DeployError, Result};
use crate::source_token::SourceTokenScraper;
use fbctl_api::functions::{Endpoint, FunctionsClient, SecretEnvVar};
use fbctl_api::secret_manager::{
    is_firebase_managed, Secret, SecretManagerClient, SecretVersion, FIREBASE_MANAGED,
};
use fbctl_api::PollOptions;
use futures::future::join_all;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use tracing::{debug, warn};

static KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z_][A-Z0-9_]*$").expect("valid key regex"));

/// Prefixes the functions runtime claims for itself
pub const RESERVED_PREFIXES: &[&str] = &["X_GOOGLE_", "FIREBASE_", "EXT_"];

/// Variables set by the functions runtime
pub const RESERVED_KEYS: &[&str] = &[
    "FIREBASE_CONFIG",
    "CLOUD_RUNTIME_CONFIG",
    "EVENTARC_CLOUD_EVENT_SOURCE",
    "ENTRY_POINT",
    "GCP_PROJECT",
    "GCLOUD_PROJECT",
    "GOOGLE_CLOUD_PROJECT",
    "FUNCTION_TRIGGER_TYPE",
    "FUNCTION_NAME",
    "FUNCTION_MEMORY_MB",
    "FUNCTION_TIMEOUT_SEC",
    "FUNCTION_IDENTITY",
    "FUNCTION_REGION",
    "FUNCTION_TARGET",
    "FUNCTION_SIGNATURE_TYPE",
    "K_SERVICE",
    "K_REVISION",
    "PORT",
    "K_CONFIGURATION",
];

/// Permissions `functions secrets set` needs on the project
pub const SET_PERMISSIONS: &[&str] = &[
    "secretmanager.secrets.create",
    "secretmanager.secrets.get",
    "secretmanager.secrets.update",
    "secretmanager.versions.add",
];

/// Labels put on secrets the CLI manages
pub fn managed_labels() -> BTreeMap<String, String> {
    BTreeMap::from([(FIREBASE_MANAGED.to_string(), "true".to_string())])
}

/// Check `key` against the environment variable rules
pub fn validate_key(key: &str) -> Result<()> {
    if RESERVED_KEYS.contains(&key) {
        return Err(DeployError::invalid_key(
            key,
            format!("Key {} is reserved for internal use.", key),
        ));
    }
    if !KEY_PATTERN.is_match(key) {
        return Err(DeployError::invalid_key(
            key,
            format!(
                "Key {} must start with an uppercase ASCII letter or underscore, \
                 and then consist of uppercase ASCII letters, digits, and underscores.",
                key
            ),
        ));
    }
    if RESERVED_PREFIXES.iter().any(|p| key.starts_with(p)) {
        return Err(DeployError::invalid_key(
            key,
            format!(
                "Key {} starts with a reserved prefix ({})",
                key,
                RESERVED_PREFIXES.join(" ")
            ),
        ));
    }
    Ok(())
}

/// `my-key` -> `MY_KEY`
pub fn transform_key(key: &str) -> String {
    key.replace('-', "_").to_uppercase()
}

/// Normalize and validate a secret key
///
/// A key that is not already uppercase is offered in its transformed form
/// through `confirm`; with `force` the mismatch is an error instead.
pub fn ensure_valid_key<F>(key: &str, force: bool, confirm: F) -> Result<String>
where
    F: FnOnce(&str) -> Result<bool>,
{
    let transformed = transform_key(key);
    if transformed != key {
        if force {
            return Err(DeployError::aborted("Secret key must be in UPPERCASE."));
        }
        warn!("By convention, secret key must be in UPPERCASE.");
        if !confirm(&transformed)? {
            return Err(DeployError::aborted("Secret key must be in UPPERCASE."));
        }
    }
    validate_key(&transformed)?;
    Ok(transformed)
}

/// Fetch the secret, creating it (as Firebase-managed) when missing
///
/// An existing secret without the managed label is offered for management
/// through `confirm`, unless `force` is set.
pub async fn ensure_secret<F>(
    client: &SecretManagerClient,
    project_id: &str,
    name: &str,
    force: bool,
    confirm: F,
) -> Result<Secret>
where
    F: FnOnce(&Secret) -> Result<bool>,
{
    match client.get_secret(project_id, name).await {
        Ok(mut secret) => {
            if !is_firebase_managed(&secret) && !force {
                warn!(
                    "Your secret is not managed by Cloud Functions for Firebase. \
                     Firebase managed secrets are automatically pruned to reduce your monthly cost for using Secret Manager."
                );
                if confirm(&secret)? {
                    secret.labels.extend(managed_labels());
                    return Ok(client.patch_secret_labels(&secret).await?);
                }
            }
            Ok(secret)
        }
        Err(e) if e.status() == Some(404) => {
            debug!("Secret {} not found, creating it", name);
            Ok(client
                .create_secret(project_id, name, managed_labels())
                .await?)
        }
        Err(e) => Err(e.into()),
    }
}

/// Both ways a project can be named in a secret binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub project_id: String,
    pub project_number: String,
}

impl ProjectInfo {
    fn owns(&self, project: &str) -> bool {
        project == self.project_id || project == self.project_number
    }
}

fn binds(info: &ProjectInfo, secret: &Secret, sev: &SecretEnvVar) -> bool {
    info.owns(&sev.project_id) && sev.secret == secret.name
}

/// Whether `endpoint` binds `secret`
pub fn in_use(info: &ProjectInfo, secret: &Secret, endpoint: &Endpoint) -> bool {
    endpoint
        .secret_environment_variables
        .iter()
        .any(|sev| binds(info, secret, sev))
}

/// Endpoints binding `secret`
pub fn endpoints_using<'a>(
    info: &ProjectInfo,
    secret: &Secret,
    endpoints: &'a [Endpoint],
) -> Vec<&'a Endpoint> {
    endpoints
        .iter()
        .filter(|e| in_use(info, secret, e))
        .collect()
}

/// `id(region)` as shown to users
pub fn endpoint_label(endpoint: &Endpoint) -> String {
    format!("{}({})", endpoint.id, endpoint.region)
}

/// The endpoint's bindings with `version` pinned for the matching secret
pub fn pin_secret_version(
    info: &ProjectInfo,
    version: &SecretVersion,
    endpoint: &Endpoint,
) -> Vec<SecretEnvVar> {
    endpoint
        .secret_environment_variables
        .iter()
        .map(|sev| {
            let mut sev = sev.clone();
            if binds(info, &version.secret, &sev) {
                sev.version = Some(version.version_id.clone());
            }
            sev
        })
        .collect()
}

/// Point one endpoint at a new secret version and wait for the rollout
///
/// Endpoints that do not bind the secret are returned untouched.
pub async fn update_endpoint_secret(
    client: &FunctionsClient,
    info: &ProjectInfo,
    version: &SecretVersion,
    endpoint: &Endpoint,
    scraper: &SourceTokenScraper,
    poll: &PollOptions,
) -> Result<Endpoint> {
    if !in_use(info, &version.secret, endpoint) {
        return Ok(endpoint.clone());
    }
    let secrets = pin_secret_version(info, version, endpoint);

    let token = scraper.get_token().await?;
    let fetching = token.is_none();
    let result = async {
        let op = client
            .update_function_secrets(endpoint, &secrets, token.as_deref())
            .await?;
        let mut observe = scraper.poller();
        observe(&op);
        client.wait_for_operation(&op.name, poll, observe).await
    }
    .await;

    if let Err(e) = result {
        if fetching {
            scraper.abandon();
        }
        return Err(e.into());
    }

    let mut updated = endpoint.clone();
    updated.secret_environment_variables = secrets;
    Ok(updated)
}

/// Progress of [`update_endpoints`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointUpdate {
    Updating(String),
    Updated(String),
}

/// Roll `version` out to `endpoints` concurrently
///
/// Updates in the same region share one source token. Every update runs to
/// completion; the first failure is returned afterwards.
pub async fn update_endpoints<F>(
    client: &FunctionsClient,
    info: &ProjectInfo,
    version: &SecretVersion,
    endpoints: &[&Endpoint],
    poll: &PollOptions,
    on_event: F,
) -> Result<Vec<Endpoint>>
where
    F: Fn(EndpointUpdate),
{
    let mut scrapers: HashMap<&str, SourceTokenScraper> = HashMap::new();
    for endpoint in endpoints {
        scrapers.entry(endpoint.region.as_str()).or_default();
    }

    let on_event = &on_event;
    let scrapers = &scrapers;
    let updates = endpoints.iter().map(|endpoint| async move {
        let label = endpoint_label(endpoint);
        on_event(EndpointUpdate::Updating(label.clone()));
        let scraper = scrapers
            .get(endpoint.region.as_str())
            .ok_or_else(|| DeployError::aborted(format!("No token scraper for {}", label)))?;
        let updated = update_endpoint_secret(client, info, version, endpoint, scraper, poll).await?;
        on_event(EndpointUpdate::Updated(label));
        Ok::<_, DeployError>(updated)
    });

    join_all(updates).await.into_iter().collect()
}
