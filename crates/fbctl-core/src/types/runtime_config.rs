//! Runtime configuration types for operational parameters
//!
//! These types define configuration that controls runtime behavior like
//! HTTP timeouts, API origins and enabled experiments.

use serde::{Deserialize, Serialize};

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Base URLs of the remote management APIs
    #[serde(default)]
    pub origins: ApiOrigins,

    /// Enabled experiment names
    #[serde(default)]
    pub experiments: Vec<String>,

    /// Extension publisher settings
    #[serde(default)]
    pub extensions: ExtensionsSettings,
}

/// Network and HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// HTTP timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Upper bound when polling long-running operations
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            operation_timeout_secs: default_operation_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_http_timeout() -> u64 {
    60
}
fn default_operation_timeout() -> u64 {
    540 // 9 minutes
}
fn default_user_agent() -> String {
    format!(
        "fbctl/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Base URLs for each remote API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApiOrigins {
    #[serde(default = "default_firedata")]
    pub firedata: String,
    #[serde(default = "default_rtdb_management")]
    pub rtdb_management: String,
    #[serde(default = "default_firebase_management")]
    pub firebase_management: String,
    #[serde(default = "default_hosting")]
    pub hosting: String,
    #[serde(default = "default_extensions")]
    pub extensions: String,
    #[serde(default = "default_extensions_registry")]
    pub extensions_registry: String,
    #[serde(default = "default_secret_manager")]
    pub secret_manager: String,
    #[serde(default = "default_storage")]
    pub storage: String,
    #[serde(default = "default_appengine")]
    pub appengine: String,
    #[serde(default = "default_iam")]
    pub iam: String,
    #[serde(default = "default_resource_manager")]
    pub resource_manager: String,
    #[serde(default = "default_functions")]
    pub functions: String,
}

impl ApiOrigins {
    /// Point every origin at the same base URL
    ///
    /// Used by tests that route all traffic to a single mock server.
    pub fn all(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            firedata: base.clone(),
            rtdb_management: base.clone(),
            firebase_management: base.clone(),
            hosting: base.clone(),
            extensions: base.clone(),
            extensions_registry: base.clone(),
            secret_manager: base.clone(),
            storage: base.clone(),
            appengine: base.clone(),
            iam: base.clone(),
            resource_manager: base.clone(),
            functions: base,
        }
    }

    /// Mutable access to an origin by its config key (e.g. `secret-manager`)
    pub fn get_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "firedata" => Some(&mut self.firedata),
            "rtdb-management" => Some(&mut self.rtdb_management),
            "firebase-management" => Some(&mut self.firebase_management),
            "hosting" => Some(&mut self.hosting),
            "extensions" => Some(&mut self.extensions),
            "extensions-registry" => Some(&mut self.extensions_registry),
            "secret-manager" => Some(&mut self.secret_manager),
            "storage" => Some(&mut self.storage),
            "appengine" => Some(&mut self.appengine),
            "iam" => Some(&mut self.iam),
            "resource-manager" => Some(&mut self.resource_manager),
            "functions" => Some(&mut self.functions),
            _ => None,
        }
    }

    /// Config keys of every origin
    pub const KEYS: [&'static str; 12] = [
        "firedata",
        "rtdb-management",
        "firebase-management",
        "hosting",
        "extensions",
        "extensions-registry",
        "secret-manager",
        "storage",
        "appengine",
        "iam",
        "resource-manager",
        "functions",
    ];
}

impl Default for ApiOrigins {
    fn default() -> Self {
        Self {
            firedata: default_firedata(),
            rtdb_management: default_rtdb_management(),
            firebase_management: default_firebase_management(),
            hosting: default_hosting(),
            extensions: default_extensions(),
            extensions_registry: default_extensions_registry(),
            secret_manager: default_secret_manager(),
            storage: default_storage(),
            appengine: default_appengine(),
            iam: default_iam(),
            resource_manager: default_resource_manager(),
            functions: default_functions(),
        }
    }
}

fn default_firedata() -> String {
    "https://mobilesdk-pa.googleapis.com".to_string()
}
fn default_rtdb_management() -> String {
    "https://firebasedatabase.googleapis.com".to_string()
}
fn default_firebase_management() -> String {
    "https://firebase.googleapis.com".to_string()
}
fn default_hosting() -> String {
    "https://firebasehosting.googleapis.com".to_string()
}
fn default_extensions() -> String {
    "https://firebaseextensions.googleapis.com".to_string()
}
fn default_extensions_registry() -> String {
    "https://extensions-registry.firebaseapp.com".to_string()
}
fn default_secret_manager() -> String {
    "https://secretmanager.googleapis.com".to_string()
}
fn default_storage() -> String {
    "https://storage.googleapis.com".to_string()
}
fn default_appengine() -> String {
    "https://appengine.googleapis.com".to_string()
}
fn default_iam() -> String {
    "https://iam.googleapis.com".to_string()
}
fn default_resource_manager() -> String {
    "https://cloudresourcemanager.googleapis.com".to_string()
}
fn default_functions() -> String {
    "https://cloudfunctions.googleapis.com".to_string()
}

/// Extension publisher settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionsSettings {
    /// Minimum CLI version required by `ext dev` commands
    #[serde(default)]
    pub dev_min_version: Option<String>,
}
