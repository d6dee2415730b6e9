//! Error types for fbctl-core

use thiserror::Error;

/// Result type alias using fbctl-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for fbctl
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No project could be resolved for a command that needs one
    #[error(
        "No currently active project.\n\
         To run this command, you need to specify a project. You have two options:\n\
         - Run this command with --project <alias_or_project_id>.\n\
         - Add a default project to .firebaserc, then rerun this command."
    )]
    NoActiveProject,

    /// No access token available
    #[error("Not authenticated. Pass --token or set FBCTL_TOKEN to an OAuth access token.")]
    NotAuthenticated,

    /// Deploy target referenced but not configured in .firebaserc
    #[error(
        "Deploy target {target} not configured for project {project}. Configure with:\n\n  \
         add \"{target}\" under targets.{project}.{kind} in .firebaserc"
    )]
    TargetNotConfigured {
        project: String,
        kind: String,
        target: String,
    },

    /// Invalid semver version
    #[error("Invalid version format: {version}")]
    InvalidVersion { version: String },

    /// CLI is older than the minimum version a command requires
    #[error("This command requires fbctl version {required} or greater (current: {current}). Please update.")]
    VersionTooOld { required: String, current: String },
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a target not configured error
    pub fn target_not_configured(
        project: impl Into<String>,
        kind: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::TargetNotConfigured {
            project: project.into(),
            kind: kind.into(),
            target: target.into(),
        }
    }

    /// Create an invalid version error
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }
}
