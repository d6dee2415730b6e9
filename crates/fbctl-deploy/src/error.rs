//! Error types for fbctl-deploy

use thiserror::Error;

/// Result type alias using the deploy error type
pub type Result<T> = std::result::Result<T, DeployError>;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    Api(#[from] fbctl_api::ApiError),

    #[error(transparent)]
    Core(#[from] fbctl_core::Error),

    /// A lifecycle hook command failed; `id` is `target` or `target[name]`
    #[error("{id} {hook} error: {message}")]
    Hook {
        id: String,
        hook: String,
        message: String,
    },

    #[error("Invalid secret key {key}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("{0}")]
    Aborted(String),

    #[error(
        "Your deployment is checking the expiration of a source token that has not yet been polled. \
         Hitting this case should never happen and should be considered a bug. \
         Please file an issue at https://github.com/firebase/firebase-tools/issues."
    )]
    TokenNotPolled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeployError {
    pub fn aborted(message: impl Into<String>) -> Self {
        Self::Aborted(message.into())
    }

    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
