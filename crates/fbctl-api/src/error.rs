//! Error types for fbctl-api

use thiserror::Error;

/// Result type alias using fbctl-api's error type
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors raised while talking to a remote management API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Non-2xx response
    #[error("HTTP Error: {status}, {message}")]
    Http {
        status: u16,
        message: String,
        body: String,
    },

    /// Connection, TLS or timeout failure
    #[error("Failed to make request to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body was not the JSON we expected
    #[error("Unable to parse JSON response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Error reported by a service in its response body
    #[error("{message}")]
    Service { message: String, exit_code: i32 },

    /// A lower-level failure wrapped with a user-facing description
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: Box<ApiError>,
    },

    /// Long-running operation finished with an error
    #[error("Operation {name} failed: {message}")]
    OperationFailed { name: String, message: String },

    /// Long-running operation did not finish in time
    #[error("Timed out waiting for operation {name} to complete")]
    OperationTimeout { name: String },

    /// Caller is missing IAM permissions on the project
    #[error(
        "Authorization failed. This account is missing the following required permissions on project {project}:\n\n  {}",
        .permissions.join("\n  ")
    )]
    MissingPermissions {
        project: String,
        permissions: Vec<String>,
    },

    /// Invalid input to a client call
    #[error("{0}")]
    Invalid(String),

    /// IO error (reading upload sources)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Wrap this error with a user-facing message
    pub fn context(self, message: impl Into<String>) -> Self {
        Self::Context {
            message: message.into(),
            source: Box::new(self),
        }
    }

    /// HTTP status of the underlying response, looking through context wrappers
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Context { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether this is a 404
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Process exit code suggested for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Service { exit_code, .. } => *exit_code,
            Self::Context { source, .. } => source.exit_code(),
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_looks_through_context() {
        let err = ApiError::Http {
            status: 409,
            message: "exists".into(),
            body: String::new(),
        }
        .context("Failed to create site");
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.to_string(), "Failed to create site");
    }

    #[test]
    fn test_missing_permissions_message() {
        let err = ApiError::MissingPermissions {
            project: "p".into(),
            permissions: vec!["a.b.c".into(), "d.e.f".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("project p"));
        assert!(msg.ends_with("a.b.c\n  d.e.f"));
    }

    #[test]
    fn test_exit_code() {
        let err = ApiError::Service {
            message: "boom".into(),
            exit_code: 2,
        };
        assert_eq!(err.exit_code(), 2);
        assert_eq!(ApiError::invalid("x").exit_code(), 1);
    }
}
