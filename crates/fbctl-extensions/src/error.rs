//! Error types for fbctl-extensions

use thiserror::Error;

/// Result type alias using the extensions error type
pub type Result<T> = std::result::Result<T, ExtensionsError>;

#[derive(Error, Debug)]
pub enum ExtensionsError {
    #[error(transparent)]
    Api(#[from] fbctl_api::ApiError),

    #[error(transparent)]
    Core(#[from] fbctl_core::Error),

    #[error(transparent)]
    Emulator(#[from] fbctl_emulator::EmulatorError),

    #[error("Could not find \"{file}\" in \"{dir}\"")]
    FileNotFound { file: String, dir: String },

    #[error("Failed to read file \"{file}\" in \"{dir}\"")]
    ReadFailed {
        file: String,
        dir: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to convert JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML Error: {0}")]
    Yaml(String),

    #[error("Invalid extension reference: {0}")]
    InvalidRef(String),

    #[error("Invalid extension.yaml: {0}")]
    InvalidSpec(String),

    #[error(
        "The following runtimes are not supported by the Emulator Suite: {}. \n Only Node runtimes are supported.",
        .0.join(", ")
    )]
    UnsupportedRuntimes(Vec<String>),

    #[error("Error while parsing {path} - unable to parse following lines:\n{}", .lines.join("\n"))]
    EnvParse { path: String, lines: Vec<String> },

    #[error("{0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtensionsError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn invalid_spec(message: impl Into<String>) -> Self {
        Self::InvalidSpec(message.into())
    }

    pub fn invalid_ref(reference: impl Into<String>) -> Self {
        Self::InvalidRef(reference.into())
    }
}
