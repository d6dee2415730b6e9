//! Error types for fbctl-emulator

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmulatorError>;

#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("Cannot start the Storage emulator without rules file specified in firebase.json: run 'firebase init' and set up your Storage configuration")]
    MissingStorageRules,

    #[error("Must supply 'target' in Storage configuration")]
    MissingStorageTarget,

    #[error("Could not find trigger {0}")]
    TriggerNotFound(String),

    #[error("Function {0} is not a background function")]
    NotBackgroundFunction(String),

    #[error("Failed to read rules file {path}: {source}")]
    ReadRules {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Embedded template not found: {0}")]
    TemplateNotFound(String),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Core(#[from] fbctl_core::Error),
}

impl EmulatorError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}
