//! # fbctl-extensions
//!
//! Extension authoring and publishing support:
//! - Extension references and `extension.yaml` types
//! - Reading and validating a local extension
//! - Param substitution, defaults, validation and prompting
//! - Emulator options and triggers for local extensions
//! - The publisher API, the public registry and publisher consent

pub mod consent;
pub mod display;
pub mod emulator_options;
pub mod error;
pub mod params;
pub mod publisher_api;
pub mod refs;
pub mod registry;
pub mod spec_helper;
pub mod triggers;
pub mod types;

pub use error::{ExtensionsError, Result};
pub use params::ParamPrompter;
pub use publisher_api::PublisherClient;
pub use refs::Ref;
pub use registry::ExtensionRegistry;
pub use types::{Extension, ExtensionSpec, Param, Resource};

/// Label used in user-facing extension messages
pub const LOG_PREFIX: &str = "extensions";
