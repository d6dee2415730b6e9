//! # fbctl-core
//!
//! Core library for the fbctl CLI providing:
//! - Runtime configuration with embedded defaults and env overrides
//! - Project configuration (`firebase.json`) and rc (`.firebaserc`) access
//! - Active project resolution
//! - Access token lookup, experiments and the minimum-version gate

pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod experiments;
pub mod types;
pub mod utils;
pub mod version;

pub use config::{HierarchicalConfigLoader, ProjectConfig, ProjectRc};
pub use context::ProjectContext;
pub use error::{Error, Result};
pub use utils::get_home_dir;
