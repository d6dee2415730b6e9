//! # fbctl-emulator
//!
//! Helpers shared by the local emulators:
//! - Emulated trigger definitions
//! - Storage rules configuration resolution
//! - The interactive functions shell

pub mod error;
pub mod functions_shell;
pub mod storage_rules;
pub mod triggers;

pub use error::{EmulatorError, Result};
pub use functions_shell::{CallOptions, FunctionsEmulator, FunctionsShell};
pub use storage_rules::{get_storage_rules_config, ResourceRules, SourceFile, StorageRulesConfig};
pub use triggers::{EmulatedTrigger, EventTrigger};

/// Project ids with this prefix never touch production resources
pub const DEMO_PROJECT_PREFIX: &str = "demo-";

/// Whether a project id names a demo project
pub fn is_demo_project(project_id: &str) -> bool {
    project_id.starts_with(DEMO_PROJECT_PREFIX)
}
