//! Configuration loading and management

mod hierarchical_loader;
mod loader;
mod rc;

pub use hierarchical_loader::HierarchicalConfigLoader;
pub use loader::{ProjectConfig, CONFIG_FILE_NAME};
pub use rc::{ProjectRc, RC_FILE_NAME};
