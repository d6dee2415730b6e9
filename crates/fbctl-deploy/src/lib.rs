//! # fbctl-deploy
//!
//! Deploy-time helpers shared by fbctl commands:
//! - Predeploy/postdeploy lifecycle hooks from `firebase.json`
//! - Source token sharing across concurrent function updates
//! - Secret key validation and secret version rollout to functions

pub mod error;
pub mod lifecycle_hooks;
pub mod secrets;
pub mod source_token;

pub use error::{DeployError, Result};
pub use lifecycle_hooks::{Hook, HookEvent, HookRunner};
pub use secrets::ProjectInfo;
pub use source_token::SourceTokenScraper;
