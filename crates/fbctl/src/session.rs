//! Per-invocation state shared by command handlers

use crate::cli::GlobalArgs;
use anyhow::{Context, Result};
use fbctl_api::{ClientOptions, PollOptions};
use fbctl_core::credentials::{require_auth, resolve_access_token};
use fbctl_core::types::{ApiOrigins, RuntimeConfig};
use fbctl_core::version::{check_min_required_version, CLI_VERSION};
use fbctl_core::{experiments, HierarchicalConfigLoader, ProjectContext};
use std::io::IsTerminal;
use std::time::Duration;
use tracing::debug;

pub struct Session {
    pub runtime: RuntimeConfig,
    pub project: ProjectContext,
    pub client_options: ClientOptions,
    /// Prompts allowed: no `--non-interactive` and stdin is a terminal
    pub interactive: bool,
    pub json: bool,
}

impl Session {
    /// Load runtime config, resolve the project and pick up credentials
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let runtime = HierarchicalConfigLoader::new()?
            .load_runtime_config()
            .context("Failed to load runtime configuration")?;
        let project = ProjectContext::resolve(global.project.as_deref(), global.config.as_deref())?;
        let token = resolve_access_token(global.token.as_deref());
        debug!("Access token present: {}", token.is_some());

        Ok(Self {
            client_options: ClientOptions::from_network(&runtime.network, token),
            runtime,
            project,
            interactive: !global.non_interactive && std::io::stdin().is_terminal(),
            json: global.json,
        })
    }

    pub fn origins(&self) -> &ApiOrigins {
        &self.runtime.origins
    }

    pub fn project_id(&self) -> Result<&str> {
        Ok(self.project.need_project_id()?)
    }

    pub fn require_auth(&self) -> Result<()> {
        require_auth(self.client_options.access_token.as_deref())?;
        Ok(())
    }

    pub fn experiment(&self, name: &str) -> bool {
        experiments::is_enabled(&self.runtime, name)
    }

    /// Fail when the CLI is older than what `ext dev` commands require
    pub fn check_ext_dev_version(&self) -> Result<()> {
        check_min_required_version(
            self.runtime.extensions.dev_min_version.as_deref(),
            CLI_VERSION,
        )?;
        Ok(())
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions::default().with_master_timeout(Duration::from_secs(
            self.runtime.network.operation_timeout_secs,
        ))
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// A non-interactive session with every API routed to `base`
    pub fn session(base: &str, project_id: &str) -> Session {
        let runtime = RuntimeConfig {
            origins: ApiOrigins::all(base),
            ..RuntimeConfig::default()
        };
        Session {
            client_options: ClientOptions {
                access_token: Some("test-token".to_string()),
                ..ClientOptions::default()
            },
            runtime,
            project: ProjectContext::for_project(project_id),
            interactive: false,
            json: false,
        }
    }
}
