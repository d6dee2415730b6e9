//! Per-invocation project context: active project, project config and rc

use crate::config::{ProjectConfig, ProjectRc};
use crate::error::{Error, Result};
use camino::Utf8Path;
use std::env;
use tracing::debug;

/// Environment variables consulted for the active project, in order
const PROJECT_ENV_VARS: &[&str] = &["FBCTL_PROJECT", "GCLOUD_PROJECT"];

/// Project-scoped state shared by commands
#[derive(Debug, Clone, Default)]
pub struct ProjectContext {
    /// Resolved project id (aliases already expanded)
    pub project_id: Option<String>,

    /// `firebase.json`, when one was found
    pub config: Option<ProjectConfig>,

    /// `.firebaserc` (empty when absent)
    pub rc: ProjectRc,
}

impl ProjectContext {
    /// Resolve the context from CLI flags, environment and the working tree
    ///
    /// A missing `firebase.json` is not an error here; commands that need
    /// one call [`ProjectContext::need_config`].
    pub fn resolve(project_flag: Option<&str>, config_path: Option<&Utf8Path>) -> Result<Self> {
        let config = match ProjectConfig::load(config_path) {
            Ok(config) => Some(config),
            Err(Error::ConfigNotFound { .. }) if config_path.is_none() => None,
            Err(e) => return Err(e),
        };

        let rc = match &config {
            Some(c) => ProjectRc::load(c.project_dir())?,
            None => ProjectRc::default(),
        };

        let requested = project_flag
            .map(str::to_string)
            .or_else(|| {
                PROJECT_ENV_VARS
                    .iter()
                    .find_map(|var| env::var(var).ok().filter(|v| !v.is_empty()))
            })
            .or_else(|| rc.default_project().map(str::to_string));

        let project_id = requested.map(|p| rc.resolve_alias(&p).to_string());
        debug!("Active project: {:?}", project_id);

        Ok(Self {
            project_id,
            config,
            rc,
        })
    }

    /// Build a context for an explicit project without touching disk
    pub fn for_project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            ..Self::default()
        }
    }

    /// The active project id, or an error explaining how to set one
    pub fn need_project_id(&self) -> Result<&str> {
        self.project_id.as_deref().ok_or(Error::NoActiveProject)
    }

    /// The loaded `firebase.json`, or an error when none was found
    pub fn need_config(&self) -> Result<&ProjectConfig> {
        self.config.as_ref().ok_or_else(|| {
            Error::config_not_found(format!(
                "{} (searched current and parent directories)",
                crate::config::CONFIG_FILE_NAME
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn project_dir() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        fs::write(dir.join("firebase.json"), "{}").unwrap();
        fs::write(
            dir.join(".firebaserc"),
            r#"{"projects": {"default": "rc-default", "prod": "rc-prod"}}"#,
        )
        .unwrap();
        (temp, dir)
    }

    fn clear_env() {
        for var in PROJECT_ENV_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_flag_alias_is_resolved() {
        clear_env();
        let (_temp, dir) = project_dir();
        let ctx = ProjectContext::resolve(Some("prod"), Some(&dir.join("firebase.json"))).unwrap();
        assert_eq!(ctx.need_project_id().unwrap(), "rc-prod");
        assert!(ctx.need_config().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_beats_rc_default() {
        clear_env();
        let (_temp, dir) = project_dir();
        env::set_var("GCLOUD_PROJECT", "from-env");
        let ctx = ProjectContext::resolve(None, Some(&dir.join("firebase.json"))).unwrap();
        clear_env();
        assert_eq!(ctx.need_project_id().unwrap(), "from-env");
    }

    #[test]
    #[serial]
    fn test_rc_default_used_last() {
        clear_env();
        let (_temp, dir) = project_dir();
        let ctx = ProjectContext::resolve(None, Some(&dir.join("firebase.json"))).unwrap();
        assert_eq!(ctx.need_project_id().unwrap(), "rc-default");
    }

    #[test]
    fn test_missing_project_errors() {
        let ctx = ProjectContext::default();
        assert!(matches!(ctx.need_project_id(), Err(Error::NoActiveProject)));
        assert!(ctx.need_config().is_err());
    }

    #[test]
    fn test_explicit_missing_config_path_errors() {
        let result = ProjectContext::resolve(
            Some("p"),
            Some(Utf8Path::new("/nope/firebase.json")),
        );
        assert!(matches!(result, Err(Error::ConfigNotFound { .. })));
    }
}
