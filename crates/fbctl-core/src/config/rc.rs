//! Project rc file (`.firebaserc`): project aliases and deploy targets

use crate::error::{Error, Result};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

/// rc file name, stored next to `firebase.json`
pub const RC_FILE_NAME: &str = ".firebaserc";

/// resource type -> target name -> resources
type TargetMap = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Parsed `.firebaserc`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectRc {
    /// alias -> project id
    #[serde(default)]
    pub projects: BTreeMap<String, String>,

    /// project id -> resource type -> target name -> resources
    #[serde(default)]
    pub targets: BTreeMap<String, TargetMap>,
}

impl ProjectRc {
    /// Load the rc file from a project directory; a missing file is empty
    pub fn load(project_dir: &Utf8Path) -> Result<Self> {
        let path = project_dir.join(RC_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }

    /// Project behind the `default` alias
    pub fn default_project(&self) -> Option<&str> {
        self.projects.get("default").map(String::as_str)
    }

    /// Resolve an alias to a project id; unknown aliases are taken literally
    pub fn resolve_alias<'a>(&'a self, alias: &'a str) -> &'a str {
        self.projects.get(alias).map(String::as_str).unwrap_or(alias)
    }

    /// Resources bound to a deploy target, empty when unconfigured
    pub fn target(&self, project: &str, kind: &str, name: &str) -> Vec<String> {
        self.targets
            .get(project)
            .and_then(|kinds| kinds.get(kind))
            .and_then(|names| names.get(name))
            .cloned()
            .unwrap_or_default()
    }

    /// Fail unless the deploy target is configured for the project
    pub fn require_target(&self, project: &str, kind: &str, name: &str) -> Result<()> {
        if self.target(project, kind, name).is_empty() {
            return Err(Error::target_not_configured(project, kind, name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn sample() -> ProjectRc {
        serde_json::from_str(
            r#"{
              "projects": {"default": "my-proj", "staging": "my-proj-staging"},
              "targets": {
                "my-proj": {
                  "storage": {"main": ["bucket-a", "bucket-b"], "empty": []}
                }
              }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_aliases() {
        let rc = sample();
        assert_eq!(rc.default_project(), Some("my-proj"));
        assert_eq!(rc.resolve_alias("staging"), "my-proj-staging");
        assert_eq!(rc.resolve_alias("literal-id"), "literal-id");
    }

    #[test]
    fn test_targets() {
        let rc = sample();
        assert_eq!(
            rc.target("my-proj", "storage", "main"),
            vec!["bucket-a".to_string(), "bucket-b".to_string()]
        );
        assert!(rc.target("my-proj", "hosting", "main").is_empty());
        assert!(rc.require_target("my-proj", "storage", "main").is_ok());
        assert!(matches!(
            rc.require_target("my-proj", "storage", "empty"),
            Err(Error::TargetNotConfigured { .. })
        ));
    }

    #[test]
    fn test_load_missing_is_empty() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let rc = ProjectRc::load(&dir).unwrap();
        assert!(rc.default_project().is_none());
    }

    #[test]
    fn test_load_from_disk() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        fs::write(dir.join(RC_FILE_NAME), r#"{"projects": {"default": "p1"}}"#).unwrap();
        assert_eq!(ProjectRc::load(&dir).unwrap().default_project(), Some("p1"));
    }
}
