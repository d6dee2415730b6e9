//! Project configuration (`firebase.json`) loading and access

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use std::fs;
use tracing::debug;

/// Configuration file name searched for in the working tree
pub const CONFIG_FILE_NAME: &str = "firebase.json";

/// Loaded project configuration
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// The parsed configuration document
    data: Value,

    /// Directory containing the configuration file
    project_dir: Utf8PathBuf,
}

impl ProjectConfig {
    /// Load configuration from the specified path or search for it
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_owned(),
            None => {
                let cwd = std::env::current_dir()?;
                let cwd = Utf8PathBuf::try_from(cwd).map_err(|_| {
                    Error::invalid_config("Current directory path is not valid UTF-8")
                })?;
                Self::find(&cwd).ok_or_else(|| {
                    Error::config_not_found(format!(
                        "{} (searched current and parent directories)",
                        CONFIG_FILE_NAME
                    ))
                })?
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(config_path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        let data: Value = serde_json::from_str(&content)?;
        if !data.is_object() {
            return Err(Error::invalid_config(format!(
                "{} must contain a JSON object",
                config_path
            )));
        }

        let project_dir = config_path
            .parent()
            .map(|p| p.to_owned())
            .unwrap_or_else(|| Utf8PathBuf::from("."));

        debug!("Loaded project config from {}", config_path);
        Ok(Self { data, project_dir })
    }

    /// Build a configuration from an in-memory document
    pub fn from_value(data: Value, project_dir: impl Into<Utf8PathBuf>) -> Self {
        let data = if data.is_object() {
            data
        } else {
            Value::Object(Map::new())
        };
        Self {
            data,
            project_dir: project_dir.into(),
        }
    }

    /// Find the configuration file in `start` or any parent directory
    pub fn find(start: &Utf8Path) -> Option<Utf8PathBuf> {
        let mut current = Some(start);
        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                return Some(candidate);
            }
            current = dir.parent();
        }
        None
    }

    /// The full configuration document
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Directory containing `firebase.json`
    pub fn project_dir(&self) -> &Utf8Path {
        &self.project_dir
    }

    /// Look up a value by dotted path (e.g. `functions.source`)
    pub fn get(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.data, |node, part| node.get(part))
    }

    /// Set a value by dotted path, creating intermediate objects
    pub fn set(&mut self, key: &str, value: Value) {
        let parts: Vec<&str> = key.split('.').collect();
        let mut node = &mut self.data;
        for part in &parts[..parts.len() - 1] {
            if !node.get(*part).is_some_and(Value::is_object) {
                node[*part] = Value::Object(Map::new());
            }
            node = &mut node[*part];
        }
        node[parts[parts.len() - 1]] = value;
    }

    /// Resolve a path relative to the project directory
    pub fn path(&self, relative: impl AsRef<Utf8Path>) -> Utf8PathBuf {
        let relative = relative.as_ref();
        if relative.is_absolute() {
            relative.to_owned()
        } else {
            self.project_dir.join(relative)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_get_and_set_dotted_paths() {
        let mut config = ProjectConfig::from_value(json!({"hosting": {"public": "dist"}}), "/p");

        assert_eq!(config.get("hosting.public"), Some(&json!("dist")));
        assert!(config.get("functions.source").is_none());

        config.set("functions.source", json!("functions"));
        assert_eq!(config.get("functions.source"), Some(&json!("functions")));

        config.set("storage", json!({}));
        assert_eq!(config.get("storage"), Some(&json!({})));
    }

    #[test]
    fn test_set_replaces_non_object_intermediate() {
        let mut config = ProjectConfig::from_value(json!({"functions": true}), "/p");
        config.set("functions.source", json!("src"));
        assert_eq!(config.get("functions"), Some(&json!({"source": "src"})));
    }

    #[test]
    fn test_path_resolves_against_project_dir() {
        let config = ProjectConfig::from_value(json!({}), "/work/app");
        assert_eq!(config.path("public"), Utf8PathBuf::from("/work/app/public"));
        assert_eq!(config.path("/abs/rules"), Utf8PathBuf::from("/abs/rules"));
    }

    #[test]
    fn test_load_and_find_from_nested_dir() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        fs::write(root.join(CONFIG_FILE_NAME), r#"{"hosting": {"public": "www"}}"#).unwrap();
        let nested = root.join("a/b");
        fs::create_dir_all(&nested).unwrap();

        let found = ProjectConfig::find(&nested).unwrap();
        assert_eq!(found, root.join(CONFIG_FILE_NAME));

        let config = ProjectConfig::load(Some(&found)).unwrap();
        assert_eq!(config.project_dir(), root);
        assert_eq!(config.get("hosting.public"), Some(&json!("www")));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ProjectConfig::load(Some(Utf8Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_rejects_non_object() {
        let temp = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join(CONFIG_FILE_NAME)).unwrap();
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            ProjectConfig::load(Some(&path)),
            Err(Error::InvalidConfig { .. })
        ));
    }
}
