//! Emulator helpers

use anyhow::Result;
use fbctl_emulator::{get_storage_rules_config, StorageRulesConfig};

use crate::cli::EmulatorsCommands;
use crate::output;
use crate::session::Session;

pub fn run(command: EmulatorsCommands, session: &Session) -> Result<()> {
    match command {
        EmulatorsCommands::StorageRules => {
            let rules = storage_rules(session)?;
            print_rules(&rules);
            Ok(())
        }
    }
}

fn storage_rules(session: &Session) -> Result<StorageRulesConfig> {
    let project_id = session.project_id()?;
    let config = session.project.need_config()?;
    Ok(get_storage_rules_config(project_id, config, &session.project.rc)?)
}

fn print_rules(rules: &StorageRulesConfig) {
    match rules {
        StorageRulesConfig::Single(file) => {
            output::labeled_bullet("storage", &format!("Rules for all buckets: {}", file.name));
        }
        StorageRulesConfig::PerResource(entries) => {
            for entry in entries {
                output::labeled_bullet(
                    "storage",
                    &format!("Rules for bucket {}: {}", entry.resource, entry.rules.name),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::session;
    use fbctl_core::ProjectConfig;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_single_rules_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("storage.rules"), "rules_version = '2';").unwrap();
        let project_dir = camino::Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        let mut s = session("http://127.0.0.1:9", "my-project");
        s.project.config = Some(ProjectConfig::from_value(
            json!({ "storage": { "rules": "storage.rules" } }),
            project_dir,
        ));

        match storage_rules(&s).unwrap() {
            StorageRulesConfig::Single(file) => {
                assert!(file.name.ends_with("storage.rules"));
                assert_eq!(file.content, "rules_version = '2';");
            }
            other => panic!("unexpected rules: {:?}", other),
        }
    }

    #[test]
    fn test_demo_project_without_storage_config() {
        let dir = TempDir::new().unwrap();
        let project_dir = camino::Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let mut s = session("http://127.0.0.1:9", "demo-app");
        s.project.config = Some(ProjectConfig::from_value(json!({}), project_dir));

        assert!(matches!(
            storage_rules(&s).unwrap(),
            StorageRulesConfig::Single(_)
        ));
    }
}
