//! Resolution of the rules file(s) the Storage emulator starts with

use crate::error::{EmulatorError, Result};
use crate::is_demo_project;
use camino::Utf8PathBuf;
use fbctl_core::{ProjectConfig, ProjectRc};
use rust_embed::RustEmbed;
use serde::Deserialize;
use std::fs;
use tracing::info;

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/templates/"]
#[prefix = ""]
struct EmbeddedTemplates;

const DEFAULT_RULES_TEMPLATE: &str = "default_storage.rules";

/// A rules file and its content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

/// Rules for one bucket of a deploy target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRules {
    pub resource: String,
    pub rules: SourceFile,
}

/// A single rules file, or per-bucket rules from a target list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageRulesConfig {
    Single(SourceFile),
    PerResource(Vec<ResourceRules>),
}

#[derive(Debug, Deserialize)]
struct TargetConfig {
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    rules: Option<String>,
}

fn read_source_file(config: &ProjectConfig, rules: &str) -> Result<SourceFile> {
    let path: Utf8PathBuf = config.path(rules);
    let content = fs::read_to_string(&path).map_err(|source| EmulatorError::ReadRules {
        path: path.to_string(),
        source,
    })?;
    Ok(SourceFile {
        name: path.into_string(),
        content,
    })
}

fn default_rules() -> Result<SourceFile> {
    let file = EmbeddedTemplates::get(DEFAULT_RULES_TEMPLATE)
        .ok_or_else(|| EmulatorError::TemplateNotFound(DEFAULT_RULES_TEMPLATE.to_string()))?;
    Ok(SourceFile {
        name: DEFAULT_RULES_TEMPLATE.to_string(),
        content: String::from_utf8_lossy(&file.data).into_owned(),
    })
}

/// Work out which rules the Storage emulator should load
///
/// Demo projects without a `storage` section get open default rules.
pub fn get_storage_rules_config(
    project_id: &str,
    config: &ProjectConfig,
    rc: &ProjectRc,
) -> Result<StorageRulesConfig> {
    let storage = match config.get("storage") {
        Some(value) if !value.is_null() => value,
        _ => {
            if is_demo_project(project_id) {
                info!(
                    "storage: Detected demo project ID \"{}\", using a default (open) rules configuration.",
                    project_id
                );
                return Ok(StorageRulesConfig::Single(default_rules()?));
            }
            return Err(EmulatorError::MissingStorageRules);
        }
    };

    if !storage.is_array() {
        let rules = storage
            .get("rules")
            .and_then(|r| r.as_str())
            .filter(|r| !r.is_empty())
            .ok_or(EmulatorError::MissingStorageRules)?;
        return Ok(StorageRulesConfig::Single(read_source_file(config, rules)?));
    }

    let targets: Vec<TargetConfig> = serde_json::from_value(storage.clone())
        .map_err(|e| EmulatorError::invalid(format!("Invalid Storage configuration: {}", e)))?;

    let mut results = Vec::new();
    for target_config in targets {
        let target = target_config
            .target
            .filter(|t| !t.is_empty())
            .ok_or(EmulatorError::MissingStorageTarget)?;
        rc.require_target(project_id, "storage", &target)?;
        let rules = target_config.rules.unwrap_or_default();
        for resource in rc.target(project_id, "storage", &target) {
            results.push(ResourceRules {
                resource,
                rules: read_source_file(config, &rules)?,
            });
        }
    }
    Ok(StorageRulesConfig::PerResource(results))
}
