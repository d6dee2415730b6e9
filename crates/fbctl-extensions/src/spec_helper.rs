//! Reading and interpreting a local `extension.yaml`

use crate::error::{ExtensionsError, Result};
use crate::params::substitute_params;
use crate::types::{ExtensionSpec, ParamType, Resource};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::sync::LazyLock;
use tracing::debug;

pub const SPEC_FILE: &str = "extension.yaml";
pub const POSTINSTALL_FILE: &str = "POSTINSTALL.md";

/// Runtime assumed when no function declares one
pub const DEFAULT_RUNTIME: &str = "nodejs14";

const VALID_LICENSES: &[&str] = &["apache-2.0"];

static NODE_RUNTIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(nodejs)?([0-9]+)").expect("runtime regex is valid"));

/// Contents of a file plus the directory it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub source: String,
    pub source_directory: Utf8PathBuf,
}

/// Read `file` from `directory`, distinguishing missing from unreadable
pub fn read_file_from_directory(directory: &Utf8Path, file: &str) -> Result<SourceFile> {
    match fs::read_to_string(directory.join(file)) {
        Ok(source) => Ok(SourceFile {
            source,
            source_directory: directory.to_owned(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ExtensionsError::FileNotFound {
            file: file.to_string(),
            dir: directory.to_string(),
        }),
        Err(source) => Err(ExtensionsError::ReadFailed {
            file: file.to_string(),
            dir: directory.to_string(),
            source,
        }),
    }
}

/// Parse the `extension.yaml` in `directory`
pub fn read_extension_yaml(directory: &Utf8Path) -> Result<ExtensionSpec> {
    let file = read_file_from_directory(directory, SPEC_FILE)?;
    serde_yaml_ng::from_str(&file.source).map_err(|e| ExtensionsError::Yaml(e.to_string()))
}

pub fn read_postinstall(directory: &Utf8Path) -> Result<String> {
    Ok(read_file_from_directory(directory, POSTINSTALL_FILE)?.source)
}

/// Walk up from `start` to the directory holding `extension.yaml`
pub fn find_extension_yaml(start: &Utf8Path) -> Result<Utf8PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(SPEC_FILE).exists() {
            debug!("Found {} in {}", SPEC_FILE, dir);
            return Ok(dir.to_owned());
        }
        current = dir.parent();
    }
    Err(ExtensionsError::validation(
        "Couldn't find an extension.yaml file. Check that you are in the root directory of your extension.",
    ))
}

/// Check the structural rules publishers must follow
pub fn validate_spec(spec: &ExtensionSpec) -> Result<()> {
    let mut errors = Vec::new();

    if spec.name.is_empty() {
        errors.push("extension.yaml is missing required field: name".to_string());
    }
    if spec.spec_version.is_none() {
        errors.push("extension.yaml is missing required field: specVersion".to_string());
    }
    match spec.version.as_deref() {
        None => errors.push("extension.yaml is missing required field: version".to_string()),
        Some(v) => match semver::Version::parse(v) {
            Err(_) => errors.push(format!(
                "version {} in extension.yaml is not a valid semver",
                v
            )),
            Ok(parsed) if !parsed.pre.is_empty() || !parsed.build.is_empty() => errors.push(
                "version field in extension.yaml does not support pre-release annotations; instead, set a pre-release stage using the --stage flag."
                    .to_string(),
            ),
            Ok(_) => {}
        },
    }
    match spec.license.as_deref() {
        None => errors.push("extension.yaml is missing required field: license".to_string()),
        Some(l) if !VALID_LICENSES.contains(&l.to_lowercase().as_str()) => errors.push(format!(
            "license field in extension.yaml is invalid. Valid value(s): {}",
            VALID_LICENSES.join(", ")
        )),
        Some(_) => {}
    }

    if spec.resources.is_empty() {
        errors.push("Resources field must contain at least one resource".to_string());
    }
    for resource in &spec.resources {
        if resource.name.is_empty() {
            errors.push("Resource is missing required field: name".to_string());
        }
        if resource.resource_type.is_empty() {
            errors.push(format!(
                "Resource {} is missing required field: type",
                resource.name
            ));
        }
    }
    for api in &spec.apis {
        if api.api_name.is_empty() {
            errors.push("API is missing required field: apiName".to_string());
        }
    }
    for role in &spec.roles {
        if role.role.is_empty() {
            errors.push("Role is missing required field: role".to_string());
        }
    }
    for param in &spec.params {
        let name = &param.param;
        if name.is_empty() {
            errors.push("Param is missing required field: param".to_string());
        }
        if param.label.is_empty() {
            errors.push(format!("Param {} is missing required field: label", name));
        }
        match param.param_type {
            None | Some(ParamType::String) if !param.options.is_empty() => errors.push(format!(
                "Param {} cannot have options because it is type STRING",
                name
            )),
            Some(t @ (ParamType::Select | ParamType::MultiSelect)) => {
                let type_name = if t == ParamType::Select {
                    "SELECT"
                } else {
                    "MULTISELECT"
                };
                if param.validation_regex.is_some() {
                    errors.push(format!(
                        "Param {} cannot have validationRegex because it is type {}",
                        name, type_name
                    ));
                }
                if param.options.is_empty() {
                    errors.push(format!(
                        "Param {} requires options because it is type {}",
                        name, type_name
                    ));
                }
            }
            _ => {}
        }
    }

    if errors.is_empty() {
        return Ok(());
    }
    let formatted: Vec<String> = errors.iter().map(|e| format!("  - {}", e)).collect();
    Err(ExtensionsError::validation(format!(
        "The extension.yaml has the following errors: \n{}",
        formatted.join("\n")
    )))
}

/// Function resources of the extension with `${PARAM}` references filled in
pub fn get_function_resources_with_param_substitution(
    spec: &ExtensionSpec,
    params: &BTreeMap<String, String>,
) -> Result<Vec<Resource>> {
    let raw: Vec<Resource> = spec
        .resources
        .iter()
        .filter(|r| r.is_function())
        .cloned()
        .collect();
    substitute_params(&raw, params)
}

/// The `properties` block of each resource
pub fn get_function_properties(resources: &[Resource]) -> Vec<Option<&Value>> {
    resources.iter().map(|r| r.properties.as_ref()).collect()
}

/// Single Node runtime able to run every function
///
/// Missing runtimes count as [`DEFAULT_RUNTIME`]; the lexically greatest wins.
pub fn get_runtime(resources: &[Resource]) -> Result<String> {
    if resources.is_empty() {
        return Ok(DEFAULT_RUNTIME.to_string());
    }

    let mut invalid = Vec::new();
    let mut runtimes: Vec<String> = resources
        .iter()
        .map(|r| match r.runtime() {
            None => DEFAULT_RUNTIME.to_string(),
            Some(rt) if !NODE_RUNTIME.is_match(rt) => {
                invalid.push(rt.to_string());
                DEFAULT_RUNTIME.to_string()
            }
            Some(rt) => rt.to_string(),
        })
        .collect();

    if !invalid.is_empty() {
        return Err(ExtensionsError::UnsupportedRuntimes(invalid));
    }
    runtimes.sort();
    Ok(runtimes.pop().unwrap_or_else(|| DEFAULT_RUNTIME.to_string()))
}
