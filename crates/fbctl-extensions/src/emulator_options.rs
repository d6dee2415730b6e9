//! Emulator settings derived from a local extension directory

use crate::error::{ExtensionsError, Result};
use crate::params::{
    populate_default_params, read_env_file, substitute_params, validate_command_line_params,
};
use crate::spec_helper::{
    find_extension_yaml, get_function_resources_with_param_substitution, get_runtime,
    read_extension_yaml, validate_spec,
};
use crate::triggers::function_resource_to_trigger;
use crate::types::{ExtensionSpec, Param, Resource};
use camino::{Utf8Path, Utf8PathBuf};
use fbctl_api::functions::SecretEnvVar;
use fbctl_core::ProjectConfig;
use fbctl_emulator::EmulatedTrigger;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use tracing::{debug, warn};

const DEFAULT_SOURCE_DIRECTORY: &str = "functions";

/// Inputs of `ext dev emulators` style runs
#[derive(Debug, Clone)]
pub struct EmulatorOptionsArgs<'a> {
    /// Directory to start searching for `extension.yaml`
    pub cwd: &'a Utf8Path,
    pub project_id: &'a str,
    /// `--test-params` env file
    pub test_params: &'a Utf8Path,
    /// `--test-config` firebase.json
    pub test_config: Option<&'a Utf8Path>,
}

/// Everything the emulators need to run a local extension
#[derive(Debug, Clone)]
pub struct ExtensionEmulatorOptions {
    pub ext_dev_dir: Utf8PathBuf,
    pub spec: ExtensionSpec,
    pub config: ProjectConfig,
    pub env: BTreeMap<String, String>,
    pub triggers: Vec<EmulatedTrigger>,
    pub runtime: String,
}

/// Functions, env and secrets of one installed instance
#[derive(Debug, Clone)]
pub struct ExtensionFunctionInfo {
    pub extension_triggers: Vec<EmulatedTrigger>,
    pub runtime: String,
    pub non_secret_env: BTreeMap<String, String>,
    pub secret_env_variables: Vec<SecretEnvVar>,
}

pub fn build_options(args: &EmulatorOptionsArgs<'_>) -> Result<ExtensionEmulatorOptions> {
    let ext_dev_dir = find_extension_yaml(args.cwd)?;
    let spec = read_extension_yaml(&ext_dev_dir)?;
    validate_spec(&spec)?;

    let params = get_params(args.project_id, &spec, args.test_params)?;
    validate_command_line_params(&params, &spec.params)?;
    let resources = get_function_resources_with_param_substitution(&spec, &params)?;

    let test_config = match args.test_config {
        Some(path) => {
            let config = read_test_config(path)?;
            check_test_config(&config, &resources);
            Some(config)
        }
        None => None,
    };
    let config = build_config(&resources, test_config, &ext_dev_dir)?;

    let triggers = resources
        .iter()
        .map(|r| function_resource_to_trigger(r, &BTreeMap::new()))
        .collect::<Result<Vec<_>>>()?;
    let runtime = get_runtime(&resources)?;
    debug!(
        "Emulating {} functions from {} with runtime {}",
        triggers.len(),
        ext_dev_dir,
        runtime
    );

    Ok(ExtensionEmulatorOptions {
        ext_dev_dir,
        spec,
        config,
        env: params,
        triggers,
        runtime,
    })
}

/// Values the CLI supplies without asking
pub fn auto_params(project_id: &str, instance_id: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("PROJECT_ID".to_string(), project_id.to_string()),
        ("EXT_INSTANCE_ID".to_string(), instance_id.to_string()),
        ("DATABASE_INSTANCE".to_string(), project_id.to_string()),
        (
            "DATABASE_URL".to_string(),
            format!("https://{}.firebaseio.com", project_id),
        ),
        (
            "STORAGE_BUCKET".to_string(),
            format!("{}.appspot.com", project_id),
        ),
    ])
}

/// Auto params, overridden by the test params file, then defaults, then self-substituted
pub fn get_params(
    project_id: &str,
    spec: &ExtensionSpec,
    test_params: &Utf8Path,
) -> Result<BTreeMap<String, String>> {
    let mut values = auto_params(project_id, &spec.name);
    values.extend(read_env_file(test_params)?);
    let values = populate_default_params(values, &spec.params)?;
    substitute_params(&values, &values)
}

pub fn read_test_config(path: &Utf8Path) -> Result<Value> {
    fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
        .map_err(|e| {
            ExtensionsError::validation(format!("Error reading --test-config file: {}\n", e))
        })
}

/// Warn about services the extension uses that the test config leaves out
pub fn check_test_config(test_config: &Value, resources: &[Resource]) -> Vec<String> {
    let has = |key: &str| test_config.get(key).is_some_and(|v| !v.is_null());
    let mut warnings = Vec::new();
    let mut missing = |product: &str, key: &str| {
        warnings.push(format!(
            "This extension {}, but 'firebase.json' provided by --test-config is missing a top-level '{}' object. {} will not be emulated.",
            product_usage(product),
            key,
            product
        ));
    };

    if !has("functions") && should_emulate_functions(resources) {
        missing("Functions", "functions");
    }
    if !has("firestore") && should_emulate_firestore(resources) {
        missing("Cloud Firestore", "firestore");
    }
    if !has("database") && should_emulate_database(resources) {
        missing("Realtime Database", "database");
    }
    if !has("storage") && should_emulate_storage(resources) {
        missing("Cloud Storage", "storage");
    }
    for warning in &warnings {
        warn!("{}", warning);
    }
    warnings
}

fn product_usage(product: &str) -> String {
    if product == "Functions" {
        "uses functions".to_string()
    } else {
        format!("interacts with {}", product)
    }
}

/// Emulator configuration: the test config, or one enabling every service in use
pub fn build_config(
    resources: &[Resource],
    test_config: Option<Value>,
    project_dir: &Utf8Path,
) -> Result<ProjectConfig> {
    let explicit = test_config.is_some();
    let mut config =
        ProjectConfig::from_value(test_config.unwrap_or_else(|| json!({})), project_dir);

    if !explicit {
        let services = [
            ("functions", should_emulate_functions(resources)),
            ("firestore", should_emulate_firestore(resources)),
            ("database", should_emulate_database(resources)),
            ("pubsub", should_emulate_pubsub(resources)),
            ("storage", should_emulate_storage(resources)),
        ];
        for (key, enabled) in services {
            if enabled {
                config.set(key, json!({}));
            }
        }
    }

    if config.get("functions").is_some_and(|v| !v.is_null()) {
        let source = get_function_source_directory(resources)?;
        config.set("functions.source", Value::String(source));
    }
    Ok(config)
}

/// The one `sourceDirectory` shared by all functions
pub fn get_function_source_directory(resources: &[Resource]) -> Result<String> {
    let mut source: Option<&str> = None;
    for r in resources {
        let dir = r
            .property("sourceDirectory")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_SOURCE_DIRECTORY);
        match source {
            None => source = Some(dir),
            Some(existing) if existing != dir => {
                return Err(ExtensionsError::validation(format!(
                    "Found function resources with different sourceDirectories: '{}' and '{}'. The extensions emulator only supports a single sourceDirectory.",
                    existing, dir
                )))
            }
            Some(_) => {}
        }
    }
    Ok(source.unwrap_or(DEFAULT_SOURCE_DIRECTORY).to_string())
}

pub fn should_emulate_functions(resources: &[Resource]) -> bool {
    !resources.is_empty()
}

fn should_emulate(service: &str, resources: &[Resource]) -> bool {
    resources.iter().any(|r| {
        r.property("eventTrigger")
            .and_then(|e| e.get("eventType"))
            .and_then(Value::as_str)
            .is_some_and(|t| t.contains(service))
    })
}

pub fn should_emulate_firestore(resources: &[Resource]) -> bool {
    should_emulate("cloud.firestore", resources)
}

pub fn should_emulate_database(resources: &[Resource]) -> bool {
    should_emulate("google.firebase.database", resources)
}

pub fn should_emulate_pubsub(resources: &[Resource]) -> bool {
    should_emulate("google.pubsub", resources)
}

pub fn should_emulate_storage(resources: &[Resource]) -> bool {
    should_emulate("google.storage", resources)
}

/// Param values minus the secret ones
pub fn get_non_secret_env(
    params: &[Param],
    values: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut env = values.clone();
    for p in params.iter().filter(|p| p.is_secret()) {
        env.remove(&p.param);
    }
    env
}

/// Secret params as function secret bindings
///
/// Values look like `projects/{p}/secrets/{s}/versions/{v}`.
pub fn get_secret_env_vars(
    params: &[Param],
    values: &BTreeMap<String, String>,
) -> Vec<SecretEnvVar> {
    params
        .iter()
        .filter(|p| p.is_secret())
        .filter_map(|p| {
            let value = values.get(&p.param).filter(|v| !v.is_empty())?;
            let parts: Vec<&str> = value.split('/').collect();
            Some(SecretEnvVar {
                key: p.param.clone(),
                project_id: parts.get(1).copied().unwrap_or_default().to_string(),
                secret: parts.get(3).copied().unwrap_or_default().to_string(),
                version: parts.get(5).map(|v| v.to_string()),
            })
        })
        .collect()
}

/// Triggers, runtime and env of an installed instance
///
/// Function names are prefixed `ext-{instance}-` to keep instances apart.
pub fn get_extension_function_info(
    instance_id: &str,
    spec: &ExtensionSpec,
    system_params: &BTreeMap<String, String>,
    values: &BTreeMap<String, String>,
) -> Result<ExtensionFunctionInfo> {
    let resources = get_function_resources_with_param_substitution(spec, values)?;
    let extension_triggers = resources
        .iter()
        .map(|r| {
            let mut trigger = function_resource_to_trigger(r, system_params)?;
            trigger.name = format!("ext-{}-{}", instance_id, trigger.name);
            Ok(trigger)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ExtensionFunctionInfo {
        extension_triggers,
        runtime: get_runtime(&resources)?,
        non_secret_env: get_non_secret_env(&spec.params, values),
        secret_env_variables: get_secret_env_vars(&spec.params, values),
    })
}
