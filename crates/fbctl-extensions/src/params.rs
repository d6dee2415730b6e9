//! Param values: substitution, defaults, validation, prompting and env files

use crate::error::{ExtensionsError, Result};
use crate::types::{ExtensionInstance, ExtensionSpec, Param, ParamBindingOptions, ParamType};
use camino::Utf8Path;
use fbctl_api::projects::FirebaseProject;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::sync::LazyLock;
use tracing::{debug, warn};

pub const NONINTERACTIVE_ERROR_MESSAGE: &str = "As of fbctl 0.4, `ext install`, `ext update` and `ext configure` are interactive only commands. \
To deploy an extension noninteractively, use an extensions manifest and `fbctl deploy --only extensions`.  \
See https://firebase.google.com/docs/extensions/manifest for more details";

/// Params the CLI fills in itself; never reported as unknown
pub const AUTO_PARAMS: &[&str] = &[
    "PROJECT_ID",
    "PROJECT_NUMBER",
    "EXT_INSTANCE_ID",
    "DATABASE_INSTANCE",
    "DATABASE_URL",
    "STORAGE_BUCKET",
];

static SYSTEM_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^firebaseextensions\.[a-zA-Z0-9.]*/").expect("system param regex is valid")
});

static ENV_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("env key regex is valid"));

/// Asks the user for a single param value
pub trait ParamPrompter {
    fn ask_for_param(
        &self,
        project_id: &str,
        instance_id: &str,
        param: &Param,
        reconfiguring: bool,
    ) -> Result<ParamBindingOptions>;

    /// Informational line shown before or between prompts
    fn note(&self, _message: &str) {}
}

/// Replace `${NAME}` and `${param:NAME}` in every string of `original`
pub fn substitute_params<T>(original: &T, params: &BTreeMap<String, String>) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut value = serde_json::to_value(original)?;
    substitute_value(&mut value, params);
    Ok(serde_json::from_value(value)?)
}

fn substitute_value(value: &mut Value, params: &BTreeMap<String, String>) {
    match value {
        Value::String(s) if s.contains("${") => {
            let mut out = s.clone();
            for (key, val) in params {
                out = out
                    .replace(&format!("${{{}}}", key), val)
                    .replace(&format!("${{param:{}}}", key), val);
            }
            *s = out;
        }
        Value::Array(items) => items.iter_mut().for_each(|v| substitute_value(v, params)),
        Value::Object(map) => map.values_mut().for_each(|v| substitute_value(v, params)),
        _ => {}
    }
}

/// Fill unset params from their defaults; required params without one fail
pub fn populate_default_params(
    mut values: BTreeMap<String, String>,
    specs: &[Param],
) -> Result<BTreeMap<String, String>> {
    for param in specs {
        let set = values.get(&param.param).is_some_and(|v| !v.is_empty());
        if set {
            continue;
        }
        match &param.default {
            Some(default) => {
                values.insert(param.param.clone(), default.clone());
            }
            None if param.required => {
                return Err(ExtensionsError::validation(format!(
                    "{} has not been set in the given params file and there is no default available. Please set this variable before installing again.",
                    param.param
                )))
            }
            None => {}
        }
    }
    Ok(values)
}

/// Whether a value is acceptable for a param; problems are logged as warnings
pub fn check_response(response: Option<&str>, param: &Param) -> bool {
    let response = response.unwrap_or("");
    if param.required && response.is_empty() {
        warn!(
            "Param {} is required, but no value was provided.",
            param.param
        );
        return false;
    }

    let responses: Vec<&str> = if param.param_type == Some(ParamType::MultiSelect) {
        response.split(',').collect()
    } else {
        vec![response]
    };

    let mut valid = true;
    if let Some(pattern) = param.validation_regex.as_deref().filter(|_| !response.is_empty()) {
        match Regex::new(pattern) {
            Ok(re) => {
                for r in &responses {
                    if (param.required || !r.is_empty()) && !re.is_match(r) {
                        let message = param.validation_error_message.clone().unwrap_or_else(|| {
                            format!(
                                "{} is not a valid value for {} since it does not meet the requirements of the regex validation: \"{}\"",
                                r, param.param, pattern
                            )
                        });
                        warn!("{}", message);
                        valid = false;
                    }
                }
            }
            Err(e) => {
                warn!("Invalid validationRegex for {}: {}", param.param, e);
                valid = false;
            }
        }
    }

    if matches!(
        param.param_type,
        Some(ParamType::Select | ParamType::MultiSelect)
    ) {
        for r in &responses {
            if !r.is_empty() && !param.options.iter().any(|o| o.value == *r) {
                warn!("{} is not a valid option for {}.", r, param.param);
                valid = false;
            }
        }
    }
    valid
}

/// Validate values read from a params file against the declared params
pub fn validate_command_line_params(
    values: &BTreeMap<String, String>,
    specs: &[Param],
) -> Result<()> {
    let misnamed: Vec<&str> = values
        .keys()
        .map(String::as_str)
        .filter(|key| {
            !specs.iter().any(|p| p.param == *key)
                && !AUTO_PARAMS.contains(key)
                && !is_system_param(key)
        })
        .collect();
    if !misnamed.is_empty() {
        warn!(
            "The following params were specified in your env file but do not exist in the extension spec: {}.",
            misnamed.join(", ")
        );
    }

    let mut all_valid = true;
    for param in specs {
        if !check_response(values.get(&param.param).map(String::as_str), param) {
            all_valid = false;
        }
    }
    if !all_valid {
        return Err(ExtensionsError::validation(
            "Some param values are not valid. Please check your params file.",
        ));
    }
    Ok(())
}

/// Params derived from the project itself
pub fn firebase_project_params(project: &FirebaseProject) -> BTreeMap<String, String> {
    let resources = project.resources.clone().unwrap_or_default();
    let id = &project.project_id;
    let instance = resources
        .realtime_database_instance
        .unwrap_or_else(|| id.clone());
    let bucket = resources
        .storage_bucket
        .unwrap_or_else(|| format!("{}.appspot.com", id));

    BTreeMap::from([
        ("PROJECT_ID".to_string(), id.clone()),
        ("PROJECT_NUMBER".to_string(), project.project_number.clone()),
        (
            "DATABASE_URL".to_string(),
            format!("https://{}.firebaseio.com", instance),
        ),
        ("DATABASE_INSTANCE".to_string(), instance),
        ("STORAGE_BUCKET".to_string(), bucket),
    ])
}

pub fn get_base_param_bindings(
    params: &BTreeMap<String, ParamBindingOptions>,
) -> BTreeMap<String, String> {
    params
        .iter()
        .map(|(k, v)| (k.clone(), v.base_value.clone()))
        .collect()
}

pub fn build_binding_options_with_base_value(
    base: &BTreeMap<String, String>,
) -> BTreeMap<String, ParamBindingOptions> {
    base.iter()
        .map(|(k, v)| {
            (
                k.clone(),
                ParamBindingOptions {
                    base_value: v.clone(),
                    local_value: None,
                },
            )
        })
        .collect()
}

/// Override defaults with values keyed by the upper-cased param name
pub fn set_new_defaults(
    mut params: Vec<Param>,
    new_defaults: &BTreeMap<String, String>,
) -> Vec<Param> {
    for param in &mut params {
        if let Some(value) = new_defaults
            .get(&param.param.to_uppercase())
            .filter(|v| !v.is_empty())
        {
            param.default = Some(value.clone());
        }
    }
    params
}

/// The instance's spec params, defaulting to its current values
pub fn get_params_with_current_values_as_defaults(instance: &ExtensionInstance) -> Vec<Param> {
    set_new_defaults(
        instance.config.source.spec.params.clone(),
        &instance.config.params,
    )
}

pub struct GetParamsArgs<'a> {
    pub project_id: &'a str,
    pub instance_id: &'a str,
    pub param_specs: &'a [Param],
    pub firebase_project_params: &'a BTreeMap<String, String>,
    pub non_interactive: bool,
    pub reconfiguring: bool,
}

/// Ask for every param of an extension being installed or reconfigured
pub fn get_params(
    args: &GetParamsArgs<'_>,
    prompter: &dyn ParamPrompter,
) -> Result<BTreeMap<String, ParamBindingOptions>> {
    if args.non_interactive {
        return Err(ExtensionsError::validation(NONINTERACTIVE_ERROR_MESSAGE));
    }

    let specs: Vec<Param> =
        substitute_params(&args.param_specs.to_vec(), args.firebase_project_params)?;
    let mut values = BTreeMap::new();
    for param in &specs {
        let value =
            prompter.ask_for_param(args.project_id, args.instance_id, param, args.reconfiguring)?;
        values.insert(param.param.clone(), value);
    }
    debug!("Collected {} extension params", values.len());
    Ok(values)
}

pub struct UpdateParamsArgs<'a> {
    pub project_id: &'a str,
    pub instance_id: &'a str,
    pub spec: &'a ExtensionSpec,
    pub new_spec: &'a ExtensionSpec,
    pub current_params: &'a BTreeMap<String, String>,
    pub firebase_project_params: &'a BTreeMap<String, String>,
    pub non_interactive: bool,
}

/// Params for updating an instance to a new version
pub fn get_params_for_update(
    args: &UpdateParamsArgs<'_>,
    prompter: &dyn ParamPrompter,
) -> Result<BTreeMap<String, ParamBindingOptions>> {
    if args.non_interactive {
        return Err(ExtensionsError::validation(NONINTERACTIVE_ERROR_MESSAGE));
    }
    prompt_for_new_params(args, prompter)
}

fn param_diff(left: &[Param], right: &[Param]) -> Vec<Param> {
    left.iter()
        .filter(|l| !right.iter().any(|r| r.same_as(l)))
        .cloned()
        .collect()
}

/// Drop params the new version removed and ask for the ones it added
pub fn prompt_for_new_params(
    args: &UpdateParamsArgs<'_>,
    prompter: &dyn ParamPrompter,
) -> Result<BTreeMap<String, ParamBindingOptions>> {
    let mut bindings = build_binding_options_with_base_value(args.current_params);

    let old_params: Vec<Param> = args
        .spec
        .params
        .iter()
        .filter(|p| args.current_params.contains_key(&p.param))
        .cloned()
        .collect();
    let deletions: Vec<Param> = substitute_params(
        &param_diff(&old_params, &args.new_spec.params),
        args.firebase_project_params,
    )?;
    let additions: Vec<Param> = substitute_params(
        &param_diff(&args.new_spec.params, &old_params),
        args.firebase_project_params,
    )?;

    if !deletions.is_empty() {
        prompter.note("The following params will no longer be used:");
        for param in &deletions {
            let current = args
                .current_params
                .get(&param.param)
                .map(String::as_str)
                .unwrap_or_default();
            prompter.note(&format!("- {}: {}", param.param, current));
            bindings.remove(&param.param);
        }
    }

    if !additions.is_empty() {
        prompter.note("To update this instance, configure the following new parameters:");
        for param in &additions {
            let value = prompter.ask_for_param(args.project_id, args.instance_id, param, false)?;
            bindings.insert(param.param.clone(), value);
        }
    }
    Ok(bindings)
}

/// Whether a param name is a reserved system param
pub fn is_system_param(name: &str) -> bool {
    SYSTEM_PARAM.is_match(name)
}

/// Read a dotenv-style params file
pub fn read_env_file(path: &Utf8Path) -> Result<BTreeMap<String, String>> {
    let content = fs::read_to_string(path)?;
    let (envs, errors) = parse_env(content.trim());
    if !errors.is_empty() {
        return Err(ExtensionsError::EnvParse {
            path: path.to_string(),
            lines: errors,
        });
    }
    Ok(envs)
}

/// Parse dotenv content into values plus the lines that could not be parsed
pub fn parse_env(data: &str) -> (BTreeMap<String, String>, Vec<String>) {
    let data = data.replace("\r\n", "\n").replace('\r', "\n");
    let mut envs = BTreeMap::new();
    let mut errors = Vec::new();
    let mut lines = data.lines();

    while let Some(raw) = lines.next() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").map(str::trim_start).unwrap_or(line);
        let Some((key, rest)) = line.split_once('=') else {
            errors.push(line.to_string());
            continue;
        };
        let key = key.trim();
        if !ENV_KEY.is_match(key) {
            errors.push(line.to_string());
            continue;
        }

        let rest = rest.trim_start();
        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'');
        let Some(quote) = quote else {
            let value = rest.split('#').next().unwrap_or_default().trim();
            envs.insert(key.to_string(), value.to_string());
            continue;
        };

        // Quoted values may span lines until the closing quote
        let mut body = rest[1..].to_string();
        let mut closed = find_closing_quote(&body, quote);
        while closed.is_none() {
            match lines.next() {
                Some(next) => {
                    body.push('\n');
                    body.push_str(next);
                    closed = find_closing_quote(&body, quote);
                }
                None => break,
            }
        }
        let Some(end) = closed else {
            errors.push(line.to_string());
            continue;
        };

        let trailing = body[end + 1..].trim();
        if !trailing.is_empty() && !trailing.starts_with('#') {
            errors.push(line.to_string());
            continue;
        }
        let inner = &body[..end];
        let value = if quote == '"' {
            unescape(inner)
        } else {
            inner.replace("\\'", "'")
        };
        envs.insert(key.to_string(), value);
    }
    (envs, errors)
}

fn find_closing_quote(s: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(i);
        }
    }
    None
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('v') => out.push('\u{0b}'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
