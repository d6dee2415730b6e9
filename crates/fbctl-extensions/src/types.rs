//! Extension spec and publisher API types

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Resource type of a v1 function
pub const FUNCTIONS_RESOURCE_TYPE: &str = "firebaseextensions.v1beta.function";
/// Resource type of a v2 function
pub const FUNCTIONS_V2_RESOURCE_TYPE: &str = "firebaseextensions.v1beta.v2function";
/// Resource type of a scheduled function
pub const SCHEDULED_FUNCTION_RESOURCE_TYPE: &str = "firebaseextensions.v1beta.scheduledFunction";

/// Parsed `extension.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apis: Vec<Api>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub system_params: Vec<Param>,
}

/// IAM role granted to the extension's service account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub role: String,
    #[serde(default)]
    pub reason: String,
}

/// Google API the extension enables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Api {
    pub api_name: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

impl Resource {
    pub fn is_function(&self) -> bool {
        matches!(
            self.resource_type.as_str(),
            FUNCTIONS_RESOURCE_TYPE | FUNCTIONS_V2_RESOURCE_TYPE | SCHEDULED_FUNCTION_RESOURCE_TYPE
        )
    }

    /// A property by key
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }

    /// Declared runtime; v2 functions keep it under `buildConfig`
    pub fn runtime(&self) -> Option<&str> {
        let value = if self.resource_type == FUNCTIONS_V2_RESOURCE_TYPE {
            self.property("buildConfig").and_then(|b| b.get("runtime"))
        } else {
            self.property("runtime")
        };
        value.and_then(Value::as_str).filter(|s| !s.is_empty())
    }
}

/// How a param is presented and validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamType {
    #[serde(rename = "string", alias = "STRING")]
    String,
    #[serde(rename = "select", alias = "SELECT")]
    Select,
    #[serde(rename = "multiSelect", alias = "MULTISELECT", alias = "multiselect")]
    MultiSelect,
    #[serde(rename = "secret", alias = "SECRET")]
    Secret,
    #[serde(rename = "selectResource", alias = "SELECT_RESOURCE", alias = "selectresource")]
    SelectResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamOption {
    #[serde(deserialize_with = "de_stringish")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A configurable param of an extension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    pub param: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_stringish",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<ParamType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ParamOption>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_error_message: Option<String>,
    #[serde(default)]
    pub immutable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default)]
    pub advanced: bool,
}

impl Param {
    pub fn is_secret(&self) -> bool {
        self.param_type == Some(ParamType::Secret)
    }

    /// Same param name and type
    pub fn same_as(&self, other: &Param) -> bool {
        self.param == other.param && self.param_type == other.param_type
    }
}

/// A published extension as returned by the publisher API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    pub name: String,
    #[serde(rename = "ref")]
    pub extension_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_launch_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version_create_time: Option<String>,
}

/// A registered publisher profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherProfile {
    pub name: String,
    #[serde(default)]
    pub publisher_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_time: Option<String>,
}

/// The source an installed instance was created from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionSource {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub package_uri: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub spec: ExtensionSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: ExtensionSource,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub system_params: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_version: Option<String>,
}

/// An installed extension instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionInstance {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instance_id: String,
    #[serde(default)]
    pub config: ExtensionConfig,
}

/// Value of one param binding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamBindingOptions {
    pub base_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_value: Option<String>,
}

fn stringish(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn de_stringish<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(stringish(Value::deserialize(d)?).unwrap_or_default())
}

/// YAML authors write `default: 10` as often as `default: "10"`
fn de_opt_stringish<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(stringish(Value::deserialize(d)?))
}
