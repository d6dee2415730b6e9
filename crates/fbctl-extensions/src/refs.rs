//! Extension references: `publisherId/extensionId[@version]`

use crate::error::{ExtensionsError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static REF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^/@\n]+)/([^/@\n]+)(?:@([^\n]+))?$").expect("valid ref pattern")
});

/// A parsed extension reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ref {
    pub publisher_id: String,
    pub extension_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Ref {
    /// Parse and validate a reference
    pub fn parse(reference: &str) -> Result<Self> {
        let caps = REF_PATTERN.captures(reference).ok_or_else(|| {
            ExtensionsError::validation(format!(
                "Unable to parse {} as an extension ref.\nExpected format is either publisherId/extensionId@version or publisherId/extensionId.",
                reference
            ))
        })?;

        let parsed = Self {
            publisher_id: caps[1].to_string(),
            extension_id: caps[2].to_string(),
            version: caps.get(3).map(|m| m.as_str().to_string()),
        };

        if let Some(version) = &parsed.version {
            if version != "latest" && semver::Version::parse(version).is_err() {
                return Err(ExtensionsError::validation(format!(
                    "Extension reference {} contains an invalid version {}.",
                    reference, version
                )));
            }
        }
        Ok(parsed)
    }

    /// `publisher/extension`, without version
    pub fn to_extension_ref(&self) -> String {
        format!("{}/{}", self.publisher_id, self.extension_id)
    }

    /// API resource name `publishers/{p}/extensions/{e}`
    pub fn to_extension_name(&self) -> String {
        format!(
            "publishers/{}/extensions/{}",
            self.publisher_id, self.extension_id
        )
    }
}

impl FromStr for Ref {
    type Err = ExtensionsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}/{}@{}", self.publisher_id, self.extension_id, v),
            None => write!(f, "{}/{}", self.publisher_id, self.extension_id),
        }
    }
}
