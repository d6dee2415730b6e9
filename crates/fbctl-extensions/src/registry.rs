//! Public extensions registry
//!
//! Loaded from `/extensions.json` on the registry origin. The registry
//! lists every extension shown in the public catalog and, through the
//! publishers of those entries, which publishers are trusted.

use crate::error::Result;
use fbctl_api::{ApiClient, ClientOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const REGISTRY_ENDPOINT: &str = "/extensions.json";

/// Publisher assumed trusted when the registry cannot be read
pub const DEFAULT_TRUSTED_PUBLISHER: &str = "firebase";

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub publisher: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_uri: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher_icon_uri: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Featured {
    #[serde(default)]
    discover: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    mods: BTreeMap<String, RegistryEntry>,
    #[serde(default)]
    featured: Featured,
}

/// The loaded registry
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    /// Entries by extension name
    pub entries: BTreeMap<String, RegistryEntry>,

    /// Names promoted on the discover page
    pub featured: BTreeSet<String>,
}

impl ExtensionRegistry {
    /// Fetch the registry from `origin`
    pub async fn load(origin: &str, options: &ClientOptions) -> Result<Self> {
        let client = ApiClient::new(origin, options)?.without_auth();
        let file = client.get::<RegistryFile>(REGISTRY_ENDPOINT).await?.body;
        debug!(
            "Loaded {} registry entries ({} featured)",
            file.mods.len(),
            file.featured.discover.len()
        );
        Ok(Self {
            entries: file.mods,
            featured: file.featured.discover.into_iter().collect(),
        })
    }

    /// Entries, optionally only the featured ones
    pub fn extensions(&self, only_featured: bool) -> BTreeMap<String, RegistryEntry> {
        self.entries
            .iter()
            .filter(|(name, _)| !only_featured || self.featured.contains(*name))
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect()
    }

    pub fn get_entry(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    /// Distinct publishers of all entries
    pub fn publishers(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.entries.values().map(|e| e.publisher.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }
}

/// Registry entries, optionally filtered to the featured list
pub async fn get_extension_registry(
    origin: &str,
    options: &ClientOptions,
    only_featured: bool,
) -> Result<BTreeMap<String, RegistryEntry>> {
    Ok(ExtensionRegistry::load(origin, options)
        .await?
        .extensions(only_featured))
}

/// Publishers of catalog extensions; only `firebase` when the registry is unreachable
pub async fn get_trusted_publishers(origin: &str, options: &ClientOptions) -> Vec<String> {
    match ExtensionRegistry::load(origin, options).await {
        Ok(registry) => registry.publishers(),
        Err(e) => {
            debug!(
                "Couldn't get extensions registry, assuming no trusted publishers except Firebase: {}",
                e
            );
            vec![DEFAULT_TRUSTED_PUBLISHER.to_string()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ExtensionRegistry {
        let file: RegistryFile = serde_json::from_value(json!({
            "mods": {
                "storage-resize-images": { "publisher": "firebase" },
                "delete-user-data": { "publisher": "firebase" },
                "stripe-payments": { "publisher": "stripe", "iconUri": "https://x/icon.png" }
            },
            "featured": { "discover": ["stripe-payments"] }
        }))
        .unwrap();
        ExtensionRegistry {
            entries: file.mods,
            featured: file.featured.discover.into_iter().collect(),
        }
    }

    #[test]
    fn test_featured_filter() {
        let registry = sample();
        assert_eq!(registry.extensions(false).len(), 3);
        let featured = registry.extensions(true);
        assert_eq!(featured.keys().collect::<Vec<_>>(), vec!["stripe-payments"]);
    }

    #[test]
    fn test_publishers_are_distinct() {
        assert_eq!(sample().publishers(), vec!["firebase", "stripe"]);
    }

    #[test]
    fn test_missing_sections_default() {
        let file: RegistryFile = serde_json::from_value(json!({})).unwrap();
        assert!(file.mods.is_empty());
        assert!(file.featured.discover.is_empty());
    }
}
