//! Hierarchical configuration loader with precedence
//!
//! Loads runtime configuration from multiple sources with the following
//! precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Global config (~/.fbctl/config.yaml)
//! 3. Environment variables (FBCTL_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::{ApiOrigins, RuntimeConfig};
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Name of the global config file inside the config dir
const GLOBAL_CONFIG_FILE: &str = "config.yaml";

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a new hierarchical config loader rooted at ~/.fbctl
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the standard config directory (~/.fbctl)
    fn get_config_dir() -> Result<Utf8PathBuf> {
        let home = crate::utils::get_home_dir()
            .map_err(|_| Error::invalid_config("Could not determine home directory"))?;
        Utf8PathBuf::from_path_buf(home.join(".fbctl"))
            .map_err(|_| Error::invalid_config("Home directory path is not valid UTF-8"))
    }

    /// Load runtime configuration with hierarchical precedence
    pub fn load_runtime_config(&self) -> Result<RuntimeConfig> {
        let mut config = Self::load_embedded_config::<RuntimeConfig>("runtime-defaults.yaml")?;

        let global_path = self.config_dir.join(GLOBAL_CONFIG_FILE);
        if global_path.exists() {
            debug!("Loading global config from {}", global_path);
            let file_config = self.load_yaml_file::<RuntimeConfig>(&global_path)?;
            config = Self::merge_runtime_config(config, file_config);
        }

        self.apply_env_overrides(config)
    }

    /// Load an embedded configuration file
    fn load_embedded_config<T: DeserializeOwned>(filename: &str) -> Result<T> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })
    }

    /// Load a YAML file and parse it
    fn load_yaml_file<T: DeserializeOwned>(&self, path: &Utf8Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }

    /// Merge two runtime configs (base is overridden by overlay)
    ///
    /// Experiments are additive; everything else is replaced by the overlay.
    fn merge_runtime_config(base: RuntimeConfig, overlay: RuntimeConfig) -> RuntimeConfig {
        let mut experiments = base.experiments;
        for name in overlay.experiments {
            if !experiments.contains(&name) {
                experiments.push(name);
            }
        }

        RuntimeConfig {
            network: overlay.network,
            origins: overlay.origins,
            experiments,
            extensions: if overlay.extensions.dev_min_version.is_some() {
                overlay.extensions
            } else {
                base.extensions
            },
        }
    }

    /// Apply environment variable overrides to runtime config
    fn apply_env_overrides(&self, mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        if let Ok(val) = env::var("FBCTL_HTTP_TIMEOUT_SECS") {
            config.network.http_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("FBCTL_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("FBCTL_OPERATION_TIMEOUT_SECS") {
            config.network.operation_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("FBCTL_OPERATION_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("FBCTL_EXPERIMENTS") {
            for name in val.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                if !config.experiments.iter().any(|e| e == name) {
                    config.experiments.push(name.to_string());
                }
            }
        }

        // FBCTL_SECRET_MANAGER_ORIGIN, FBCTL_HOSTING_ORIGIN, ...
        for key in ApiOrigins::KEYS {
            let var = format!("FBCTL_{}_ORIGIN", key.replace('-', "_").to_uppercase());
            if let Ok(val) = env::var(&var) {
                if let Some(origin) = config.origins.get_mut(key) {
                    debug!("Overriding {} origin from {}", key, var);
                    *origin = val.trim_end_matches('/').to_string();
                }
            }
        }

        Ok(config)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}
