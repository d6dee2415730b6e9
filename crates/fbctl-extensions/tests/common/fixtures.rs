//! Local extension directory fixtures

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

use super::constants::EXTENSION_YAML;

/// A temporary extension source directory
pub struct ExtensionDir {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl ExtensionDir {
    /// Directory holding the standard test `extension.yaml`
    pub fn new() -> Self {
        Self::with_yaml(EXTENSION_YAML)
    }

    pub fn with_yaml(yaml: &str) -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .expect("temp dir is not UTF-8");
        fs::write(root.join("extension.yaml"), yaml).expect("Failed to write extension.yaml");
        fs::create_dir_all(root.join("functions/src")).expect("Failed to create functions dir");
        Self { _temp: temp, root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Write a file relative to the root and return its path
    pub fn write(&self, relative: &str, content: &str) -> Utf8PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write fixture");
        path
    }
}
