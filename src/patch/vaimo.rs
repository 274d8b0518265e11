use anyhow::Result;
use serde_json::Value;
use std::path::PathBuf;

use super::{PatchPlugin, package_names_at};
use crate::runtime::Runtime;

/// Handler for `vaimo/composer-patches`, which declares its patch targets
/// under `extra.patcher.patches` in the manifest.
pub struct Vaimo {
    root: PathBuf,
}

impl Vaimo {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl PatchPlugin for Vaimo {
    fn patched_packages(&self, runtime: &dyn Runtime) -> Result<Vec<String>> {
        let manifest: Value =
            serde_json::from_str(&runtime.read_to_string(&self.root.join("composer.json"))?)?;
        Ok(package_names_at(&manifest, ["extra", "patcher", "patches"]))
    }
}
