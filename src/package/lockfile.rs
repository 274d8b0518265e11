use anyhow::Result;
use log::debug;
use serde::Deserialize;
use std::path::PathBuf;

use super::{Package, PackageSource, RawPackage, is_checkable};
use crate::error::IntegrityError;
use crate::runtime::Runtime;

/// Resolves packages by parsing `composer.lock` directly, for use when no
/// live manager state is available or trusted.
pub struct LockFileSource {
    root: PathBuf,
}

#[derive(Deserialize)]
struct LockFile {
    #[serde(default)]
    packages: Vec<RawPackage>,
}

impl LockFileSource {
    pub fn new(root: PathBuf) -> Self {
        LockFileSource { root }
    }

    fn lock_path(&self) -> PathBuf {
        self.root.join("composer.lock")
    }
}

impl PackageSource for LockFileSource {
    #[tracing::instrument(skip(self, runtime))]
    fn resolve_packages(&self, runtime: &dyn Runtime) -> Result<Vec<Package>> {
        let path = self.lock_path();
        if !runtime.exists(&path) {
            return Err(IntegrityError::MissingLockFile(path).into());
        }

        debug!("Reading lock file from {}", path.display());
        let contents = runtime.read_to_string(&path)?;

        let lock: LockFile = serde_json::from_str(&contents)
            .map_err(|e| IntegrityError::MalformedLockFile(e.to_string()))?;

        Ok(lock
            .packages
            .into_iter()
            .filter(is_checkable)
            .map(|raw| Package::new(raw.name, raw.version))
            .collect())
    }

    fn vendor_path(&self) -> PathBuf {
        self.root.join("vendor")
    }

    fn root_path(&self) -> PathBuf {
        self.root.clone()
    }
}
