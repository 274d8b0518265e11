//! Package discovery: what is installed, and where it lives on disk.

mod installed;
mod lockfile;

pub use installed::InstalledStateSource;
pub use lockfile::LockFileSource;

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

use crate::runtime::Runtime;

/// One installed dependency at a specific version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub version: String,
}

impl Package {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Package {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Strategy for resolving the set of installed packages and the project
/// paths. Variants are selected explicitly at construction time.
#[cfg_attr(test, mockall::automock)]
pub trait PackageSource: Send + Sync {
    fn resolve_packages(&self, runtime: &dyn Runtime) -> Result<Vec<Package>>;
    fn vendor_path(&self) -> PathBuf;
    fn root_path(&self) -> PathBuf;
}

/// A package entry as it appears in the manager's JSON records.
#[derive(Debug, Deserialize)]
pub(crate) struct RawPackage {
    pub name: String,
    pub version: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Shared filter policy: metapackages have no on-disk content, and `dev-`
/// branch versions have no stable content to fingerprint.
pub(crate) fn is_checkable(raw: &RawPackage) -> bool {
    raw.kind.as_deref() != Some("metapackage") && !raw.version.starts_with("dev-")
}
