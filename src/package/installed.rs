use anyhow::Result;
use log::debug;
use serde::Deserialize;
use std::path::PathBuf;

use super::{Package, PackageSource, RawPackage, is_checkable};
use crate::error::IntegrityError;
use crate::runtime::Runtime;

/// Resolves packages from the manager's own installed-state record
/// (`vendor/composer/installed.json`), i.e. what is actually on disk right
/// now rather than what the lock file says should be.
pub struct InstalledStateSource {
    root: PathBuf,
}

/// Composer 2 wraps the package list in an object; Composer 1 wrote a bare
/// array. Accept both.
#[derive(Deserialize)]
#[serde(untagged)]
enum InstalledState {
    Wrapped { packages: Vec<RawPackage> },
    Flat(Vec<RawPackage>),
}

impl InstalledState {
    fn into_packages(self) -> Vec<RawPackage> {
        match self {
            InstalledState::Wrapped { packages } => packages,
            InstalledState::Flat(packages) => packages,
        }
    }
}

impl InstalledStateSource {
    pub fn new(root: PathBuf) -> Self {
        InstalledStateSource { root }
    }

    fn state_path(&self) -> PathBuf {
        self.vendor_path().join("composer").join("installed.json")
    }
}

impl PackageSource for InstalledStateSource {
    #[tracing::instrument(skip(self, runtime))]
    fn resolve_packages(&self, runtime: &dyn Runtime) -> Result<Vec<Package>> {
        let path = self.state_path();
        debug!("Reading installed state from {}", path.display());

        let contents = runtime.read_to_string(&path).map_err(|e| {
            IntegrityError::Configuration(format!("{}: {}", path.display(), e))
        })?;

        let state: InstalledState = serde_json::from_str(&contents)
            .map_err(|e| IntegrityError::Configuration(format!("{}: {}", path.display(), e)))?;

        Ok(state
            .into_packages()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    fn state_path() -> PathBuf {
        PathBuf::from("/project/vendor/composer/installed.json")
    }

    #[test]
    fn test_resolve_wrapped_state() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .with(eq(state_path()))
            .returning(|_| {
                Ok(r#"{
                    "packages": [
                        {"name": "acme/lib", "version": "1.2.0", "type": "library"},
                        {"name": "acme/meta", "version": "1.0.0", "type": "metapackage"},
                        {"name": "acme/tip", "version": "dev-main", "type": "library"}
                    ],
                    "dev": false
                }"#
                .to_string())
            });

        let source = InstalledStateSource::new(PathBuf::from("/project"));
        let packages = source.resolve_packages(&runtime).unwrap();
        assert_eq!(packages, vec![Package::new("acme/lib", "1.2.0")]);
    }

    #[test]
    fn test_resolve_flat_state() {
        let mut runtime = MockRuntime::new();
        runtime.expect_read_to_string().returning(|_| {
            Ok(r#"[{"name": "acme/lib", "version": "1.2.0", "type": "library"}]"#.to_string())
        });

        let source = InstalledStateSource::new(PathBuf::from("/project"));
        let packages = source.resolve_packages(&runtime).unwrap();
        assert_eq!(packages.len(), 1);
    }

    #[test]
    fn test_unreadable_state_is_configuration_error() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|_| Err(anyhow::anyhow!("permission denied")));

        let source = InstalledStateSource::new(PathBuf::from("/project"));
        let err = source.resolve_packages(&runtime).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IntegrityError>(),
            Some(IntegrityError::Configuration(_))
        ));
    }

    #[test]
    fn test_unparseable_state_is_configuration_error() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|_| Ok("not json".to_string()));

        let source = InstalledStateSource::new(PathBuf::from("/project"));
        let err = source.resolve_packages(&runtime).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IntegrityError>(),
            Some(IntegrityError::Configuration(_))
        ));
    }

    #[test]
    fn test_paths() {
        let source = InstalledStateSource::new(PathBuf::from("/project"));
        assert_eq!(source.root_path(), PathBuf::from("/project"));
        assert_eq!(source.vendor_path(), PathBuf::from("/project/vendor"));
    }
}
