use anyhow::Result;
use serde_json::Value;
use std::path::PathBuf;

use super::{PatchPlugin, package_names_at};
use crate::runtime::Runtime;

/// Handler for `cweagans/composer-patches`. Version 2 records resolved
/// patches in `patches.lock.json`; older setups declare them under
/// `extra.patches` in the manifest.
pub struct Cweagans {
    root: PathBuf,
}

impl Cweagans {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl PatchPlugin for Cweagans {
    fn patched_packages(&self, runtime: &dyn Runtime) -> Result<Vec<String>> {
        let lock_path = self.root.join("patches.lock.json");
        if runtime.exists(&lock_path) {
            let lock: Value = serde_json::from_str(&runtime.read_to_string(&lock_path)?)?;
            return Ok(package_names_at(&lock, ["patches"]));
        }

        let manifest: Value =
            serde_json::from_str(&runtime.read_to_string(&self.root.join("composer.json"))?)?;
        Ok(package_names_at(&manifest, ["extra", "patches"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    #[test]
    fn test_prefers_patches_lock() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .with(eq(PathBuf::from("/project/patches.lock.json")))
            .returning(|_| true);
        runtime
            .expect_read_to_string()
            .with(eq(PathBuf::from("/project/patches.lock.json")))
            .returning(|_| Ok(r#"{"patches": {"acme/lib": []}}"#.to_string()));

        let handler = Cweagans::new(PathBuf::from("/project"));
        assert_eq!(
            handler.patched_packages(&runtime).unwrap(),
            vec!["acme/lib"]
        );
    }

    #[test]
    fn test_falls_back_to_manifest_extra() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);
        runtime
            .expect_read_to_string()
            .with(eq(PathBuf::from("/project/composer.json")))
            .returning(|_| {
                Ok(r#"{"extra": {"patches": {"acme/patched": {"fix": "p.diff"}}}}"#.to_string())
            });

        let handler = Cweagans::new(PathBuf::from("/project"));
        assert_eq!(
            handler.patched_packages(&runtime).unwrap(),
            vec!["acme/patched"]
        );
    }

    #[test]
    fn test_unreadable_manifest_errors() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);
        runtime
            .expect_read_to_string()
            .returning(|_| Err(anyhow::anyhow!("permission denied")));

        let handler = Cweagans::new(PathBuf::from("/project"));
        assert!(handler.patched_packages(&runtime).is_err());
    }
}
