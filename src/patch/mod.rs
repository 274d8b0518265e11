//! Detection of local patch-applying tools.
//!
//! Some projects ship a plugin that patches installed packages on purpose,
//! which makes a `mismatch` verdict expected rather than alarming. When such
//! a tool is present, the report grows a column saying which packages it
//! touched. This is enrichment only: a failing handler degrades to an empty
//! patched list and never aborts the run.

mod cweagans;
mod vaimo;

pub use cweagans::Cweagans;
pub use vaimo::Vaimo;

use anyhow::Result;
use log::{debug, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::render::VerdictEnricher;
use crate::runtime::Runtime;
use crate::verify::PackageVerdict;

/// Capability of one recognized patch tool: report which packages it patched.
pub trait PatchPlugin: Send + Sync {
    fn patched_packages(&self, runtime: &dyn Runtime) -> Result<Vec<String>>;
}

type HandlerFactory = fn(PathBuf) -> Box<dyn PatchPlugin>;

fn make_vaimo(root: PathBuf) -> Box<dyn PatchPlugin> {
    Box::new(Vaimo::new(root))
}

fn make_cweagans(root: PathBuf) -> Box<dyn PatchPlugin> {
    Box::new(Cweagans::new(root))
}

/// Ordered registry of recognized patch tools. Adding a tool means adding a
/// row here, nothing else.
const PATCH_PLUGIN_HANDLERS: [(&str, HandlerFactory); 2] = [
    ("vaimo/composer-patches", make_vaimo),
    ("cweagans/composer-patches", make_cweagans),
];

/// Scans the discovered package list for a recognized patch tool and holds
/// the first matching handler, if any.
pub struct PatchDetector {
    plugin: Option<Box<dyn PatchPlugin>>,
}

impl PatchDetector {
    #[tracing::instrument(skip_all)]
    pub fn detect<'a>(root: &Path, package_names: impl IntoIterator<Item = &'a str>) -> Self {
        for name in package_names {
            if let Some((_, factory)) = PATCH_PLUGIN_HANDLERS
                .iter()
                .find(|(handler_name, _)| *handler_name == name)
            {
                debug!("Detected patch plugin {}", name);
                return Self {
                    plugin: Some(factory(root.to_path_buf())),
                };
            }
        }
        Self { plugin: None }
    }

    pub fn has_patch_plugin(&self) -> bool {
        self.plugin.is_some()
    }

    /// Names of packages the detected tool has patched. A handler failure
    /// degrades to an empty list.
    pub fn patched_packages(&self, runtime: &dyn Runtime) -> Vec<String> {
        let Some(plugin) = &self.plugin else {
            return Vec::new();
        };

        match plugin.patched_packages(runtime) {
            Ok(packages) => packages,
            Err(e) => {
                warn!("Patch tool query failed ({}), assuming no patched packages", e);
                Vec::new()
            }
        }
    }
}

/// Adds a "Patched" column to every rendered verdict row.
pub struct PatchEnricher {
    patched_packages: Vec<String>,
}

impl PatchEnricher {
    pub fn new(patched_packages: Vec<String>) -> Self {
        Self { patched_packages }
    }
}

impl VerdictEnricher for PatchEnricher {
    fn columns(&self) -> Vec<String> {
        vec!["Patched".to_string()]
    }

    fn enrich(&self, verdict: &PackageVerdict) -> Vec<(String, Value)> {
        let patched = self.patched_packages.iter().any(|name| *name == verdict.name);
        vec![("patch_applied".to_string(), Value::Bool(patched))]
    }
}

/// Extracts the package names under the given path of keys, where the final
/// value is an object keyed by package name.
pub(crate) fn package_names_at<'a>(
    value: &Value,
    path: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let mut current = value;
    for key in path {
        match current.get(key) {
            Some(next) => current = next,
            None => return Vec::new(),
        }
    }
    current
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use crate::verify::Verdict;

    #[test]
    fn test_no_recognized_tool_is_not_an_error() {
        let detector = PatchDetector::detect(
            Path::new("/project"),
            ["acme/lib", "acme/other"],
        );
        assert!(!detector.has_patch_plugin());

        let runtime = MockRuntime::new();
        assert!(detector.patched_packages(&runtime).is_empty());
    }

    #[test]
    fn test_first_matching_handler_wins() {
        let detector = PatchDetector::detect(
            Path::new("/project"),
            ["acme/lib", "cweagans/composer-patches"],
        );
        assert!(detector.has_patch_plugin());
    }

    #[test]
    fn test_handler_failure_degrades_to_empty() {
        struct Failing;
        impl PatchPlugin for Failing {
            fn patched_packages(&self, _runtime: &dyn Runtime) -> Result<Vec<String>> {
                Err(anyhow::anyhow!("tool exploded"))
            }
        }

        let detector = PatchDetector {
            plugin: Some(Box::new(Failing)),
        };
        let runtime = MockRuntime::new();
        assert!(detector.patched_packages(&runtime).is_empty());
    }

    #[test]
    fn test_enricher_flags_patched_packages() {
        let enricher = PatchEnricher::new(vec!["acme/patched".to_string()]);
        assert_eq!(enricher.columns(), vec!["Patched".to_string()]);

        let verdict = PackageVerdict {
            name: "acme/patched".to_string(),
            version: "1.0.0".to_string(),
            package_id: "1111".to_string(),
            checksum: "2222".to_string(),
            percentage: None,
            verdict: Verdict::Unknown,
        };
        assert_eq!(
            enricher.enrich(&verdict),
            vec![("patch_applied".to_string(), Value::Bool(true))]
        );

        let other = PackageVerdict {
            name: "acme/other".to_string(),
            ..verdict
        };
        assert_eq!(
            enricher.enrich(&other),
            vec![("patch_applied".to_string(), Value::Bool(false))]
        );
    }

    #[test]
    fn test_package_names_at() {
        let value: Value = serde_json::from_str(
            r#"{"extra": {"patches": {"acme/a": {}, "acme/b": {}}}}"#,
        )
        .unwrap();
        let mut names = package_names_at(&value, ["extra", "patches"]);
        names.sort();
        assert_eq!(names, vec!["acme/a", "acme/b"]);
        assert!(package_names_at(&value, ["extra", "missing"]).is_empty());
    }
}
