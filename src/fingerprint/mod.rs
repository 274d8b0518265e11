//! Deterministic xxHash64 fingerprinting of package identity and content.
//!
//! Content hashes must be reproducible across machines and filesystems, so
//! the directory walk visits entries in byte-wise name order instead of
//! relying on filesystem enumeration order.

mod progress;

pub use progress::{NoopProgress, ProgressObserver};

use anyhow::{Context, Result};
use log::debug;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use xxhash_rust::xxh64::Xxh64;

use crate::package::Package;
use crate::runtime::Runtime;

/// File extensions whose contents participate in the content hash.
const HASHED_FILE_EXTENSIONS: [&str; 4] = ["php", "phtml", "html", "js"];

/// Fixed client identifier mixed into the installation hash.
const CLIENT_NAME: &str = "composer-integrity-plugin";

/// Identity and content hashes for one discovered package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFingerprint {
    pub package: Package,
    pub id: String,
    pub checksum: String,
}

fn format_digest(hasher: Xxh64) -> String {
    format!("{:016X}", hasher.digest())
}

/// Hash of a package's identity, a pure function of `(name, version)`.
pub fn identity_hash(name: &str, version: &str) -> String {
    let mut hasher = Xxh64::new(0);
    hasher.update(name.as_bytes());
    hasher.update(version.as_bytes());
    format_digest(hasher)
}

/// Hash of a package's on-disk content.
///
/// Recognized files under `dir` are streamed into one accumulator in
/// canonical traversal order. Symlinks are skipped entirely; a directory
/// that does not exist hashes like an empty one.
#[tracing::instrument(skip(runtime, dir))]
pub fn content_hash(runtime: &dyn Runtime, dir: &Path) -> Result<String> {
    let mut hasher = Xxh64::new(0);
    for file in package_files(runtime, dir)? {
        let bytes = runtime
            .read(&file)
            .with_context(|| format!("Failed to hash {}", file.display()))?;
        hasher.update(&bytes);
    }
    Ok(format_digest(hasher))
}

/// Hash identifying the dependency-resolution state of the project:
/// manifest bytes, lock file bytes, then the client identifier.
#[tracing::instrument(skip(runtime, root))]
pub fn installation_hash(runtime: &dyn Runtime, root: &Path) -> Result<String> {
    let mut hasher = Xxh64::new(0);
    hasher.update(&runtime.read(&root.join("composer.json"))?);
    hasher.update(&runtime.read(&root.join("composer.lock"))?);
    hasher.update(CLIENT_NAME.as_bytes());
    Ok(format_digest(hasher))
}

fn package_files(runtime: &dyn Runtime, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if runtime.is_dir(dir) {
        collect_files(runtime, dir, &mut files)?;
    }
    Ok(files)
}

fn collect_files(runtime: &dyn Runtime, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = runtime.read_dir(dir)?;
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    for entry in entries {
        if runtime.is_symlink(&entry) {
            continue;
        }
        if runtime.is_dir(&entry) {
            collect_files(runtime, &entry, files)?;
        } else if has_recognized_extension(&entry) {
            files.push(entry);
        }
    }
    Ok(())
}

fn has_recognized_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| HASHED_FILE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Fingerprint every package in parallel. Content hashes are independent per
/// package, so the fan-out needs no locking beyond the progress counter.
#[tracing::instrument(skip(runtime, packages, vendor_path, progress))]
pub fn fingerprint_packages(
    runtime: &dyn Runtime,
    packages: &[Package],
    vendor_path: &Path,
    progress: &dyn ProgressObserver,
) -> Result<Vec<PackageFingerprint>> {
    let total = packages.len();
    let completed = AtomicUsize::new(0);

    packages
        .par_iter()
        .map(|package| {
            let dir = vendor_path.join(&package.name);
            let checksum = content_hash(runtime, &dir)?;
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            progress.on_package(&package.name, done, total);
            debug!("Fingerprinted {} ({}/{})", package.name, done, total);

            Ok(PackageFingerprint {
                id: identity_hash(&package.name, &package.version),
                checksum,
                package: package.clone(),
            })
        })
        .collect()
}
