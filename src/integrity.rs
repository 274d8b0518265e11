//! One integrity run: discover, fingerprint, submit, reconcile, render.

use anyhow::{Context, Result};
use clap::ValueEnum;
use log::{debug, info};
use reqwest::Client;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use crate::fingerprint::NoopProgress;
use crate::package::{InstalledStateSource, LockFileSource, PackageSource};
use crate::patch::{PatchDetector, PatchEnricher};
use crate::render::{RenderOptions, VerdictEnricher, render};
use crate::runtime::Runtime;
use crate::verify::{HttpVerdictService, Verdict, VerificationClient};

/// How the set of installed packages is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Read the package manager's installed-state record.
    Installed,
    /// Parse the lock file directly.
    Lock,
}

#[derive(Debug)]
pub struct IntegrityOptions {
    pub source: SourceKind,
    pub root: Option<PathBuf>,
    pub api_url: Option<String>,
    pub timeout_secs: u64,
    pub json: bool,
    pub skip_match: bool,
}

/// Result of a completed run, used to derive the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrityOutcome {
    pub mismatches: usize,
}

impl IntegrityOutcome {
    /// Only `mismatch` verdicts fail a run; `unknown` alone never does.
    pub fn is_failure(&self) -> bool {
        self.mismatches > 0
    }
}

/// Runs the whole pipeline and writes the report to `out`. Nothing is
/// written until the complete verdict set has been reconciled, so an
/// interrupted run leaves no partial report behind.
#[tracing::instrument(skip(runtime, options, out))]
pub async fn run(
    runtime: &dyn Runtime,
    options: &IntegrityOptions,
    out: &mut dyn Write,
) -> Result<IntegrityOutcome> {
    let root = match &options.root {
        Some(root) => root.clone(),
        None => runtime.current_dir()?,
    };
    debug!("Checking integrity of project at {}", root.display());

    let source: Box<dyn PackageSource> = match options.source {
        SourceKind::Installed => Box::new(InstalledStateSource::new(root)),
        SourceKind::Lock => Box::new(LockFileSource::new(root)),
    };

    let client = Client::builder()
        .user_agent(concat!("vint/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(options.timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;
    let service = HttpVerdictService::new(client, options.api_url.clone());

    let verification = VerificationClient::new(source.as_ref(), &service);
    let verdicts = verification.package_verdicts(runtime, &NoopProgress).await?;

    let detector = PatchDetector::detect(
        &source.root_path(),
        verdicts.iter().map(|v| v.name.as_str()),
    );
    let enricher: Option<Box<dyn VerdictEnricher>> = if detector.has_patch_plugin() {
        info!("Patch plugin detected, adding patched column");
        Some(Box::new(PatchEnricher::new(
            detector.patched_packages(runtime),
        )))
    } else {
        None
    };

    render(
        out,
        &verdicts,
        &RenderOptions {
            json: options.json,
            skip_match: options.skip_match,
            enricher,
        },
    )?;

    Ok(IntegrityOutcome {
        mismatches: verdicts
            .iter()
            .filter(|v| v.verdict == Verdict::Mismatch)
            .count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_failure_iff_mismatch() {
        assert!(!IntegrityOutcome { mismatches: 0 }.is_failure());
        assert!(IntegrityOutcome { mismatches: 1 }.is_failure());
        assert!(IntegrityOutcome { mismatches: 7 }.is_failure());
    }
}
