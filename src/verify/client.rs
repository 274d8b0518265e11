use anyhow::Result;
use log::debug;

use super::types::{PackageEntry, PackageVerdict, SubmissionPayload, Verdict, VerdictRecord};
use super::{HASH_TYPE_XXH64, ORIGIN_COMPOSER, VerdictService};
use crate::fingerprint::{PackageFingerprint, ProgressObserver, fingerprint_packages, installation_hash};
use crate::package::PackageSource;
use crate::runtime::Runtime;

/// Drives one verification round: discover, fingerprint, submit, reconcile.
pub struct VerificationClient<'a> {
    source: &'a dyn PackageSource,
    service: &'a dyn VerdictService,
}

impl<'a> VerificationClient<'a> {
    pub fn new(source: &'a dyn PackageSource, service: &'a dyn VerdictService) -> Self {
        Self { source, service }
    }

    /// Produces exactly one verdict per discovered package. Packages the
    /// service has no opinion on come back as `unknown`.
    #[tracing::instrument(skip_all)]
    pub async fn package_verdicts(
        &self,
        runtime: &dyn Runtime,
        progress: &dyn ProgressObserver,
    ) -> Result<Vec<PackageVerdict>> {
        let packages = self.source.resolve_packages(runtime)?;
        debug!("Resolved {} package(s)", packages.len());

        let fingerprints =
            fingerprint_packages(runtime, &packages, &self.source.vendor_path(), progress)?;

        let payload = SubmissionPayload {
            id: installation_hash(runtime, &self.source.root_path())?,
            hash_type: HASH_TYPE_XXH64,
            origin: ORIGIN_COMPOSER,
            pkg: fingerprints
                .iter()
                .map(|fp| PackageEntry {
                    id: fp.id.clone(),
                    data: fp.checksum.clone(),
                })
                .collect(),
        };

        let verdicts = self.service.submit(&payload).await?;

        Ok(fingerprints
            .into_iter()
            .map(|fp| {
                let record = verdicts.get(&fp.id).cloned();
                reconcile(fp, record)
            })
            .collect())
    }
}

fn reconcile(fingerprint: PackageFingerprint, record: Option<VerdictRecord>) -> PackageVerdict {
    let (verdict, percentage) = match record {
        Some(record) => (record.verdict, record.incidence_perc),
        None => (Verdict::Unknown, None),
    };

    PackageVerdict {
        name: fingerprint.package.name,
        version: fingerprint.package.version,
        package_id: fingerprint.id,
        checksum: fingerprint.checksum,
        percentage,
        verdict,
    }
}
