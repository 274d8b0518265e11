//! Submission of package fingerprints to the verification service and
//! reconciliation of the returned verdicts.

mod client;
mod service;
mod types;

pub use client::VerificationClient;
pub use service::{HttpVerdictService, VerdictService};
pub use types::{PackageEntry, PackageVerdict, SubmissionPayload, Verdict, VerdictRecord};

#[cfg(test)]
pub use service::MockVerdictService;

/// Default verification endpoint.
pub const DEFAULT_API_URL: &str = "https://api.sansec.io/v1/composer/integrity";

/// Reserved wire value for the xxHash64 algorithm.
pub const HASH_TYPE_XXH64: u8 = 0;

/// Fixed wire identifier for this client's package ecosystem.
pub const ORIGIN_COMPOSER: u8 = 1;
