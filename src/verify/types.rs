use serde::{Deserialize, Serialize};

/// The remote service's classification of one package fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Unknown,
    Match,
    Mismatch,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Unknown => "unknown",
            Verdict::Match => "match",
            Verdict::Mismatch => "mismatch",
        }
    }
}

/// Wire-level request body. Carries hashes only; names and versions stay
/// local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub id: String,
    pub hash_type: u8,
    pub origin: u8,
    pub pkg: Vec<PackageEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageEntry {
    pub id: String,
    pub data: String,
}

/// Accepted response schema: an envelope with a `verdicts` array. Anything
/// else degrades to "no verdicts available".
#[derive(Debug, Deserialize)]
pub(crate) struct VerdictEnvelope {
    pub verdicts: Option<Vec<VerdictRecord>>,
}

/// One verdict record from the service, keyed by the package identity hash.
#[derive(Debug, Clone, Deserialize)]
pub struct VerdictRecord {
    pub pkg_ver: String,
    pub verdict: Verdict,
    #[serde(default)]
    pub incidence_perc: Option<f64>,
}

/// Join of a discovered package, its fingerprint, and its verdict. The unit
/// the presenter renders; exactly one per discovered package per run.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageVerdict {
    pub name: String,
    pub version: String,
    pub package_id: String,
    pub checksum: String,
    pub percentage: Option<f64>,
    pub verdict: Verdict,
}
