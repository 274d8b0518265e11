//! Fatal error taxonomy for an integrity run.

use std::path::PathBuf;

/// Errors that abort a run. Non-fatal conditions (an unexpected response
/// shape, a failing patch-tool query) degrade instead and never appear here.
#[derive(Debug)]
pub enum IntegrityError {
    /// The installed-state record of the package manager is unusable.
    Configuration(String),
    /// The lock-file source was selected but no lock file exists.
    MissingLockFile(PathBuf),
    /// The lock file exists but does not have the expected structure.
    MalformedLockFile(String),
    /// The verification service could not be reached or returned a
    /// non-success status. Never retried; a stale verdict is worse than none.
    SubmissionFailed(String),
}

impl std::fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityError::Configuration(msg) => {
                write!(f, "Installed package state is unusable: {}", msg)
            }
            IntegrityError::MissingLockFile(path) => {
                write!(f, "Could not find lock file at {}", path.display())
            }
            IntegrityError::MalformedLockFile(msg) => {
                write!(f, "Lock file could not be parsed: {}", msg)
            }
            IntegrityError::SubmissionFailed(msg) => {
                write!(f, "Integrity submission failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for IntegrityError {}
