//! The examiner capability: pluggable inspection of one artifact at a
//! time, invoked by `strata-examine`'s fixpoint driver.

use std::fmt;

use crate::artifact::Artifact;

/// A recoverable failure raised by an examiner's `examine` call. Caught
/// by the driver and downgraded to a comment on the offending artifact;
/// never fatal to the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExaminerFailure(pub String);

impl fmt::Display for ExaminerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ExaminerFailure {}

impl From<&str> for ExaminerFailure {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ExaminerFailure {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A capability that inspects one artifact at a time, may derive new
/// children from it, and may attach metadata.
///
/// Lives in `strata-core` (rather than `strata-examine`, which depends
/// on it) because `Excavation` must be able to hold
/// `Vec<Box<dyn Examiner>>` without a dependency on the driver crate.
pub trait Examiner {
    /// A short, stable name used in failure comments and logs.
    fn name(&self) -> &str;

    /// Whether this examiner should run on `artifact` at all. Defaults
    /// to `true`; most examiners accept everything and self-filter
    /// inside `examine`.
    fn accepts(&self, artifact: &Artifact) -> bool {
        let _ = artifact;
        true
    }

    /// Inspects (and may derive children from, or attach metadata to)
    /// `artifact`.
    ///
    /// # Errors
    /// A recoverable [`ExaminerFailure`]; the driver catches this (and
    /// any panic) and records it as a comment rather than aborting the
    /// run.
    fn examine(&self, artifact: &Artifact) -> Result<(), ExaminerFailure>;
}
