//! Errors raised by the examination driver itself (as opposed to
//! examiner failures, which `strata-core::examiner::ExaminerFailure`
//! already models and which never abort a run).

use std::fmt;

/// A fatal failure of the fixpoint loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The arena grew past `excavation.config().max_artifacts` during
    /// the run — the examiner set is producing unbounded new artifacts
    /// faster than the driver can retire them.
    ExaminationDiverged { limit: usize, actual: usize },
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExaminationDiverged { limit, actual } => write!(
                f,
                "examination diverged: {actual} artifacts exceeds limit of {limit}"
            ),
        }
    }
}

impl std::error::Error for DriverError {}
