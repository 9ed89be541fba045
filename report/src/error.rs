//! Errors raised while rendering an excavation to HTML.

use std::fmt;
use std::io;

/// A fatal failure while writing a report. Always propagated; unlike
/// examiner failures, there is no recoverable path for a write that
/// didn't happen.
#[derive(Debug)]
pub enum ReportError {
    IoFailure(io::Error),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoFailure(e) => write!(f, "report I/O failure: {e}"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoFailure(e) => Some(e),
        }
    }
}

impl From<io::Error> for ReportError {
    fn from(e: io::Error) -> Self {
        Self::IoFailure(e)
    }
}
