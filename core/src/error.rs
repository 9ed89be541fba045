//! Typed errors for the artifact graph core.

use std::fmt;

/// Failure constructing or slicing a [`crate::byte_source::ByteSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliceError {
    /// `hi <= lo` for a requested `[lo, hi)` range.
    EmptyRange { lo: usize, hi: usize },
    /// `lo` or `hi` exceeds the source's length.
    OutOfBounds { lo: usize, hi: usize, len: usize },
}

impl fmt::Display for SliceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRange { lo, hi } => write!(f, "empty range [{lo}, {hi})"),
            Self::OutOfBounds { lo, hi, len } => {
                write!(f, "range [{lo}, {hi}) exceeds length {len}")
            }
        }
    }
}

impl std::error::Error for SliceError {}

/// Typed failure for [`crate::artifact::Artifact`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// `set_name` was called with `fallback = false` and the name was
    /// already taken, by this artifact or another one.
    DuplicateName {
        /// The name this artifact already carries (if any).
        existing: Option<String>,
        /// The name that could not be claimed.
        attempted: String,
    },
    /// A `create_*` call would have produced a zero-length artifact.
    InvalidSource,
    /// Invalid range passed to a `create_*`/slice operation.
    Slice(SliceError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName {
                existing,
                attempted,
            } => match existing {
                Some(existing) => {
                    write!(f, "name clash '{existing}' vs '{attempted}'")
                }
                None => write!(f, "name already used: '{attempted}'"),
            },
            Self::InvalidSource => write!(f, "artifact source must be non-empty"),
            Self::Slice(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<SliceError> for CoreError {
    fn from(e: SliceError) -> Self {
        Self::Slice(e)
    }
}
