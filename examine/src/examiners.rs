//! Small, format-agnostic generic examiners.
//!
//! Neither of these claims to recognize a real recovered format; they
//! exist so the driver and report renderer have real, non-trivial
//! traffic to exercise end to end without an external format
//! collaborator.

use strata_core::{Artifact, Examiner, ExaminerFailure};

/// Notes when an artifact's content is identical to content reachable
/// from more than one distinct parent, surfacing the existing dedup
/// mechanism as an explicit cross-reference rather than a silent merge.
#[derive(Debug, Default, Clone, Copy)]
pub struct SameSameExaminer;

impl Examiner for SameSameExaminer {
    fn name(&self) -> &str {
        "same-same"
    }

    fn examine(&self, artifact: &Artifact) -> Result<(), ExaminerFailure> {
        let mut parents = artifact.parents();
        parents.sort_unstable();
        parents.dedup();
        if parents.len() > 1 {
            artifact.add_note(format!(
                "same-same: identical content reachable from {} other location(s)",
                parents.len() - 1
            ));
        }
        Ok(())
    }
}

/// Splits an artifact into fixed-size chunks, modeling the "peel off a
/// record container" step a tagged/segmented format examiner performs,
/// generalized away from any particular tag format.
#[derive(Debug, Clone, Copy)]
pub struct RecordSplitExaminer {
    pub chunk_size: usize,
}

impl RecordSplitExaminer {
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }
}

impl Examiner for RecordSplitExaminer {
    fn name(&self) -> &str {
        "record-split"
    }

    fn accepts(&self, artifact: &Artifact) -> bool {
        self.chunk_size > 0 && artifact.len() > self.chunk_size
    }

    fn examine(&self, artifact: &Artifact) -> Result<(), ExaminerFailure> {
        if artifact.is_taken() {
            return Ok(());
        }
        artifact.set_taken(true);
        artifact.add_type("fixed-size-record-container");
        let len = artifact.len();
        let mut offset = 0usize;
        while offset < len {
            let end = (offset + self.chunk_size).min(len);
            artifact
                .create_slice(offset, end)
                .map_err(|e| ExaminerFailure(e.to_string()))?;
            offset = end;
        }
        Ok(())
    }
}
