//! The fixpoint examination loop (C4).
//!
//! Visits every top-level artifact, and transitively every artifact any
//! examiner derives from one, exactly once per examiner, until the work
//! queue is empty or the excavation's divergence bound trips.

use std::collections::{HashSet, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use strata_core::{ArtifactId, Excavation};

use crate::error::DriverError;

/// Drives an excavation's registered examiners to fixpoint.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExaminationDriver;

impl ExaminationDriver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs every registered examiner over every artifact reachable
    /// from `excavation`'s top level, in FIFO order, until the queue
    /// empties.
    ///
    /// # Errors
    /// [`DriverError::ExaminationDiverged`] if the arena grows past
    /// `excavation.config().max_artifacts`. Individual examiner
    /// failures (an `Err` return or a caught panic) are never fatal:
    /// they become a comment on the offending artifact and the run
    /// continues.
    pub fn run(&self, excavation: &Rc<Excavation>) -> Result<(), DriverError> {
        let mut queue: VecDeque<ArtifactId> = excavation.top_level().into();
        let mut seen: HashSet<ArtifactId> = queue.iter().copied().collect();

        while let Some(id) = queue.pop_front() {
            let artifact = excavation.artifact(id);

            excavation.with_examiners(|examiners| {
                for examiner in examiners {
                    if artifact.is_taken() {
                        break;
                    }
                    if !examiner.accepts(&artifact) {
                        continue;
                    }
                    let before = excavation.artifact_count();
                    let outcome = catch_unwind(AssertUnwindSafe(|| examiner.examine(&artifact)));
                    match outcome {
                        Ok(Ok(())) => {}
                        Ok(Err(failure)) => {
                            artifact.add_comment(format!(
                                "examiner {} failed: {failure}",
                                examiner.name()
                            ));
                        }
                        Err(panic) => {
                            let detail = panic_message(&panic);
                            artifact.add_comment(format!(
                                "examiner {} failed: panicked: {detail}",
                                examiner.name()
                            ));
                        }
                    }
                    enqueue_new_arrivals(excavation, before, &mut queue, &mut seen);
                }
            });

            let before = excavation.artifact_count();
            // Coverage reconciliation can itself synthesize gap children;
            // a malformed layout should not abort the whole run, so any
            // error from it is swallowed into a comment just like an
            // examiner failure would be.
            if let Err(e) = artifact.examined() {
                artifact.add_comment(format!("coverage reconciliation failed: {e}"));
            }
            enqueue_new_arrivals(excavation, before, &mut queue, &mut seen);

            if let Some(limit) = excavation.config().max_artifacts {
                let actual = excavation.artifact_count();
                if actual > limit {
                    return Err(DriverError::ExaminationDiverged { limit, actual });
                }
            }
        }

        Ok(())
    }
}

fn enqueue_new_arrivals(
    excavation: &Rc<Excavation>,
    before: usize,
    queue: &mut VecDeque<ArtifactId>,
    seen: &mut HashSet<ArtifactId>,
) {
    let after = excavation.artifact_count();
    for raw in before..after {
        let id = ArtifactId::from_index(u32::try_from(raw).expect("arena fits in u32"));
        if seen.insert(id) {
            queue.push_back(id);
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
