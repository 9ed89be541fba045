//! Drives the full pipeline — ingest, built-in examiners, the fixpoint
//! driver, and HTML rendering — the way `strata-cli` does.

use strata_core::{Excavation, ExcavationConfig};
use strata_examine::{ExaminationDriver, RecordSplitExaminer, SameSameExaminer};
use strata_report::render_excavation;

#[test]
fn full_pipeline_produces_a_report_for_every_artifact() {
    let top = Excavation::new(ExcavationConfig::default());
    top.add_examiner(Box::new(SameSameExaminer));
    top.add_examiner(Box::new(RecordSplitExaminer::new(5)));

    top.ingest(b"0123456789abcde").unwrap();
    ExaminationDriver::new().run(&top).unwrap();

    assert!(top.artifact_count() > 1);

    let dir = tempfile::tempdir().unwrap();
    render_excavation(&top, dir.path(), "./").unwrap();

    let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(index.contains("Top-level artifacts"));

    let page_count = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(page_count, top.artifact_count() + 1);
}

#[test]
fn divergence_bound_trips_before_report_rendering() {
    struct InfiniteSplitter;
    impl strata_core::Examiner for InfiniteSplitter {
        fn name(&self) -> &str {
            "infinite-splitter"
        }
        fn examine(&self, artifact: &strata_core::Artifact) -> Result<(), strata_core::ExaminerFailure> {
            if artifact.len() < 2 {
                return Ok(());
            }
            let mid = artifact.len() / 2;
            artifact.create_slice(0, mid).unwrap();
            artifact.create_slice(mid, artifact.len()).unwrap();
            Ok(())
        }
    }

    let top = Excavation::new(ExcavationConfig {
        max_artifacts: Some(4),
        ..ExcavationConfig::default()
    });
    top.add_examiner(Box::new(InfiniteSplitter));
    top.ingest(b"0123456789abcdef").unwrap();

    let err = ExaminationDriver::new().run(&top).unwrap_err();
    assert!(matches!(
        err,
        strata_examine::DriverError::ExaminationDiverged { limit: 4, .. }
    ));
}
