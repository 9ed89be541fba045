//! End-to-end tests of the seven graph invariants, run across
//! `strata-core` and `strata-examine` together.

use std::collections::HashSet;

use strata_core::{Artifact, CoreError, Examiner, ExaminerFailure, Excavation, ExcavationConfig};
use strata_examine::ExaminationDriver;

fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[test]
fn property_identity_is_content_addressed() {
    let top = Excavation::new(ExcavationConfig::default());
    let a = top.ingest(b"parent-a").unwrap();
    let b = top.ingest(b"parent-b").unwrap();
    let via_a = a.create_bits(b"shared").unwrap();
    let via_b = b.create_bits(b"shared").unwrap();

    assert_eq!(via_a.id(), via_b.id());
    assert_eq!(via_a.digest(), via_b.digest());
    let mut parents = via_a.parents();
    parents.sort_unstable();
    let mut expected = vec![a.id(), b.id()];
    expected.sort_unstable();
    assert_eq!(parents, expected);
}

#[test]
fn property_whole_self_slice_is_identity() {
    let top = Excavation::new(ExcavationConfig::default());
    let a = top.ingest(b"0123456789").unwrap();
    let same = a.create_slice(0, a.len()).unwrap();
    assert_eq!(same.id(), a.id());
    assert!(a.layout().is_empty());
}

#[test]
fn property_layout_reconciles_to_full_range() {
    let top = Excavation::new(ExcavationConfig::default());
    let a = top.ingest(b"AAAABBBBCCCC").unwrap();
    a.create_slice(4, 8).unwrap();
    a.examined().unwrap();

    let mut covered = vec![false; a.len()];
    for entry in a.layout() {
        if let (Some(start), Some(stop)) = (entry.start, entry.stop) {
            for byte in covered.iter_mut().take(stop).skip(start) {
                *byte = true;
            }
        }
    }
    assert!(covered.into_iter().all(|c| c));
}

#[test]
fn property_name_uniqueness_has_no_duplicates() {
    let top = Excavation::new(ExcavationConfig::default());
    let a = top.ingest(b"one").unwrap();
    let b = top.ingest(b"two").unwrap();
    a.set_name("alpha", false).unwrap();
    assert!(b.set_name("alpha", false).is_err());

    let names = top.names();
    let mut unique: HashSet<&str> = HashSet::new();
    for name in &names {
        assert!(unique.insert(name.as_str()), "duplicate name in top.names()");
    }
}

#[test]
fn property_index_completeness() {
    let top = Excavation::new(ExcavationConfig::default());
    let a = top.ingest(b"one").unwrap();
    a.add_note("flagged");
    a.add_type("segment");
    a.set_name("alpha", false).unwrap();

    let index = top.index();
    assert!(index.get("flagged").is_some_and(|ids| ids.contains(&a.id())));
    assert!(index.get("segment").is_some_and(|ids| ids.contains(&a.id())));
}

#[test]
fn property_recursive_iteration_visits_each_descendant_once() {
    let top = Excavation::new(ExcavationConfig::default());
    let root = top.ingest(b"aaaabbbb").unwrap();
    let left = root.create_slice(0, 4).unwrap();
    let right = root.create_slice(4, 8).unwrap();
    let shared = left.create_bits(b"shared-leaf").unwrap();
    let shared_again = right.create_bits(b"shared-leaf").unwrap();
    assert_eq!(shared.id(), shared_again.id());
    shared.add_note("leaf-note");

    // A diamond: root -> {left, right} -> shared. Recursive iteration
    // must still report the note exactly once in the resulting set.
    let notes = root.iter_notes(true);
    assert_eq!(notes.iter().filter(|n| n.as_str() == "leaf-note").count(), 1);
}

#[test]
fn property_digest_equals_recomputed_hash() {
    let top = Excavation::new(ExcavationConfig::default());
    let a = top.ingest(b"digest me").unwrap();
    assert_eq!(a.digest(), sha256_hex(&a.bytes().to_bytes()));
}

#[test]
fn scenario_s1_exact_split_with_no_gaps() {
    struct Splitter;
    impl Examiner for Splitter {
        fn name(&self) -> &str {
            "s1-splitter"
        }
        fn examine(&self, artifact: &Artifact) -> Result<(), ExaminerFailure> {
            if artifact.is_taken() {
                return Ok(());
            }
            artifact.set_taken(true);
            artifact.create_slice(0, 4).unwrap();
            artifact.create_slice(4, 8).unwrap();
            Ok(())
        }
    }

    let top = Excavation::new(ExcavationConfig::default());
    top.add_examiner(Box::new(Splitter));
    let root = top.ingest(b"AAAABBBB").unwrap();
    ExaminationDriver::new().run(&top).unwrap();

    let layout = root.layout();
    assert_eq!(layout.len(), 2);
    let first = top.artifact(layout[0].child);
    let second = top.artifact(layout[1].child);
    assert_eq!(first.digest(), sha256_hex(b"AAAA"));
    assert_eq!(second.digest(), sha256_hex(b"BBBB"));
}

#[test]
fn scenario_s2_partial_claim_synthesises_two_gaps() {
    struct PartialClaimer;
    impl Examiner for PartialClaimer {
        fn name(&self) -> &str {
            "s2-partial-claimer"
        }
        fn examine(&self, artifact: &Artifact) -> Result<(), ExaminerFailure> {
            if artifact.is_taken() {
                return Ok(());
            }
            artifact.set_taken(true);
            artifact.create_slice(2, 6).unwrap();
            Ok(())
        }
    }

    let top = Excavation::new(ExcavationConfig::default());
    top.add_examiner(Box::new(PartialClaimer));
    let root = top.ingest(b"AAAABBBB").unwrap();
    ExaminationDriver::new().run(&top).unwrap();

    let concrete: Vec<_> = root
        .layout()
        .into_iter()
        .filter(|e| matches!((e.start, e.stop), (Some(_), Some(_))))
        .collect();
    assert_eq!(concrete.len(), 3);
    let gap_a = top.artifact(concrete[0].child);
    let gap_b = top.artifact(concrete[2].child);
    assert_eq!(gap_a.digest(), sha256_hex(b"AA"));
    assert_eq!(gap_b.digest(), sha256_hex(b"BB"));
}

#[test]
fn scenario_s3_two_parents_dedup_to_one_artifact() {
    struct Stamp;
    impl Examiner for Stamp {
        fn name(&self) -> &str {
            "s3-stamp"
        }
        fn examine(&self, artifact: &Artifact) -> Result<(), ExaminerFailure> {
            if artifact.is_taken() {
                return Ok(());
            }
            artifact.set_taken(true);
            artifact.create_bits(b"XYZ").unwrap();
            Ok(())
        }
    }

    let top = Excavation::new(ExcavationConfig::default());
    top.add_examiner(Box::new(Stamp));
    let a = top.ingest(b"parent-one").unwrap();
    let b = top.ingest(b"parent-two").unwrap();
    ExaminationDriver::new().run(&top).unwrap();

    let expected_digest = sha256_hex(b"XYZ");
    let matches: Vec<_> = (0..top.artifact_count())
        .map(|i| top.artifact(strata_core::ArtifactId::from_index(i as u32)))
        .filter(|art| art.digest() == expected_digest)
        .collect();
    assert_eq!(matches.len(), 1);
    let mut parents = matches[0].parents();
    parents.sort_unstable();
    let mut expected = vec![a.id(), b.id()];
    expected.sort_unstable();
    assert_eq!(parents, expected);
}

#[test]
fn scenario_s4_fallback_demotes_duplicate_name_to_note() {
    let top = Excavation::new(ExcavationConfig::default());
    let a = top.ingest(b"one").unwrap();
    let b = top.ingest(b"two").unwrap();
    a.set_name("alpha", false).unwrap();
    b.set_name("alpha", true).unwrap();

    assert_eq!(a.name().as_deref(), Some("alpha"));
    assert_eq!(b.name(), None);
    assert!(b.iter_notes(false).contains("alpha"));
    let holders = top.index().get("alpha").cloned().unwrap_or_default();
    assert!(holders.contains(&a.id()));
    assert!(holders.contains(&b.id()));
}

#[test]
fn scenario_s5_empty_input_fails_with_invalid_source() {
    let top = Excavation::new(ExcavationConfig::default());
    assert_eq!(top.ingest(&[]).unwrap_err(), CoreError::InvalidSource);
    let parent = top.ingest(b"non-empty").unwrap();
    assert_eq!(parent.create_bits(&[]).unwrap_err(), CoreError::InvalidSource);
}

#[test]
fn scenario_s6_examiner_panic_becomes_comment_and_run_succeeds() {
    struct Exploder;
    impl Examiner for Exploder {
        fn name(&self) -> &str {
            "exploder"
        }
        fn examine(&self, _artifact: &Artifact) -> Result<(), ExaminerFailure> {
            Err(ExaminerFailure("deliberate failure".to_string()))
        }
    }

    let top = Excavation::new(ExcavationConfig::default());
    top.add_examiner(Box::new(Exploder));
    let root = top.ingest(b"whatever").unwrap();
    let result = ExaminationDriver::new().run(&top);

    assert!(result.is_ok());
    assert!(root
        .comments()
        .iter()
        .any(|c| c.starts_with("examiner ") && c.contains("deliberate failure")));
}
