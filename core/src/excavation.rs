//! The excavation: process-wide registry and arena owner.
//!
//! `Excavation` is the root of one artifact graph. It owns the
//! append-only arena every [`Artifact`] handle indexes into, the
//! digest→id dedup table, the name set, the global note/type index, and
//! the registered examiners. There is exactly one excavation per run;
//! it is never torn down mid-run, matching the single-threaded
//! cooperative scheduling model the examination driver assumes.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::rc::Rc;

use crate::artifact::{Artifact, ArtifactData, ArtifactId, TypeCase};
use crate::byte_source::ByteSource;
use crate::error::CoreError;
use crate::examiner::Examiner;

/// The two legal shapes of an artifact's parent: the excavation itself
/// (top-level admission) or another artifact. Closed sum type standing
/// in for the duck-typed "parent" capability the original engine
/// expresses structurally; there are exactly two kinds of parent here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParentRef {
    Root,
    Node(ArtifactId),
}

/// Tunables for one excavation run.
#[derive(Debug, Clone)]
pub struct ExcavationConfig {
    /// Number of hex digest characters used as the default display name
    /// for an unnamed artifact.
    pub digest_prefix: usize,
    /// Maximum number of bytes a hexdump renders before truncating.
    pub hexdump_limit: usize,
    /// Divergence bound: the driver aborts once the arena exceeds this
    /// many artifacts. `None` is unbounded.
    pub max_artifacts: Option<usize>,
}

impl Default for ExcavationConfig {
    fn default() -> Self {
        Self {
            digest_prefix: 16,
            hexdump_limit: 256,
            max_artifacts: None,
        }
    }
}

/// The root registry and arena owner for one artifact graph.
pub struct Excavation {
    arena: RefCell<Vec<ArtifactData>>,
    hashes: RefCell<HashMap<String, ArtifactId>>,
    names: RefCell<HashSet<String>>,
    index: RefCell<BTreeMap<String, BTreeSet<ArtifactId>>>,
    examiners: RefCell<Vec<Box<dyn Examiner>>>,
    top_level: RefCell<Vec<ArtifactId>>,
    type_case: RefCell<Option<Box<dyn TypeCase>>>,
    config: ExcavationConfig,
}

impl Excavation {
    /// Creates a fresh, empty excavation.
    #[must_use]
    pub fn new(config: ExcavationConfig) -> Rc<Self> {
        Rc::new(Self {
            arena: RefCell::new(Vec::new()),
            hashes: RefCell::new(HashMap::new()),
            names: RefCell::new(HashSet::new()),
            index: RefCell::new(BTreeMap::new()),
            examiners: RefCell::new(Vec::new()),
            top_level: RefCell::new(Vec::new()),
            type_case: RefCell::new(None),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ExcavationConfig {
        &self.config
    }

    /// Registers an examiner. Examiners run in registration order.
    pub fn add_examiner(self: &Rc<Self>, examiner: Box<dyn Examiner>) {
        self.examiners.borrow_mut().push(examiner);
    }

    /// Installs the format-specific byte→glyph display policy.
    pub fn set_type_case(self: &Rc<Self>, type_case: Box<dyn TypeCase>) {
        *self.type_case.borrow_mut() = Some(type_case);
    }

    #[must_use]
    pub fn glyph(&self, byte: u8) -> char {
        self.type_case
            .borrow()
            .as_ref()
            .map_or_else(|| default_glyph(byte), |tc| tc.glyph(byte))
    }

    /// Runs `f` over the registered examiners, in registration order.
    pub fn with_examiners<R>(&self, f: impl FnOnce(&[Box<dyn Examiner>]) -> R) -> R {
        f(&self.examiners.borrow())
    }

    /// Admits `bits` as a new top-level artifact (or dedups onto an
    /// existing one).
    ///
    /// # Errors
    /// [`CoreError::InvalidSource`] if `bits` is empty.
    pub fn ingest(self: &Rc<Self>, bits: &[u8]) -> Result<Artifact, CoreError> {
        if bits.is_empty() {
            return Err(CoreError::InvalidSource);
        }
        let source = ByteSource::from_vec(bits.to_vec());
        let id = self.intern(ParentRef::Root, source)?;
        Ok(self.artifact(id))
    }

    pub(crate) fn intern(self: &Rc<Self>, parent: ParentRef, source: ByteSource) -> Result<ArtifactId, CoreError> {
        if source.is_empty() {
            return Err(CoreError::InvalidSource);
        }
        let digest = source.sha256_hex();
        if let Some(&existing) = self.hashes.borrow().get(&digest) {
            if let ParentRef::Node(parent_id) = parent {
                self.with_data_mut(existing, |d| d.parents.push(parent_id));
            }
            return Ok(existing);
        }
        let id = {
            let mut arena = self.arena.borrow_mut();
            let id = ArtifactId(u32::try_from(arena.len()).expect("arena fits in u32"));
            arena.push(ArtifactData::new(digest.clone(), source));
            id
        };
        self.hashes.borrow_mut().insert(digest, id);
        match parent {
            ParentRef::Root => self.top_level.borrow_mut().push(id),
            ParentRef::Node(parent_id) => self.with_data_mut(id, |d| d.parents.push(parent_id)),
        }
        Ok(id)
    }

    /// A handle to the artifact identified by `id`.
    ///
    /// # Panics
    /// If `id` does not belong to this excavation's arena.
    #[must_use]
    pub fn artifact(self: &Rc<Self>, id: ArtifactId) -> Artifact {
        assert!(
            id.index() < self.arena.borrow().len(),
            "artifact id {id} does not belong to this excavation"
        );
        Artifact::new(Rc::clone(self), id)
    }

    #[must_use]
    pub fn artifact_count(&self) -> usize {
        self.arena.borrow().len()
    }

    #[must_use]
    pub fn top_level(&self) -> Vec<ArtifactId> {
        self.top_level.borrow().clone()
    }

    #[must_use]
    pub fn names(&self) -> HashSet<String> {
        self.names.borrow().clone()
    }

    #[must_use]
    pub fn index(&self) -> BTreeMap<String, BTreeSet<ArtifactId>> {
        self.index.borrow().clone()
    }

    pub(crate) fn name_taken(&self, name: &str) -> bool {
        self.names.borrow().contains(name)
    }

    pub(crate) fn claim_name(&self, name: String) {
        self.names.borrow_mut().insert(name);
    }

    pub(crate) fn release_name(&self, name: &str) {
        self.names.borrow_mut().remove(name);
    }

    pub(crate) fn add_to_index(&self, key: String, id: ArtifactId) {
        self.index.borrow_mut().entry(key).or_default().insert(id);
    }

    /// Canonical display name: the artifact's claimed name, or else the
    /// `digest_prefix`-length prefix of its hex digest — either way
    /// wrapped in `⟦…⟧`.
    #[must_use]
    pub fn display_name(&self, id: ArtifactId) -> String {
        let (named, digest) = self.with_data(id, |d| (d.named.clone(), d.digest.clone()));
        let label = named.unwrap_or_else(|| {
            let end = self.config.digest_prefix.min(digest.len());
            digest[..end].to_string()
        });
        format!("\u{27e6}{label}\u{27e7}")
    }

    pub(crate) fn with_data<R>(&self, id: ArtifactId, f: impl FnOnce(&ArtifactData) -> R) -> R {
        let arena = self.arena.borrow();
        f(&arena[id.index()])
    }

    pub(crate) fn with_data_mut<R>(&self, id: ArtifactId, f: impl FnOnce(&mut ArtifactData) -> R) -> R {
        let mut arena = self.arena.borrow_mut();
        f(&mut arena[id.index()])
    }
}

fn default_glyph(byte: u8) -> char {
    if byte.is_ascii_graphic() || byte == b' ' {
        byte as char
    } else {
        '.'
    }
}
