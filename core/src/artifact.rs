//! Artifacts: content-addressed nodes of the derivation DAG.
//!
//! An [`Artifact`] is a cheap, `Clone`-able handle `(Rc<Excavation>,
//! ArtifactId)` into an arena owned by the excavation. All mutation goes
//! through that arena via `RefCell`, consistent with the single-threaded
//! cooperative scheduling model the examination driver runs under.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::byte_source::ByteSource;
use crate::error::CoreError;
use crate::excavation::{Excavation, ParentRef};

/// Stable handle into an excavation's artifact arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactId(pub(crate) u32);

impl ArtifactId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    /// Builds a handle from a raw arena index. Only meaningful when
    /// `index` was itself obtained from this excavation (e.g. via
    /// [`crate::excavation::Excavation::artifact_count`]); out-of-range
    /// ids panic on first use against [`crate::excavation::Excavation::artifact`].
    #[must_use]
    pub fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// The raw arena index this handle refers to.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One entry in an artifact's derivation log: `child` was produced from
/// `[start, stop)` of the parent's bytes, or from the parent's whole
/// content when `start`/`stop` are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEntry {
    pub start: Option<usize>,
    pub stop: Option<usize>,
    pub child: ArtifactId,
}

/// A capability an examiner attaches to an artifact to describe a
/// structured reading of its bytes (e.g. "this is a directory of
/// records"). Rendering of an interpretation is the report crate's job;
/// `strata-core` only carries the trait object around.
pub trait Interpretation {
    /// A short, human-readable label for this interpretation.
    fn label(&self) -> &str;
    /// Render the interpretation body as plain text. `strata-report`
    /// escapes this before writing it into a page.
    fn render(&self) -> String;
}

/// External byte→glyph display policy, supplied by a format examiner.
/// `strata-core` defines only the seam; no default policy ships here.
pub trait TypeCase {
    fn glyph(&self, byte: u8) -> char;
}

/// The arena-resident state of one artifact. Never exposed directly;
/// all access goes through [`Artifact`]'s methods.
pub(crate) struct ArtifactData {
    pub(crate) digest: String,
    pub(crate) bytes: ByteSource,
    pub(crate) parents: Vec<ArtifactId>,
    pub(crate) children: Vec<ArtifactId>,
    pub(crate) layout: Vec<LayoutEntry>,
    pub(crate) named: Option<String>,
    pub(crate) notes: BTreeSet<String>,
    pub(crate) types: BTreeSet<String>,
    pub(crate) descriptions: Vec<String>,
    pub(crate) comments: Vec<String>,
    pub(crate) interpretations: Vec<(String, Box<dyn Interpretation>)>,
    pub(crate) taken: Cell<bool>,
    pub(crate) index_representation: RefCell<Option<String>>,
}

impl ArtifactData {
    pub(crate) fn new(digest: String, bytes: ByteSource) -> Self {
        Self {
            digest,
            bytes,
            parents: Vec::new(),
            children: Vec::new(),
            layout: Vec::new(),
            named: None,
            notes: BTreeSet::new(),
            types: BTreeSet::new(),
            descriptions: Vec::new(),
            comments: Vec::new(),
            interpretations: Vec::new(),
            taken: Cell::new(false),
            index_representation: RefCell::new(None),
        }
    }
}

/// A handle to one node of the derivation DAG.
#[derive(Clone)]
pub struct Artifact {
    pub(crate) top: Rc<Excavation>,
    pub(crate) id: ArtifactId,
}

impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Rc::ptr_eq(&self.top, &other.top)
    }
}

impl Eq for Artifact {}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact").field("id", &self.id).finish()
    }
}

impl Artifact {
    pub(crate) fn new(top: Rc<Excavation>, id: ArtifactId) -> Self {
        Self { top, id }
    }

    /// This artifact's stable arena handle.
    #[must_use]
    pub fn id(&self) -> ArtifactId {
        self.id
    }

    /// Hex SHA-256 digest of this artifact's bytes (its identity).
    #[must_use]
    pub fn digest(&self) -> String {
        self.top.with_data(self.id, |d| d.digest.clone())
    }

    /// Length of this artifact's byte stream.
    #[must_use]
    pub fn len(&self) -> usize {
        self.top.with_data(self.id, |d| d.bytes.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A zero-copy view of this artifact's byte source.
    #[must_use]
    pub fn bytes(&self) -> ByteSource {
        self.top.with_data(self.id, |d| d.bytes.clone())
    }

    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.top.with_data(self.id, |d| d.named.clone())
    }

    #[must_use]
    pub fn parents(&self) -> Vec<ArtifactId> {
        self.top.with_data(self.id, |d| d.parents.clone())
    }

    #[must_use]
    pub fn children(&self) -> Vec<ArtifactId> {
        self.top.with_data(self.id, |d| d.children.clone())
    }

    #[must_use]
    pub fn layout(&self) -> Vec<LayoutEntry> {
        self.top.with_data(self.id, |d| d.layout.clone())
    }

    #[must_use]
    pub fn descriptions(&self) -> Vec<String> {
        self.top.with_data(self.id, |d| d.descriptions.clone())
    }

    #[must_use]
    pub fn comments(&self) -> Vec<String> {
        self.top.with_data(self.id, |d| d.comments.clone())
    }

    #[must_use]
    pub fn is_taken(&self) -> bool {
        self.top.with_data(self.id, |d| d.taken.get())
    }

    pub fn set_taken(&self, taken: bool) {
        self.top.with_data(self.id, |d| d.taken.set(taken));
    }

    /// Number of interpretations registered against this artifact.
    #[must_use]
    pub fn interpretation_count(&self) -> usize {
        self.top.with_data(self.id, |d| d.interpretations.len())
    }

    /// Renders every registered interpretation, in registration order,
    /// as `(label, body)` pairs.
    #[must_use]
    pub fn render_interpretations(&self) -> Vec<(String, String)> {
        self.top.with_data(self.id, |d| {
            d.interpretations
                .iter()
                .map(|(label, interp)| (label.clone(), interp.render()))
                .collect()
        })
    }

    // -- create family --------------------------------------------------

    /// Creates (or dedups onto) a child artifact whose bytes are exactly
    /// `bits`. Appends a whole-content (`None, None`) layout entry.
    ///
    /// # Errors
    /// [`CoreError::InvalidSource`] if `bits` is empty.
    pub fn create_bits(&self, bits: &[u8]) -> Result<Artifact, CoreError> {
        if bits.is_empty() {
            return Err(CoreError::InvalidSource);
        }
        let source = ByteSource::from_vec(bits.to_vec());
        self.create_from_source(source, None, None)
    }

    /// Creates (or dedups onto) a child artifact from a scatter/gather
    /// list of sources, concatenated in order. Appends a whole-content
    /// layout entry.
    ///
    /// # Errors
    /// [`CoreError::InvalidSource`] if the concatenated length is zero.
    pub fn create_records(&self, records: Vec<ByteSource>) -> Result<Artifact, CoreError> {
        let mut flat = Vec::new();
        for record_source in records {
            for chunk in record_source.iter_chunks() {
                flat.push(crate::byte_source::Record::new(
                    Rc::from(chunk.to_vec().into_boxed_slice()),
                    0,
                    chunk.len(),
                )?);
            }
        }
        let source = ByteSource::from_records(flat);
        if source.is_empty() {
            return Err(CoreError::InvalidSource);
        }
        self.create_from_source(source, None, None)
    }

    /// Creates (or dedups onto) a child artifact from `[start, stop)` of
    /// this artifact's bytes. If the range spans the whole artifact,
    /// returns `self` unchanged without extending the layout (spec
    /// property: slicing the full extent is a no-op).
    ///
    /// # Errors
    /// [`CoreError::InvalidSource`] if the range is empty;
    /// [`CoreError::Slice`] if it is out of bounds.
    pub fn create_slice(&self, start: usize, stop: usize) -> Result<Artifact, CoreError> {
        if start == 0 && stop == self.len() {
            return Ok(self.clone());
        }
        let source = self.top.with_data(self.id, |d| d.bytes.slice(start, stop))?;
        self.create_from_source(source, Some(start), Some(stop))
    }

    fn create_from_source(
        &self,
        source: ByteSource,
        start: Option<usize>,
        stop: Option<usize>,
    ) -> Result<Artifact, CoreError> {
        let child_id = self.top.intern(ParentRef::Node(self.id), source)?;
        self.top.with_data_mut(self.id, |d| {
            d.layout.push(LayoutEntry {
                start,
                stop,
                child: child_id,
            });
            d.children.push(child_id);
        });
        Ok(self.top.artifact(child_id))
    }

    // -- metadata ---------------------------------------------------------

    /// Claims `name` for this artifact.
    ///
    /// A no-op if `name` already is this artifact's name. If `name` is
    /// already claimed by another artifact: demotes to a note on `self`
    /// when `fallback` is `true`, otherwise returns
    /// [`CoreError::DuplicateName`].
    ///
    /// # Errors
    /// [`CoreError::DuplicateName`] when `fallback` is `false` and the
    /// name is already taken.
    pub fn set_name(&self, name: impl Into<String>, fallback: bool) -> Result<(), CoreError> {
        let name = name.into();
        let current = self.name();
        if current.as_deref() == Some(name.as_str()) {
            return Ok(());
        }
        if self.top.name_taken(&name) {
            if fallback {
                self.add_note(name);
                return Ok(());
            }
            return Err(CoreError::DuplicateName {
                existing: current,
                attempted: name,
            });
        }
        if let Some(old) = &current {
            self.top.release_name(old);
        }
        self.top.claim_name(name.clone());
        self.top.with_data_mut(self.id, |d| d.named = Some(name.clone()));
        self.top.add_to_index(name, self.id);
        Ok(())
    }

    /// Adds a free-form note, registering it in the excavation's global
    /// index.
    pub fn add_note(&self, note: impl Into<String>) {
        let note = note.into();
        self.top.with_data_mut(self.id, |d| {
            d.notes.insert(note.clone());
        });
        self.top.add_to_index(note, self.id);
        self.invalidate_summary();
    }

    /// Adds a type tag, registering it in the excavation's global index.
    pub fn add_type(&self, type_name: impl Into<String>) {
        let type_name = type_name.into();
        self.top.with_data_mut(self.id, |d| {
            d.types.insert(type_name.clone());
        });
        self.top.add_to_index(type_name, self.id);
        self.invalidate_summary();
    }

    /// Adds a free-text description line.
    pub fn add_description(&self, description: impl Into<String>) {
        self.top
            .with_data_mut(self.id, |d| d.descriptions.push(description.into()));
        self.invalidate_summary();
    }

    /// Adds a comment. Implicitly adds the `"Has Comment"` note.
    pub fn add_comment(&self, comment: impl Into<String>) {
        self.top
            .with_data_mut(self.id, |d| d.comments.push(comment.into()));
        self.add_note("Has Comment");
    }

    /// Registers an interpretation under `label`.
    pub fn add_interpretation(&self, label: impl Into<String>, interpretation: Box<dyn Interpretation>) {
        self.top
            .with_data_mut(self.id, |d| d.interpretations.push((label.into(), interpretation)));
    }

    fn invalidate_summary(&self) {
        self.top
            .with_data(self.id, |d| *d.index_representation.borrow_mut() = None);
    }

    /// All type tags on this artifact, plus (if `recursive`) every
    /// descendant's type tags. Visits each descendant at most once even
    /// across a shared-child DAG.
    #[must_use]
    pub fn iter_types(&self, recursive: bool) -> BTreeSet<String> {
        self.collect_tagged(recursive, |d| d.types.clone())
    }

    /// All notes on this artifact, plus (if `recursive`) every
    /// descendant's notes. Visits each descendant at most once even
    /// across a shared-child DAG.
    #[must_use]
    pub fn iter_notes(&self, recursive: bool) -> BTreeSet<String> {
        self.collect_tagged(recursive, |d| d.notes.clone())
    }

    fn collect_tagged(
        &self,
        recursive: bool,
        extract: impl Fn(&ArtifactData) -> BTreeSet<String>,
    ) -> BTreeSet<String> {
        let mut out = self.top.with_data(self.id, &extract);
        if !recursive {
            return out;
        }
        let mut visited = std::collections::HashSet::new();
        visited.insert(self.id);
        let mut stack = self.children();
        while let Some(child_id) = stack.pop() {
            if !visited.insert(child_id) {
                continue;
            }
            let (tags, grandchildren) = self
                .top
                .with_data(child_id, |d| (extract(d), d.children.clone()));
            out.extend(tags);
            stack.extend(grandchildren);
        }
        out
    }

    /// Reconciles this artifact's derivation layout against its full
    /// byte range, synthesizing gap children for any uncovered span.
    /// A no-op if no layout entry has concrete `(start, stop)` bounds.
    ///
    /// # Errors
    /// Propagates a [`CoreError`] from the gap `create_slice` calls
    /// (should not occur for well-formed layouts).
    pub fn examined(&self) -> Result<(), CoreError> {
        let mut concrete: Vec<(usize, usize)> = self
            .layout()
            .into_iter()
            .filter_map(|entry| match (entry.start, entry.stop) {
                (Some(start), Some(stop)) => Some((start, stop)),
                _ => None,
            })
            .collect();
        if concrete.is_empty() {
            return Ok(());
        }
        concrete.sort_unstable();
        let mut cursor = 0usize;
        for (start, stop) in concrete {
            if cursor < start {
                self.create_slice(cursor, start)?;
            }
            cursor = cursor.max(start).max(stop);
        }
        let total = self.len();
        if cursor < total {
            self.create_slice(cursor, total)?;
        }
        Ok(())
    }

    /// One-line description: `⟦name-or-digest-prefix⟧ (length bytes)`,
    /// optionally followed by notes (truncated to 35, with a trailing
    /// ellipsis) and wrapped in a link when rendered by the report
    /// crate. Memoizes into `index_representation` only when `link &&
    /// ident`, matching the original's caching gate.
    #[must_use]
    pub fn summary(&self, link: bool, ident: bool, show_notes: bool) -> String {
        if link && ident {
            if let Some(cached) = self
                .top
                .with_data(self.id, |d| d.index_representation.borrow().clone())
            {
                return cached;
            }
        }
        let label = self.top.display_name(self.id);
        let mut text = format!("{label} ({} bytes)", self.len());
        if show_notes {
            let notes = self.iter_notes(false);
            if !notes.is_empty() {
                let mut joined = notes.into_iter().collect::<Vec<_>>().join(", ");
                if joined.len() > 35 {
                    joined.truncate(35);
                    joined.push('…');
                }
                text.push_str(" — ");
                text.push_str(&joined);
            }
        }
        if link && ident {
            self.top
                .with_data(self.id, |d| *d.index_representation.borrow_mut() = Some(text.clone()));
        }
        text
    }
}
