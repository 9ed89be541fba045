//! HTML report rendering (C6).
//!
//! Every function here is read-only with respect to the excavation: no
//! renderer ever calls a mutating `Artifact`/`Excavation` method. All
//! artifact-controlled text is escaped via `html_escape::encode_text`
//! before it reaches a page.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use std::rc::Rc;

use html_escape::encode_text;
use strata_core::{ArtifactId, Excavation, LayoutEntry};

use crate::error::ReportError;
use crate::hexdump::write_hexdump;

/// Renders every artifact in `excavation` plus an index page into
/// `html_dir`.
///
/// # Errors
/// [`ReportError::IoFailure`] on any filesystem error.
pub fn render_excavation(
    excavation: &Rc<Excavation>,
    html_dir: &Path,
    link_prefix: &str,
) -> Result<(), ReportError> {
    fs::create_dir_all(html_dir)?;

    let mut all_ids: Vec<ArtifactId> = (0..excavation.artifact_count())
        .map(|i| ArtifactId::from_index(u32::try_from(i).expect("arena fits in u32")))
        .collect();
    all_ids.sort_by_key(|&id| excavation.display_name(id));

    for id in &all_ids {
        render_artifact_page(excavation, *id, html_dir, link_prefix)?;
    }

    render_index(excavation, html_dir, link_prefix)?;
    Ok(())
}

fn render_index(
    excavation: &Rc<Excavation>,
    html_dir: &Path,
    link_prefix: &str,
) -> Result<(), ReportError> {
    let mut page = String::new();
    page.push_str("<html><head><meta charset=\"utf-8\"><title>Excavation</title></head><body>\n");
    page.push_str("<h1>Excavation</h1>\n<h2>Top-level artifacts</h2>\n<ul>\n");

    let mut top_level = excavation.top_level();
    top_level.sort_by_key(|&id| excavation.display_name(id));
    for id in top_level {
        page.push_str(&format!(
            "<li><a href=\"{}{}.html\">{}</a></li>\n",
            link_prefix,
            file_stem(excavation, id),
            encode_text(&excavation.display_name(id))
        ));
    }
    page.push_str("</ul>\n<h2>Keyword index</h2>\n<ul>\n");

    for (key, ids) in excavation.index() {
        page.push_str(&format!("<li>{}<ul>\n", encode_text(&key)));
        for id in ids {
            page.push_str(&format!(
                "<li><a href=\"{}{}.html\">{}</a></li>\n",
                link_prefix,
                file_stem(excavation, id),
                encode_text(&excavation.display_name(id))
            ));
        }
        page.push_str("</ul></li>\n");
    }
    page.push_str("</ul>\n");
    page.push_str("</body></html>\n");

    let path = html_dir.join("index.html");
    fs::write(path, page)?;
    Ok(())
}

/// Renders one artifact's page. Layout (spec.md §4.2's `html_page`):
/// summary, length, descriptions, types, notes, derivation tree, then
/// either registered interpretations or a default children table plus
/// hexdump, then comments last.
///
/// # Errors
/// [`ReportError::IoFailure`] on any filesystem error.
pub fn render_artifact_page(
    excavation: &Rc<Excavation>,
    id: ArtifactId,
    html_dir: &Path,
    link_prefix: &str,
) -> Result<(), ReportError> {
    let artifact = excavation.artifact(id);
    let mut page = String::new();
    let title = excavation.display_name(id);

    page.push_str("<html><head><meta charset=\"utf-8\"><title>");
    page.push_str(&encode_text(&title));
    page.push_str("</title></head><body>\n");
    page.push_str(&format!("<h1>{}</h1>\n", encode_text(&title)));
    page.push_str(&format!("<p>Length: {} bytes</p>\n", artifact.len()));

    let comments = artifact.comments();
    if !comments.is_empty() {
        page.push_str("<p><em>NB: Comments at End</em></p>\n");
    }

    let descriptions = artifact.descriptions();
    if !descriptions.is_empty() {
        page.push_str("<h3>Description</h3>\n<ul>\n");
        for d in &descriptions {
            page.push_str(&format!("<li>{}</li>\n", encode_text(d)));
        }
        page.push_str("</ul>\n");
    }

    let types = artifact.iter_types(false);
    if !types.is_empty() {
        page.push_str("<h3>Types</h3>\n<ul>\n");
        for t in &types {
            page.push_str(&format!("<li>{}</li>\n", encode_text(t)));
        }
        page.push_str("</ul>\n");
    }

    let notes = artifact.iter_notes(false);
    if !notes.is_empty() {
        page.push_str("<h3>Notes</h3>\n<ul>\n");
        for n in &notes {
            page.push_str(&format!("<li>{}</li>\n", encode_text(n)));
        }
        page.push_str("</ul>\n");
    }

    page.push_str("<h4>Derivation</h4>\n<pre>\n");
    let mut visited = HashSet::new();
    render_parent_tree(excavation, id, 0, &mut visited, &mut page);
    page.push_str("</pre>\n");

    let interpretations = artifact.render_interpretations();
    if interpretations.is_empty() {
        render_default_children(excavation, &artifact, link_prefix, &mut page);
        page.push_str("<h4>Hexdump</h4>\n<pre>\n");
        let bytes = artifact.bytes().to_bytes();
        let mut buf = Vec::new();
        write_hexdump(&mut buf, &bytes, excavation.config().hexdump_limit)
            .expect("writing to an in-memory buffer cannot fail");
        page.push_str(&encode_text(&String::from_utf8_lossy(&buf)));
        page.push_str("</pre>\n");
    } else {
        for (label, body) in interpretations {
            page.push_str(&format!("<h4>{}</h4>\n<pre>\n", encode_text(&label)));
            page.push_str(&encode_text(&body));
            page.push_str("\n</pre>\n");
        }
    }

    if !comments.is_empty() {
        page.push_str("<h3>Comments</h3>\n<ul>\n");
        for c in &comments {
            page.push_str(&format!("<li>{}</li>\n", encode_text(c)));
        }
        page.push_str("</ul>\n");
    }

    page.push_str("</body></html>\n");

    let path = html_dir.join(format!("{}.html", file_stem(excavation, id)));
    fs::write(path, page)?;
    Ok(())
}

fn render_default_children(
    excavation: &Rc<Excavation>,
    artifact: &strata_core::Artifact,
    link_prefix: &str,
    page: &mut String,
) {
    let layout = artifact.layout();
    if layout.is_empty() {
        return;
    }
    page.push_str("<h4>Children</h4>\n<table>\n<tr><th>Range</th><th>Artifact</th></tr>\n");
    for LayoutEntry { start, stop, child } in layout {
        let range = match (start, stop) {
            (Some(start), Some(stop)) => format!("[{start}, {stop})"),
            _ => "full extent".to_string(),
        };
        page.push_str(&format!(
            "<tr><td>{}</td><td><a href=\"{}{}.html\">{}</a></td></tr>\n",
            encode_text(&range),
            link_prefix,
            file_stem(excavation, child),
            encode_text(&excavation.display_name(child))
        ));
    }
    page.push_str("</table>\n");
}

fn render_parent_tree(
    excavation: &Rc<Excavation>,
    id: ArtifactId,
    depth: usize,
    visited: &mut HashSet<ArtifactId>,
    page: &mut String,
) {
    let indent = "  ".repeat(depth);
    page.push_str(&format!(
        "{indent}\u{2514}\u{2500} {}\n",
        encode_text(&excavation.display_name(id))
    ));
    if !visited.insert(id) {
        return;
    }
    let parents_set: BTreeSet<ArtifactId> = excavation.artifact(id).parents().into_iter().collect();
    for parent in parents_set {
        render_parent_tree(excavation, parent, depth + 1, visited, page);
    }
}

fn file_stem(excavation: &Rc<Excavation>, id: ArtifactId) -> String {
    excavation
        .display_name(id)
        .chars()
        .filter(|c| !matches!(c, '\u{27e6}' | '\u{27e7}'))
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
