//! Mapping model output back onto the page.
//!
//! Response paragraphs replace the original elements pairwise, in order.
//! Every replacement carries a rewrite record (the original markup and
//! text) so a later restore can put the original back.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use mindmeld_dom::{Document, DomError, NodeId};

use crate::render::Renderer;

/// Attribute holding the verbatim markup of the element before its first
/// rewrite.
pub const ORIGINAL_HTML_ATTR: &str = "data-original-html";
/// Attribute holding the text of the element before its first rewrite.
pub const ORIGINAL_TEXT_ATTR: &str = "data-original-text";
/// Class added to every replacement element.
pub const REWRITE_CLASS: &str = "simplified-text";
/// `id` of the style element injected alongside the first replacement.
pub const STYLE_ID: &str = "simplified-text-styles";

const REWRITE_CSS: &str = "\
.simplified-text{padding-left:5px;padding-right:5px;margin:10px 0;line-height:1.6;font-weight:400;}
.simplified-text ul,.simplified-text ol{margin-left:20px;}
";

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n(?:[ \t]*\r?\n)+").expect("paragraph break pattern"));

/// Split model output on blank lines into trimmed, non-empty paragraphs.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Outcome of reconciling one chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Paragraphs in the response.
    pub returned: usize,
    /// Originals swapped for a rewritten element.
    pub replaced: usize,
    /// Surplus originals removed because the response was shorter.
    pub removed: usize,
    /// Response paragraphs without an original to replace.
    pub dropped: usize,
    /// Pairs skipped because the swap failed.
    pub failed: usize,
}

/// Replace `originals` with the paragraphs of `response`.
///
/// An empty response leaves the page untouched. A shorter response removes
/// the trailing originals; a longer one drops the extra paragraphs. A pair
/// whose original is no longer in the tree is skipped.
pub fn reconcile(
    doc: &mut Document,
    originals: &[NodeId],
    response: &str,
    renderer: Renderer,
) -> ReconcileReport {
    let paragraphs = split_paragraphs(response);
    let mut report = ReconcileReport {
        returned: paragraphs.len(),
        ..Default::default()
    };

    if paragraphs.is_empty() {
        warn!("Empty rewrite response, leaving originals in place");
        return report;
    }

    if paragraphs.len() < originals.len() {
        for &surplus in &originals[paragraphs.len()..] {
            if doc.is_attached(surplus) {
                doc.detach(surplus);
                report.removed += 1;
            }
        }
    } else if paragraphs.len() > originals.len() {
        report.dropped = paragraphs.len() - originals.len();
        warn!(
            returned = paragraphs.len(),
            originals = originals.len(),
            "Response has more paragraphs than the chunk, dropping the extra ones"
        );
    }

    for (&original, paragraph) in originals.iter().zip(&paragraphs) {
        let swapped = build_replacement(doc, original, paragraph, renderer)
            .and_then(|replacement| doc.replace_node(original, replacement));
        match swapped {
            Ok(()) => report.replaced += 1,
            Err(e) => {
                warn!(node = ?original, error = %e, "Replace failed");
                report.failed += 1;
            }
        }
    }

    debug!(
        returned = report.returned,
        replaced = report.replaced,
        removed = report.removed,
        "Chunk reconciled"
    );
    report
}

/// Detached element holding the rendered paragraph and the rewrite record
/// of `original`.
fn build_replacement(
    doc: &mut Document,
    original: NodeId,
    paragraph: &str,
    renderer: Renderer,
) -> Result<NodeId, DomError> {
    if !doc.is_attached(original) {
        return Err(DomError::Detached(original));
    }
    let rendered = renderer.render(paragraph);
    let tag = match doc.tag_name(original) {
        Some(list @ ("ul" | "ol" | "dl")) => list.to_string(),
        Some(_) if rendered.block => "div".to_string(),
        Some(_) => "p".to_string(),
        None => return Err(DomError::NotAnElement(original)),
    };

    // An earlier rewrite already holds the true original.
    let original_html = match doc.attr(original, ORIGINAL_HTML_ATTR) {
        Some(html) => html.to_string(),
        None => doc.outer_html(original),
    };
    let original_text = match doc.attr(original, ORIGINAL_TEXT_ATTR) {
        Some(text) => text.to_string(),
        None => doc.text_content(original),
    };

    let replacement = doc.create_element(&tag);
    doc.set_inner_html(replacement, &rendered.html);
    doc.add_class(replacement, REWRITE_CLASS)?;
    doc.set_attr(replacement, ORIGINAL_HTML_ATTR, &original_html)?;
    doc.set_attr(replacement, ORIGINAL_TEXT_ATTR, &original_text)?;
    Ok(replacement)
}

/// Add the rewrite stylesheet to `<head>` unless it is already there.
///
/// Returns whether a style element was inserted.
pub fn ensure_rewrite_styles(doc: &mut Document) -> bool {
    if doc.element_by_id(STYLE_ID).is_some() {
        return false;
    }
    let Some(head) = doc.head() else {
        warn!("Document has no head, rewrite styles not added");
        return false;
    };

    let style = doc.create_element("style");
    doc.set_text(style, REWRITE_CSS);
    let inserted = doc
        .set_attr(style, "id", STYLE_ID)
        .and_then(|()| doc.append_child(head, style));
    match inserted {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Failed to add rewrite styles");
            false
        }
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
