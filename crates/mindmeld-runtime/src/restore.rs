//! Undo of previous rewrites.

use once_cell::sync::Lazy;
use tracing::{info, warn};

use mindmeld_dom::{Document, NodeId, Selector};

use crate::reconcile::ORIGINAL_HTML_ATTR;

static REWRITTEN: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-original-html]").expect("rewritten selector"));

/// Put the original element back for every rewritten node under `region`.
///
/// Returns the number of nodes restored. Restoring an already restored
/// region finds nothing and returns 0.
pub fn restore_region(doc: &mut Document, region: NodeId) -> usize {
    let mut restored = 0;

    for node in doc.select(&REWRITTEN, region) {
        // An earlier swap in this loop may have taken the node out of the region.
        if !doc.ancestors(node).any(|ancestor| ancestor == region) {
            continue;
        }
        let Some(markup) = doc.attr(node, ORIGINAL_HTML_ATTR).map(str::to_string) else {
            continue;
        };

        let fragment = doc.parse_fragment(&markup);
        let Some(original) = fragment.into_iter().find(|&n| doc.element(n).is_some()) else {
            warn!(node = ?node, "Rewrite record holds no element, leaving node in place");
            continue;
        };

        match doc.replace_node(node, original) {
            Ok(()) => restored += 1,
            Err(e) => warn!(node = ?node, error = %e, "Restore failed"),
        }
    }

    if restored > 0 {
        info!(restored, "Restored original elements");
    }
    restored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{reconcile, ORIGINAL_TEXT_ATTR, REWRITE_CLASS};
    use crate::render::Renderer;

    fn paragraphs(doc: &Document) -> Vec<NodeId> {
        doc.select(&Selector::parse("p").unwrap(), doc.root())
    }

    #[test]
    fn test_restore_without_records_is_noop() {
        let mut doc = Document::parse("<body><p>plain</p></body>");
        let body = doc.body().unwrap();
        let before = doc.html();
        assert_eq!(restore_region(&mut doc, body), 0);
        assert_eq!(doc.html(), before);
    }

    #[test]
    fn test_restore_brings_back_original_markup() {
        let original = "<body><article><p class=\"lead\">First <em>one</em></p><p>Second</p></article></body>";
        let mut doc = Document::parse(original);
        let before = doc.html();
        let targets = paragraphs(&doc);

        let report = reconcile(&mut doc, &targets, "Uno\n\nDos", Renderer::Plain);
        assert_eq!(report.replaced, 2);
        assert_ne!(doc.html(), before);

        let body = doc.body().unwrap();
        assert_eq!(restore_region(&mut doc, body), 2);
        assert_eq!(doc.html(), before);
    }

    #[test]
    fn test_restore_is_idempotent() {
        let mut doc = Document::parse("<body><p>Alpha</p></body>");
        let targets = paragraphs(&doc);
        reconcile(&mut doc, &targets, "Rewritten", Renderer::Markdown);

        let body = doc.body().unwrap();
        assert_eq!(restore_region(&mut doc, body), 1);
        let once = doc.html();
        assert_eq!(restore_region(&mut doc, body), 0);
        assert_eq!(doc.html(), once);
    }

    #[test]
    fn test_restore_only_touches_region() {
        let mut doc = Document::parse(
            "<body><main><p>inside</p></main><aside><p>outside</p></aside></body>",
        );
        let targets = paragraphs(&doc);
        reconcile(&mut doc, &targets, "in\n\nout", Renderer::Plain);

        let main = doc
            .select_first(&Selector::parse("main").unwrap(), doc.root())
            .unwrap();
        assert_eq!(restore_region(&mut doc, main), 1);

        let aside = doc
            .select_first(&Selector::parse("aside").unwrap(), doc.root())
            .unwrap();
        let remaining = doc.select(&REWRITTEN, aside);
        assert_eq!(remaining.len(), 1);
        assert_eq!(doc.attr(remaining[0], "class"), Some(REWRITE_CLASS));
    }

    #[test]
    fn test_restore_keeps_raw_text_and_prefixed_attributes() {
        let mut doc = Document::parse(
            "<body><p>Lead text<noscript><img src=\"t.gif\"></noscript> tail</p>\
             <p>Icon <svg><use xlink:href=\"#i\"></use></svg> here</p></body>",
        );
        let before = doc.html();
        let targets = paragraphs(&doc);

        reconcile(&mut doc, &targets, "Rewritten\n\nAgain", Renderer::Plain);
        let body = doc.body().unwrap();
        assert_eq!(restore_region(&mut doc, body), 2);

        let after = doc.html();
        assert_eq!(after, before);
        assert!(after.contains("<noscript><img src=\"t.gif\"></noscript>"));
        assert!(after.contains("xlink:href=\"#i\""));
    }

    #[test]
    fn test_repeated_passes_do_not_drift() {
        let mut doc = Document::parse(
            "<body><p>Lead text<noscript><img src=\"t.gif\"></noscript> tail</p></body>",
        );
        let before = doc.html();

        for round in 0..3 {
            let targets = paragraphs(&doc);
            reconcile(&mut doc, &targets, &format!("Round {round}"), Renderer::Plain);
            // Serialize and parse again, like a page saved between runs.
            doc = Document::parse(&doc.html());
        }
        let body = doc.body().unwrap();
        assert_eq!(restore_region(&mut doc, body), 1);
        assert_eq!(doc.html(), before);
    }

    #[test]
    fn test_restored_node_has_no_record() {
        let mut doc = Document::parse("<body><p>Alpha</p></body>");
        let targets = paragraphs(&doc);
        reconcile(&mut doc, &targets, "Beta", Renderer::Plain);

        let body = doc.body().unwrap();
        restore_region(&mut doc, body);
        let p = paragraphs(&doc)[0];
        assert!(!doc.has_attr(p, ORIGINAL_HTML_ATTR));
        assert!(!doc.has_attr(p, ORIGINAL_TEXT_ATTR));
        assert_eq!(doc.text_content(p), "Alpha");
    }
}
