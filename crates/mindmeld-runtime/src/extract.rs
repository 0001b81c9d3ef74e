//! Content extraction.
//!
//! Finds the best-guess main content region of a page, collects the
//! text-bearing elements inside it and flattens them to plain text for
//! comparison. The heuristics are selector based and approximate.

use mindmeld_config::RewriteConfig;
use mindmeld_dom::{Document, NodeId, Selector};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Main-region selectors in order of preference.
pub const MAIN_REGION_SELECTORS: &[&str] = &[
    "main",
    "article",
    ".content",
    ".post",
    "#content",
    "#main",
    "div[role=\"main\"]",
    ".article-content",
    ".article-body",
    ".story-body",
    ".article-text",
    ".story-content",
    "[itemprop=\"articleBody\"]",
    ".paid-premium-content",
    ".str-story-body",
    ".str-article-content",
    "#story-body",
];

/// Text-bearing elements considered for rewriting.
pub const CANDIDATE_SELECTORS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "dl",
    ".article-content p",
    ".article-body p",
    ".story-body p",
    ".article-text p",
    ".story-content p",
    "[itemprop=\"articleBody\"] p",
    ".article p",
    ".story p",
];

/// Containers whose content is bylines, stats or page chrome.
pub const META_CONTAINER_SELECTORS: &[&str] = &[
    ".author",
    ".meta",
    ".claps",
    ".likes",
    ".stats",
    ".profile",
    ".bio",
    "header",
    "footer",
    ".premium-box",
];

pub const TRUNCATION_MARKER: &str = "\n\n[TRUNCATED]";

static MAIN_REGION: Lazy<Selector> = Lazy::new(|| {
    Selector::parse_list(MAIN_REGION_SELECTORS).expect("main region selectors are valid")
});

static CANDIDATES: Lazy<Selector> = Lazy::new(|| {
    Selector::parse_list(CANDIDATE_SELECTORS).expect("candidate selectors are valid")
});

static META_CONTAINERS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse_list(META_CONTAINER_SELECTORS).expect("meta container selectors are valid")
});

static LIST_ITEMS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("li").expect("list item selector is valid"));

static META_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(By|Published|Updated|Written by|\d+\s?min read|\d+\s?claps)")
        .expect("meta text pattern is valid")
});

/// Structural role of a candidate element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Heading,
    List,
    Paragraph,
}

impl ElementKind {
    pub fn of(tag: &str) -> Self {
        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => ElementKind::Heading,
            "ul" | "ol" | "dl" => ElementKind::List,
            _ => ElementKind::Paragraph,
        }
    }

    /// Headings and lists always start a chunk of their own.
    pub fn is_boundary(self) -> bool {
        !matches!(self, ElementKind::Paragraph)
    }
}

/// An element considered for rewriting. Discovered fresh on every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub node: NodeId,
    pub kind: ElementKind,
    /// Trimmed text content.
    pub text: String,
    /// Estimated token count.
    pub tokens: usize,
}

/// Extraction thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Paragraph-like elements shorter than this (in characters) are dropped.
    pub min_paragraph_chars: usize,
    /// Character cap for flattened text.
    pub max_chars: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            min_paragraph_chars: 50,
            max_chars: 150_000,
        }
    }
}

impl From<&RewriteConfig> for ExtractOptions {
    fn from(config: &RewriteConfig) -> Self {
        Self {
            min_paragraph_chars: config.min_paragraph_chars,
            max_chars: config.max_extract_chars,
        }
    }
}

/// Conservative token estimate: `ceil(words * 1.25)`.
pub fn estimate_tokens(text: &str) -> usize {
    (text.split_whitespace().count() * 5).div_ceil(4)
}

/// First element matching any main-region selector, in document order.
pub fn main_region(doc: &Document) -> Option<NodeId> {
    doc.select_first(&MAIN_REGION, doc.root())
}

/// The main region, falling back to `<body>` and then the document itself.
pub fn find_main_region(doc: &Document) -> NodeId {
    match main_region(doc) {
        Some(region) => region,
        None => {
            debug!("No main content region matched, using body");
            doc.body().unwrap_or_else(|| doc.root())
        }
    }
}

/// Ordered, filtered candidates inside `region`.
pub fn collect_candidates(doc: &Document, region: NodeId, min_chars: usize) -> Vec<Candidate> {
    doc.select(&CANDIDATES, region)
        .into_iter()
        .filter_map(|node| {
            let kind = ElementKind::of(doc.tag_name(node)?);
            let raw = doc.text_content(node);
            let text = raw.trim();

            if text.is_empty() || is_meta(doc, node, text) {
                return None;
            }
            if kind == ElementKind::Paragraph && text.chars().count() < min_chars {
                return None;
            }

            Some(Candidate {
                node,
                kind,
                text: text.to_string(),
                tokens: estimate_tokens(text),
            })
        })
        .collect()
}

fn is_meta(doc: &Document, node: NodeId, text: &str) -> bool {
    doc.closest(node, &META_CONTAINERS).is_some() || META_TEXT.is_match(text)
}

/// Flatten the page's readable content to plain text.
///
/// Lists become `- item` lines and parts are separated by a blank line. When
/// nothing survives filtering, the visible body text is used instead. Either
/// way the result is capped at `options.max_chars` characters.
pub fn extract_page_text(doc: &Document, options: &ExtractOptions) -> String {
    let region = find_main_region(doc);
    let candidates = collect_candidates(doc, region, options.min_paragraph_chars);

    if candidates.is_empty() {
        let body_text = doc.body().map(|body| doc.inner_text(body)).unwrap_or_default();
        return truncate(body_text.trim(), options.max_chars);
    }

    let parts: Vec<String> = candidates
        .iter()
        .map(|candidate| match candidate.kind {
            ElementKind::List => list_text(doc, candidate.node),
            _ => candidate.text.clone(),
        })
        .collect();

    truncate(&parts.join("\n\n"), options.max_chars)
}

fn list_text(doc: &Document, list: NodeId) -> String {
    doc.select(&LIST_ITEMS, list)
        .into_iter()
        .map(|item| format!("- {}", doc.text_content(item).trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
