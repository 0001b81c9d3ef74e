//! Rendering of model output into HTML for replacement elements.

use pulldown_cmark::{html, Event, Options, Parser};

/// Rendered HTML for one response paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    /// Whether `html` holds block-level content (lists, tables, several
    /// paragraphs) that cannot live inside a `<p>`.
    pub block: bool,
}

impl Rendered {
    fn inline(html: String) -> Self {
        Self { html, block: false }
    }
}

/// How response text becomes markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Renderer {
    /// GitHub-flavoured markdown with line breaks preserved.
    #[default]
    Markdown,
    /// Escaped text with `<br/>` for newlines.
    Plain,
}

impl Renderer {
    pub fn from_config(render_markdown: bool) -> Self {
        if render_markdown {
            Renderer::Markdown
        } else {
            Renderer::Plain
        }
    }

    pub fn render(&self, text: &str) -> Rendered {
        match self {
            Renderer::Markdown => render_markdown(text),
            Renderer::Plain => Rendered::inline(render_plain(text)),
        }
    }
}

fn render_markdown(text: &str) -> Rendered {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut output = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut output, parser);

    let trimmed = output.trim();
    match unwrap_single_paragraph(trimmed) {
        Some(inner) => Rendered::inline(inner.to_string()),
        None => Rendered {
            html: trimmed.to_string(),
            block: !trimmed.is_empty(),
        },
    }
}

/// Inner markup of `<p>...</p>` when that is the whole output.
fn unwrap_single_paragraph(html: &str) -> Option<&str> {
    let inner = html.strip_prefix("<p>")?.strip_suffix("</p>")?;
    if inner.contains("<p>") || inner.contains("</p>") {
        return None;
    }
    Some(inner)
}

fn render_plain(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("<br/>"),
            _ => out.push(c),
        }
    }
    out
}
