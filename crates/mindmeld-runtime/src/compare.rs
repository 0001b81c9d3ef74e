//! Readability comparison of two or three pages through a lens.

use thiserror::Error;
use tracing::info;

use mindmeld_dom::Document;
use mindmeld_protocols::{ChannelError, MessageHandler, ProfileKey, Request};

use crate::extract::{extract_page_text, ExtractOptions};

pub const MIN_PAGES: usize = 2;
pub const MAX_PAGES: usize = 3;

/// Titles longer than this many characters are shortened in labels.
const MAX_LABEL_CHARS: usize = 60;

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("Please select at least 2 and at most 3 pages to compare (got {0})")]
    PageCount(usize),

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// One page taking part in a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparePage {
    pub title: String,
    pub url: String,
    pub text: String,
}

impl ComparePage {
    /// Page with its `<title>` and extracted text.
    pub fn from_document(doc: &Document, url: impl Into<String>, options: &ExtractOptions) -> Self {
        let title = doc
            .head()
            .and_then(|head| {
                doc.children(head)
                    .into_iter()
                    .find(|&child| doc.tag_name(child) == Some("title"))
            })
            .map(|title| doc.text_content(title).trim().to_string())
            .unwrap_or_default();

        Self {
            title,
            url: url.into(),
            text: extract_page_text(doc, options),
        }
    }

    /// Title shortened to 60 characters, or the URL when there is no title.
    pub fn label(&self) -> String {
        if self.title.is_empty() {
            return self.url.clone();
        }
        match self.title.char_indices().nth(MAX_LABEL_CHARS) {
            Some((cut, _)) => format!("{}…", &self.title[..cut]),
            None => self.title.clone(),
        }
    }
}

/// What the comparison asks the model to judge for each profile.
pub fn lens_instruction(lens: ProfileKey) -> &'static str {
    match lens {
        ProfileKey::Calm => {
            "Compare the given website content through the Calm lens. Focus on how relaxed, simple, and soothing it feels to read — considering tone, layout, and clarity. In 1–2 sentences, explain why {name of that website} website best supports calmness or reduces overwhelm for the user than anther website."
        }
        ProfileKey::Clarity => {
            "Compare the given website content through the Clarity lens. Evaluate how clearly it communicates ideas, stays organized, and provides useful takeaways without fluff. In 1–2 sentences, justify why {name of that website} website offers better clarity and balanced understanding for the user than anther website."
        }
        ProfileKey::Energize => {
            "Compare the given website content through the Spark lens. Focus on how motivating, energizing, and creatively engaging it feels — does it inspire curiosity or action? In 1–2 sentences, explain why {name of that website} website best ignites interest or motivation for the user than anther website."
        }
    }
}

/// Lens for a stored preference level; unset or unknown levels mean clarity.
pub fn lens_for_level(level: Option<&str>) -> ProfileKey {
    level
        .and_then(ProfileKey::from_level)
        .unwrap_or(ProfileKey::Clarity)
}

/// The comparison prompt for `pages` seen through `lens`.
pub fn build_compare_prompt(pages: &[ComparePage], lens: ProfileKey) -> Result<String, CompareError> {
    if !(MIN_PAGES..=MAX_PAGES).contains(&pages.len()) {
        return Err(CompareError::PageCount(pages.len()));
    }

    let combined = pages
        .iter()
        .map(|page| format!("{}:\n{}", page.label(), page.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(format!(
        "Instruction: {}\n\nHere is the extracted text:\n\n{}",
        lens_instruction(lens),
        combined
    ))
}

/// Ask the content context to compare `pages`.
pub async fn compare_pages(
    handler: &dyn MessageHandler,
    pages: &[ComparePage],
    lens: ProfileKey,
) -> Result<String, CompareError> {
    let prompt = build_compare_prompt(pages, lens)?;
    info!(pages = pages.len(), lens = lens.label(), "Comparing pages");

    let response = handler
        .handle(Request::GenerateAiResponse { prompt })
        .await
        .into_result()?;
    Ok(response.output.unwrap_or_default())
}
