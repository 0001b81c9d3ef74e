//! CSS selectors, parsed and matched by `scraper`.

use std::fmt;

use scraper::ElementRef;

use crate::error::SelectorError;

/// A parsed selector list.
#[derive(Debug, Clone)]
pub struct Selector {
    source: String,
    inner: scraper::Selector,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        if source.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        let inner = scraper::Selector::parse(source).map_err(|e| SelectorError::Invalid {
            selector: source.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            inner,
        })
    }

    /// Parse several selectors as one list; an element matches when any of
    /// them does.
    pub fn parse_list(sources: &[&str]) -> Result<Self, SelectorError> {
        Self::parse(&sources.join(", "))
    }

    pub(crate) fn matches(&self, element: &ElementRef<'_>) -> bool {
        self.inner.matches(element)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
