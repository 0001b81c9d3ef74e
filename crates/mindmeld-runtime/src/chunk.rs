//! Chunk planning.

use crate::extract::{Candidate, ElementKind};

/// An ordered, non-empty group of candidates sent to the model in one call.
///
/// A chunk holding a heading or a list holds exactly that element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    elements: Vec<Candidate>,
}

impl Chunk {
    pub fn elements(&self) -> &[Candidate] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Heading-only chunks exist as boundaries and are never sent.
    pub fn is_heading_only(&self) -> bool {
        matches!(self.elements.as_slice(), [only] if only.kind == ElementKind::Heading)
    }

    /// Paragraph-like elements, the only ones the model rewrites.
    pub fn paragraphs(&self) -> Vec<&Candidate> {
        self.elements
            .iter()
            .filter(|c| c.kind == ElementKind::Paragraph)
            .collect()
    }
}

/// Group candidates into chunks bounded by an estimated token budget.
///
/// Headings and lists flush the running chunk and stand alone. A paragraph
/// that would push a non-empty running chunk over `budget` starts a new
/// chunk; a single paragraph larger than the budget still gets a chunk.
pub fn plan_chunks(candidates: impl IntoIterator<Item = Candidate>, budget: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current: Vec<Candidate> = Vec::new();
    let mut current_tokens = 0;

    for candidate in candidates {
        if candidate.kind.is_boundary() {
            flush(&mut chunks, &mut current);
            current_tokens = 0;
            chunks.push(Chunk {
                elements: vec![candidate],
            });
            continue;
        }

        if !current.is_empty() && current_tokens + candidate.tokens > budget {
            flush(&mut chunks, &mut current);
            current_tokens = 0;
        }
        current_tokens += candidate.tokens;
        current.push(candidate);
    }
    flush(&mut chunks, &mut current);

    chunks
}

fn flush(chunks: &mut Vec<Chunk>, current: &mut Vec<Candidate>) {
    if !current.is_empty() {
        chunks.push(Chunk {
            elements: std::mem::take(current),
        });
    }
}

#[cfg(test)]
#[path = "chunk_tests.rs"]
mod tests;
