//! The rewrite pass.
//!
//! One pass: initialize the session, restore earlier rewrites, extract,
//! plan chunks, then send each chunk to the model and reconcile the answer
//! onto the page. Chunks run strictly one after another.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use mindmeld_config::{Config, StreamConfig};
use mindmeld_dom::{Document, NodeId};
use mindmeld_protocols::RewriteError;

use crate::chunk::plan_chunks;
use crate::extract::{collect_candidates, extract_page_text, find_main_region, ExtractOptions};
use crate::reconcile::{ensure_rewrite_styles, reconcile, ReconcileReport};
use crate::render::Renderer;
use crate::restore::restore_region;
use crate::retry::{RetryConfig, StreamOptions, StreamingCompleter};
use crate::session::SessionManager;

/// Tunables of a rewrite pass.
#[derive(Debug, Clone)]
pub struct RewriteSettings {
    /// Estimated token budget per chunk.
    pub max_chunk_tokens: usize,
    pub extract: ExtractOptions,
    pub renderer: Renderer,
    /// Streaming options for rewrite chunks.
    pub rewrite_stream: StreamOptions,
    /// Streaming options for single-shot completions.
    pub generate_stream: StreamOptions,
}

impl Default for RewriteSettings {
    fn default() -> Self {
        let stream = StreamConfig::default();
        Self {
            max_chunk_tokens: 600,
            extract: ExtractOptions::default(),
            renderer: Renderer::default(),
            rewrite_stream: StreamOptions::rewrite(&stream),
            generate_stream: StreamOptions::generate(&stream),
        }
    }
}

impl RewriteSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_chunk_tokens: config.rewrite.max_chunk_tokens,
            extract: ExtractOptions::from(&config.rewrite),
            renderer: Renderer::from_config(config.rewrite.render_markdown),
            rewrite_stream: StreamOptions::rewrite(&config.stream),
            generate_stream: StreamOptions::generate(&config.stream),
        }
    }
}

/// What a finished pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteSummary {
    /// Name of the instruction profile used.
    pub profile: String,
    pub candidates: usize,
    pub chunks: usize,
    /// Rewritten elements put back before extraction.
    pub restored: usize,
    /// Chunks sent to the model.
    pub sent: usize,
    /// Sent chunks left untouched because no usable response arrived.
    pub skipped: usize,
    pub replaced: usize,
    pub removed: usize,
    pub dropped: usize,
    pub failed: usize,
}

impl RewriteSummary {
    fn record(&mut self, report: &ReconcileReport) {
        self.replaced += report.replaced;
        self.removed += report.removed;
        self.dropped += report.dropped;
        self.failed += report.failed;
    }
}

/// Clears the busy flag when the pass ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs rewrite passes and single-shot completions for one page context.
pub struct RewriteController {
    sessions: Arc<SessionManager>,
    completer: StreamingCompleter,
    settings: RewriteSettings,
    busy: AtomicBool,
}

impl RewriteController {
    pub fn new(sessions: Arc<SessionManager>, retry: RetryConfig, settings: RewriteSettings) -> Self {
        Self {
            completer: StreamingCompleter::new(sessions.clone(), retry),
            sessions,
            settings,
            busy: AtomicBool::new(false),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn settings(&self) -> &RewriteSettings {
        &self.settings
    }

    /// Whether a pass is running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Rewrite `doc` in place.
    ///
    /// A second pass started while one is running fails with
    /// [`RewriteError::Busy`] instead of waiting.
    pub async fn simplify(&self, doc: &mut Document) -> Result<RewriteSummary, RewriteError> {
        let _busy = BusyGuard::acquire(&self.busy).ok_or(RewriteError::Busy)?;
        self.run_pass(doc).await
    }

    /// Like [`simplify`](Self::simplify) for a page shared with other
    /// handlers. The busy check happens before waiting for the page lock.
    pub async fn simplify_page(
        &self,
        page: &tokio::sync::Mutex<Document>,
    ) -> Result<RewriteSummary, RewriteError> {
        let _busy = BusyGuard::acquire(&self.busy).ok_or(RewriteError::Busy)?;
        let mut doc = page.lock().await;
        self.run_pass(&mut doc).await
    }

    async fn run_pass(&self, doc: &mut Document) -> Result<RewriteSummary, RewriteError> {
        self.sessions.reset_if_level_changed().await;
        let state = self.sessions.ensure_initialized().await?;
        let profile = state.profile();

        let region = find_main_region(doc);
        let restored = restore_region(doc, region);

        let candidates = collect_candidates(doc, region, self.settings.extract.min_paragraph_chars);
        if candidates.is_empty() {
            return Err(RewriteError::NoContent);
        }

        let mut summary = RewriteSummary {
            profile: profile.key.name().to_string(),
            candidates: candidates.len(),
            restored,
            ..Default::default()
        };

        let chunks = plan_chunks(candidates, self.settings.max_chunk_tokens);
        summary.chunks = chunks.len();
        info!(
            candidates = summary.candidates,
            chunks = summary.chunks,
            profile = %profile.key,
            "Starting rewrite pass"
        );

        for chunk in &chunks {
            if chunk.is_heading_only() {
                continue;
            }
            let paragraphs = chunk.paragraphs();
            if paragraphs.is_empty() {
                continue;
            }

            let text = paragraphs
                .iter()
                .map(|candidate| candidate.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
            let prompt = format!("{}:\n\n{}", profile.instruction, text);

            info!(
                length = text.chars().count(),
                paragraphs = paragraphs.len(),
                "Sending chunk to model"
            );
            summary.sent += 1;

            let response = match self
                .completer
                .complete(state.session(), &prompt, &self.settings.rewrite_stream)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, "Rewrite failed for chunk, skipping");
                    summary.skipped += 1;
                    continue;
                }
            };

            let originals: Vec<NodeId> = paragraphs.iter().map(|candidate| candidate.node).collect();
            let report = reconcile(doc, &originals, &response, self.settings.renderer);
            info!(
                returned = report.returned,
                replaced = report.replaced,
                removed = report.removed,
                "Chunk replaced"
            );
            summary.record(&report);
        }

        if summary.replaced > 0 && ensure_rewrite_styles(doc) {
            debug!("Rewrite styles added");
        }
        // Replaced originals and restored rewrites stay in the tree until
        // compacted; a serve session runs many passes over one page.
        let dropped = doc.compact();
        debug!(dropped, "Detached nodes dropped");

        info!(
            sent = summary.sent,
            skipped = summary.skipped,
            replaced = summary.replaced,
            "Rewrite pass finished"
        );
        Ok(summary)
    }

    /// Single-shot completion on the shared session.
    pub async fn generate(&self, prompt: &str) -> Result<String, RewriteError> {
        let state = self.sessions.ensure_initialized().await?;
        let output = self
            .completer
            .complete(state.session(), prompt, &self.settings.generate_stream)
            .await?;
        Ok(output)
    }

    /// Plain text of the page for comparison.
    pub fn extract_text(&self, doc: &Document) -> String {
        extract_page_text(doc, &self.settings.extract)
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
