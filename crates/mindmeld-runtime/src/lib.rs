//! # MindMeld Runtime
//!
//! The chunked streaming rewrite pipeline.
//!
//! Extractor → chunk planner → (per chunk) session manager + streaming
//! completer → reconciler. A restore pass runs at the start of every rewrite
//! so a page is always rewritten from its true originals.

pub mod chunk;
pub mod compare;
pub mod controller;
pub mod extract;
pub mod handler;
pub mod preferences;
pub mod reconcile;
pub mod render;
pub mod restore;
pub mod retry;
pub mod session;
pub mod themes;

#[cfg(test)]
pub(crate) mod testing;

pub use chunk::{plan_chunks, Chunk};
pub use compare::{build_compare_prompt, compare_pages, ComparePage, CompareError};
pub use controller::{RewriteController, RewriteSettings, RewriteSummary};
pub use extract::{
    collect_candidates, estimate_tokens, extract_page_text, find_main_region, Candidate,
    ElementKind, ExtractOptions,
};
pub use handler::{
    builtin_system_prompts, dispatch_json, BackgroundHandler, ChannelPromptSource,
    ContentHandler, Router,
};
pub use preferences::{FilePreferenceStore, MemoryPreferenceStore};
pub use reconcile::{ensure_rewrite_styles, reconcile, split_paragraphs, ReconcileReport};
pub use render::{Rendered, Renderer};
pub use restore::restore_region;
pub use retry::{RetryConfig, StreamOptions, StreamingCompleter};
pub use session::{SessionManager, SessionState};
pub use themes::{apply_theme, Theme, THEMES};
