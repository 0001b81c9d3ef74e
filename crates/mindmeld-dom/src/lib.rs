//! # MindMeld DOM
//!
//! A mutable HTML document for the rewrite pipeline.
//!
//! Pages are parsed with `scraper` (html5ever) and kept as a
//! [`scraper::Html`] tree. Nodes are addressed by copyable [`NodeId`]s from
//! `ego_tree`, queries go through `scraper` selectors and serialization
//! through html5ever, so markup survives a parse and serialize cycle
//! unchanged.

mod document;
mod error;
mod selector;

pub use document::Document;
pub use ego_tree::NodeId;
pub use error::{DomError, SelectorError};
pub use selector::Selector;
