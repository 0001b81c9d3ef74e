//! DOM error types.

use ego_tree::NodeId;
use thiserror::Error;

/// Errors raised by tree mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Node {0:?} is not attached to a parent")]
    Detached(NodeId),

    #[error("Node {0:?} cannot be inserted into its own subtree")]
    Cycle(NodeId),

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0:?} does not belong to this document")]
    Unknown(NodeId),
}

/// Errors raised while parsing a selector.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Invalid selector '{selector}': {message}")]
    Invalid { selector: String, message: String },
}
