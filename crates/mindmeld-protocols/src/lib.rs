//! # MindMeld Protocols
//!
//! Core protocol definitions (traits and wire types) for MindMeld.
//! Contains only interface definitions - no implementations.
//!
//! ## Core Traits
//!
//! - [`LanguageModel`] / [`ModelSession`] - The opaque model capability
//! - [`MessageHandler`] - A context answering protocol requests
//! - [`PromptSource`] - Supplier of the instruction profiles
//! - [`PreferenceStore`] - Asynchronous key-value preference storage

pub mod error;
pub mod message;
pub mod model;
pub mod preferences;
pub mod profile;

// Re-export core traits
pub use error::{
    ChannelError, ModelError, PreferenceError, RewriteError, SessionError, StreamError,
};
pub use message::{MessageHandler, Request, Response};
pub use model::{
    Availability, FragmentStream, LanguageModel, ModelParams, ModelSession, SessionOptions,
};
pub use preferences::{PreferenceStore, Preferences};
pub use profile::{InstructionProfile, ProfileKey, PromptSource, SystemPrompts};
