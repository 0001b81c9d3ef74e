//! Language-model protocol definitions.
//!
//! The model runtime is opaque: given a configuration it creates a session,
//! and given a prompt the session yields a stream of text fragments.

mod options;
mod traits;

pub use options::*;
pub use traits::*;
