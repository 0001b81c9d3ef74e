//! Error types for the MindMeld protocol layer.

mod channel;
mod model;
mod rewrite;
mod session;
mod stream;

pub use channel::*;
pub use model::*;
pub use rewrite::*;
pub use session::*;
pub use stream::*;
