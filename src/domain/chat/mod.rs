//! Conversation context assembly

mod context;

pub use context::{build_messages, MAX_HISTORY_MESSAGES};
