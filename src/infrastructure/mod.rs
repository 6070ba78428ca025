//! Infrastructure layer - External service implementations

pub mod conversation;
pub mod crypto;
pub mod knowledge;
pub mod llm;
pub mod logging;
pub mod observability;
pub mod storage;
