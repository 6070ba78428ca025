//! Context retrieval

mod in_memory;

pub use in_memory::{InMemoryContextRetriever, DEFAULT_MAX_SNIPPETS};
