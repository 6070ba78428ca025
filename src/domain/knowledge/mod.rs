//! Knowledge retrieval collaborator

mod retriever;

pub use retriever::{ContextRetriever, KnowledgeDocument};
