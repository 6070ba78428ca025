//! LLM vendor adapters and the gateway facade

mod adapter;
mod anthropic;
mod config;
mod gateway;
mod gemini;
mod http_client;
mod openai;
mod registry;
mod sse;

pub use adapter::ProviderAdapter;
pub use anthropic::AnthropicAdapter;
pub use config::LlmSettings;
pub use gateway::LlmGateway;
pub use gemini::GeminiAdapter;
pub use http_client::{vendor_error, ByteStream, HttpClient};
pub use openai::OpenAiAdapter;
pub use registry::ProviderRegistry;
pub use sse::{spawn_chunk_stream, SseEvent, SseLineBuffer};
