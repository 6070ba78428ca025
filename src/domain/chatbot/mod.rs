//! Chatbot configuration as seen by the gateway

mod entity;

pub use entity::{Chatbot, ChatbotId};
