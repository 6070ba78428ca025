//! CLI module for the Chatbot LLM Gateway
//!
//! - `serve`: run the HTTP server
//! - `encrypt-key`: encrypt a provider API key for a chatbot seed

pub mod encrypt_key;
pub mod serve;

use clap::{Parser, Subcommand};

/// Chatbot LLM Gateway - chat endpoint over multiple LLM providers
#[derive(Parser)]
#[command(name = "chatbot-llm-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Encrypt a provider API key with the configured server secret
    EncryptKey(encrypt_key::EncryptKeyArgs),
}
