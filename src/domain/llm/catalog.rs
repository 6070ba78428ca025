//! Static catalogs of providers and their models

use serde::Serialize;

use super::ProviderId;

/// Catalog entry describing one provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderInfo {
    pub id: ProviderId,
    pub name: &'static str,
    pub models: &'static [&'static str],
}

const OPENAI_MODELS: &[&str] = &[
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4-turbo",
    "gpt-3.5-turbo",
];

const ANTHROPIC_MODELS: &[&str] = &[
    "claude-sonnet-4-20250514",
    "claude-3-5-sonnet-20241022",
    "claude-3-5-haiku-20241022",
    "claude-3-opus-20240229",
];

const GOOGLE_MODELS: &[&str] = &["gemini-1.5-pro", "gemini-1.5-flash", "gemini-2.0-flash"];

/// Models offered for a provider; empty for `custom`
pub fn available_models(provider: ProviderId) -> &'static [&'static str] {
    match provider {
        ProviderId::OpenAi => OPENAI_MODELS,
        ProviderId::Anthropic => ANTHROPIC_MODELS,
        ProviderId::Google => GOOGLE_MODELS,
        ProviderId::Custom => &[],
    }
}

/// Every known provider, including ones without an adapter
pub fn available_providers() -> Vec<ProviderInfo> {
    ProviderId::ALL
        .iter()
        .map(|&id| ProviderInfo {
            id,
            name: id.display_name(),
            models: available_models(id),
        })
        .collect()
}
