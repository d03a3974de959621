//! Provider credential and endpoint detection.
//!
//! Lookup order:
//! - OpenRouter: `OPENROUTER_API_KEY`
//! - Gemini: `GEMINI_API_KEY`, then `GOOGLE_API_KEY`
//! - Ollama: no key; endpoint from `OLLAMA_HOST`, default `http://localhost:11434`

use std::env;

use crate::config::ProviderKind;
use crate::error::EnvironmentError;
use crate::llm::ollama::OLLAMA_DEFAULT_HOST;

pub const OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const OLLAMA_HOST: &str = "OLLAMA_HOST";

/// Environment variables checked for a provider's key, in order.
pub fn key_vars(provider: ProviderKind) -> &'static [&'static str] {
    match provider {
        ProviderKind::OpenRouter => &[OPENROUTER_API_KEY],
        ProviderKind::Gemini => &[GEMINI_API_KEY, GOOGLE_API_KEY],
        ProviderKind::Ollama => &[],
    }
}

/// Get the API key for `provider`.
///
/// Returns `None` when no variable is set or the provider needs no key.
/// Empty values count as unset.
pub fn api_key(provider: ProviderKind) -> Option<String> {
    key_vars(provider).iter().find_map(|var| {
        env::var(var)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Like [`api_key`], but a missing key is an error naming the first variable.
pub fn require_api_key(provider: ProviderKind) -> Result<String, EnvironmentError> {
    api_key(provider).ok_or_else(|| EnvironmentError::MissingCredential {
        provider: provider.to_string(),
        var: key_vars(provider)
            .first()
            .copied()
            .unwrap_or_default()
            .to_string(),
    })
}

/// Base URL of the local Ollama engine.
pub fn ollama_host() -> String {
    match env::var(OLLAMA_HOST) {
        Ok(host) if !host.trim().is_empty() => {
            let host = host.trim();
            if host.starts_with("http://") || host.starts_with("https://") {
                host.to_string()
            } else {
                format!("http://{host}")
            }
        }
        _ => OLLAMA_DEFAULT_HOST.to_string(),
    }
}
