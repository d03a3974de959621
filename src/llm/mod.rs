//! LLM provider adapters behind one completion capability.

pub mod client;
pub mod credentials;
pub mod gemini;
pub mod http;
pub mod ollama;
pub mod openrouter;
pub mod retry;

pub use client::{CompletionClient, CompletionRequest};
pub use retry::{RetryPolicy, retry_with_backoff};

use tracing::debug;

use crate::config::{ProviderKind, Settings};
use crate::error::EnvironmentError;

use self::gemini::{GEMINI_BASE_URL, GeminiClient};
use self::ollama::OllamaClient;
use self::openrouter::{OPENROUTER_BASE_URL, OpenRouterClient};

/// Build the client for the configured provider from the environment.
///
/// Fails when the provider's credential is missing.
pub fn build_client(settings: &Settings) -> Result<Box<dyn CompletionClient>, EnvironmentError> {
    let timeout = http::request_timeout();
    debug!(
        "Using {} with model {} (timeout {}s)",
        settings.provider,
        settings.model,
        timeout.as_secs()
    );

    let client: Box<dyn CompletionClient> = match settings.provider {
        ProviderKind::OpenRouter => {
            let key = credentials::require_api_key(settings.provider)?;
            Box::new(
                OpenRouterClient::new(key, OPENROUTER_BASE_URL, timeout)
                    .map_err(EnvironmentError::HttpClient)?,
            )
        }
        ProviderKind::Gemini => {
            let key = credentials::require_api_key(settings.provider)?;
            Box::new(
                GeminiClient::new(key, GEMINI_BASE_URL, timeout)
                    .map_err(EnvironmentError::HttpClient)?,
            )
        }
        ProviderKind::Ollama => Box::new(
            OllamaClient::new(credentials::ollama_host(), timeout)
                .map_err(EnvironmentError::HttpClient)?,
        ),
    };

    Ok(client)
}

/// Build the client and confirm the backend answers.
///
/// A local engine that does not respond is a fatal precondition.
pub async fn connect(settings: &Settings) -> Result<Box<dyn CompletionClient>, EnvironmentError> {
    let client = build_client(settings)?;
    ensure_ready(client.as_ref(), settings).await?;
    Ok(client)
}

pub async fn ensure_ready(
    client: &dyn CompletionClient,
    settings: &Settings,
) -> Result<(), EnvironmentError> {
    client
        .health_check()
        .await
        .map_err(|e| EnvironmentError::EngineOffline {
            endpoint: match settings.provider {
                ProviderKind::Ollama => credentials::ollama_host(),
                other => other.to_string(),
            },
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_requires_openrouter_key() {
        temp_env::with_var_unset(credentials::OPENROUTER_API_KEY, || {
            let result = build_client(&Settings::default());
            assert!(matches!(
                result,
                Err(EnvironmentError::MissingCredential { .. })
            ));
        });
    }

    #[test]
    fn test_build_client_selects_provider() {
        temp_env::with_var(credentials::GEMINI_API_KEY, Some("key"), || {
            let settings = Settings {
                provider: ProviderKind::Gemini,
                ..Settings::default()
            };
            let client = build_client(&settings).unwrap();
            assert_eq!(client.provider(), "Gemini");
        });

        let settings = Settings {
            provider: ProviderKind::Ollama,
            ..Settings::default()
        };
        let client = build_client(&settings).unwrap();
        assert_eq!(client.provider(), "Ollama");
    }

    #[test]
    fn test_connect_reports_offline_engine() {
        let settings = Settings {
            provider: ProviderKind::Ollama,
            ..Settings::default()
        };
        // Nothing listens on the discard port.
        let result = temp_env::with_var(credentials::OLLAMA_HOST, Some("http://127.0.0.1:9"), || {
            tokio_test::block_on(connect(&settings))
        });

        match result {
            Err(EnvironmentError::EngineOffline { endpoint, .. }) => {
                assert_eq!(endpoint, "http://127.0.0.1:9")
            }
            Err(other) => panic!("unexpected {other:?}"),
            Ok(_) => panic!("connect succeeded against an offline engine"),
        }
    }
}
