//! Ollama adapter for a locally running model engine.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::ProviderError;
use crate::llm::client::{CompletionClient, CompletionRequest};
use crate::llm::http::{build_client, classify_status, send_json};

pub const OLLAMA_DEFAULT_HOST: &str = "http://localhost:11434";

const PROVIDER: &str = "Ollama";

/// Local models have small context windows.
const PROMPT_BUDGET: usize = 6_000;

/// The health probe should answer almost instantly on localhost.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

pub struct OllamaClient {
    http: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: build_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn prompt_budget(&self) -> usize {
        PROMPT_BUDGET
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let body = json!({
            "model": request.model,
            "prompt": request.prompt,
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            },
        });

        let builder = self.http.post(self.endpoint("/api/generate")).json(&body);
        let response: GenerateResponse = send_json(PROVIDER, builder).await?;

        if response.response.trim().is_empty() {
            return Err(ProviderError::EmptyResponse { provider: PROVIDER });
        }
        Ok(response.response)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        let response = self
            .http
            .get(self.endpoint("/api/tags"))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(PROVIDER, status, ""));
        }
        Ok(())
    }
}
