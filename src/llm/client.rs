//! The completion capability every provider adapter implements.

use async_trait::async_trait;

use crate::error::ProviderError;

/// One prompt sent to a model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A language model backend.
///
/// The generator owns one boxed client for the whole run, so tests can swap
/// in a fake without touching global state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Display name used in logs and errors.
    fn provider(&self) -> &'static str;

    /// Maximum diff characters this backend should receive in one prompt.
    fn prompt_budget(&self) -> usize;

    /// Send the prompt and return the raw text of the model's reply.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;

    /// Verify the backend is reachable before any work is done.
    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
