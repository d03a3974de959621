//! Turns a diff into a commit message, falling back to a fixed message on any failure.

use tracing::{debug, info, warn};

use crate::commit::message::{
    CommitMessage, FALLBACK_MESSAGE, clamp_subject, clean_model_output, is_conventional_subject,
};
use crate::commit::prompt::build_prompt;
use crate::config::{CommitStyle, Settings};
use crate::error::GenerationError;
use crate::llm::{CompletionClient, CompletionRequest, RetryPolicy, retry_with_backoff};

const SUBJECT_MAX_TOKENS: u32 = 100;
const DETAILED_MAX_TOKENS: u32 = 300;

/// Knobs for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Skip the model entirely and use the fallback message.
    pub disabled: bool,
    pub model: String,
    pub temperature: f32,
    pub style: CommitStyle,
}

impl GenerationOptions {
    pub fn from_settings(settings: &Settings, disabled: bool) -> Self {
        Self {
            disabled,
            model: settings.model.clone(),
            temperature: settings.temperature,
            style: settings.commit_style,
        }
    }
}

/// Generates commit messages through a completion client.
pub struct MessageGenerator {
    client: Option<Box<dyn CompletionClient>>,
    retry: RetryPolicy,
}

impl MessageGenerator {
    pub fn new(client: Box<dyn CompletionClient>) -> Self {
        Self {
            client: Some(client),
            retry: RetryPolicy::default(),
        }
    }

    /// A generator that always yields the fallback message.
    pub fn without_client() -> Self {
        Self {
            client: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Produce a commit message for `diff`.
    ///
    /// Never fails: when generation is disabled, the diff is blank, or the
    /// provider errors out, the fallback message is returned instead.
    pub async fn generate(&self, diff: &str, options: &GenerationOptions) -> String {
        if options.disabled {
            debug!("AI generation disabled, using fallback message");
            return FALLBACK_MESSAGE.to_string();
        }
        if diff.trim().is_empty() {
            return FALLBACK_MESSAGE.to_string();
        }
        let Some(client) = self.client.as_deref() else {
            warn!("No AI provider configured, using fallback message");
            return FALLBACK_MESSAGE.to_string();
        };

        match self.request(client, diff, options).await {
            Ok(message) => message,
            Err(e) => {
                warn!("AI generation failed: {e}. Using fallback message");
                FALLBACK_MESSAGE.to_string()
            }
        }
    }

    async fn request(
        &self,
        client: &dyn CompletionClient,
        diff: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        let request = CompletionRequest {
            prompt: build_prompt(diff, options.style, client.prompt_budget()),
            model: options.model.clone(),
            temperature: options.temperature,
            max_tokens: if options.style.is_multiline() {
                DETAILED_MAX_TOKENS
            } else {
                SUBJECT_MAX_TOKENS
            },
        };

        info!("Generating commit message with {}...", client.provider());

        let request = &request;
        let raw = retry_with_backoff(
            &self.retry,
            || async move { client.complete(request).await.map_err(GenerationError::from) },
            |e: &GenerationError| matches!(e, GenerationError::Provider(p) if p.is_retryable()),
            |e: GenerationError| match e {
                GenerationError::Provider(p) => GenerationError::RetriesExhausted(Box::new(p)),
                other => other,
            },
        )
        .await?;

        debug!("Raw model output: {raw:?}");
        postprocess(&raw, options.style)
    }
}

/// Clean raw model output into a final message, or reject it.
///
/// Overlong subjects are truncated with an ellipsis and checked again.
pub fn postprocess(raw: &str, style: CommitStyle) -> Result<String, GenerationError> {
    let cleaned = clean_model_output(raw, style.is_multiline());
    if !is_conventional_subject(&cleaned.subject) {
        return Err(GenerationError::InvalidFormat(cleaned.subject));
    }

    let subject = clamp_subject(&cleaned.subject);
    if !is_conventional_subject(&subject) {
        return Err(GenerationError::InvalidFormat(subject));
    }

    Ok(CommitMessage {
        subject,
        body: cleaned.body,
    }
    .format())
}
