//! Shared HTTP plumbing for provider adapters.

use std::env;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ProviderError;

/// Default timeout for one provider request (60 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable to override the default timeout.
const TIMEOUT_ENV_VAR: &str = "AICOMM_HTTP_TIMEOUT";

/// Longest error body kept in [`ProviderError::Http`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Get the configured request timeout.
///
/// Reads `AICOMM_HTTP_TIMEOUT` (seconds) if set, otherwise 60 seconds.
/// Logs a warning if the variable is set but not a valid number.
pub fn request_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("aicomm/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Map a non-success status to the matching [`ProviderError`].
pub fn classify_status(provider: &'static str, status: StatusCode, body: &str) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { provider },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthorized {
            provider,
            status: status.as_u16(),
        },
        _ => ProviderError::Http {
            provider,
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        },
    }
}

/// Send a request and decode a JSON body, mapping every failure to [`ProviderError`].
pub async fn send_json<T: DeserializeOwned>(
    provider: &'static str,
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })?;

    if !status.is_success() {
        debug!("{} responded with {}: {}", provider, status, body);
        return Err(classify_status(provider, status, &body));
    }

    serde_json::from_str(&body).map_err(|source| ProviderError::InvalidResponse { provider, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rate_limit() {
        let err = classify_status("Test", StatusCode::TOO_MANY_REQUESTS, "");
        assert!(matches!(err, ProviderError::RateLimited { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_classify_auth_failures_not_retryable() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = classify_status("Test", status, "bad key");
            assert!(matches!(err, ProviderError::Unauthorized { .. }));
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn test_classify_server_error_retryable_client_error_not() {
        let err = classify_status("Test", StatusCode::BAD_GATEWAY, "upstream");
        assert!(err.is_retryable());

        let err = classify_status("Test", StatusCode::BAD_REQUEST, "bad model");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_classify_truncates_long_body() {
        let body = "x".repeat(5_000);
        match classify_status("Test", StatusCode::INTERNAL_SERVER_ERROR, &body) {
            ProviderError::Http { body, .. } => assert_eq!(body.len(), MAX_ERROR_BODY_CHARS),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_request_timeout_env_override() {
        temp_env::with_var(TIMEOUT_ENV_VAR, Some("5"), || {
            assert_eq!(request_timeout(), Duration::from_secs(5));
        });
        temp_env::with_var(TIMEOUT_ENV_VAR, Some("soon"), || {
            assert_eq!(request_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        });
        temp_env::with_var_unset(TIMEOUT_ENV_VAR, || {
            assert_eq!(request_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        });
    }
}
