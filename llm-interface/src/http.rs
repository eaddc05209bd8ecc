//! Status and transport error mapping shared by every provider.

use adsynth_core::{CoreError, LlmError, Provider};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_RETRY_AFTER: u64 = 60;
const MAX_ERROR_BODY_CHARS: usize = 200;

pub(crate) fn build_client() -> Result<Client, CoreError> {
    Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

pub(crate) fn transport_error(provider: Provider, err: reqwest::Error) -> CoreError {
    error!("Transport error talking to {}: {}", provider, err);
    if err.is_timeout() {
        LlmError::RequestTimeout { provider }.into()
    } else {
        LlmError::Transport {
            provider,
            message: err.to_string(),
        }
        .into()
    }
}

/// Passes 2xx responses through and turns everything else into an [`LlmError`].
pub(crate) async fn check_status(
    provider: Provider,
    response: Response,
) -> Result<Response, CoreError> {
    let status = response.status();
    if status.is_success() {
        debug!("{} responded with {}", provider, status);
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();
    error!("{} request failed with status {}: {}", provider, status, body);

    let err = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LlmError::AuthenticationFailed { provider }
        }
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = retry_after.unwrap_or(DEFAULT_RETRY_AFTER);
            warn!("{} rate limited, retry after {} seconds", provider, retry_after);
            LlmError::RateLimitExceeded {
                provider,
                retry_after,
            }
        }
        s if s.is_server_error() => LlmError::ServiceUnavailable {
            provider,
            status_code: s.as_u16(),
        },
        s => LlmError::RequestFailed {
            provider,
            status_code: s.as_u16(),
            message: error_message(&body),
        },
    };
    Err(err.into())
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: Provider,
    response: Response,
) -> Result<T, CoreError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(provider, e))?;

    serde_json::from_slice(&bytes).map_err(|e| {
        error!("Malformed response body from {}: {}", provider, e);
        LlmError::InvalidResponseFormat {
            provider,
            details: e.to_string(),
        }
        .into()
    })
}

pub(crate) fn invalid_response(provider: Provider, details: &str) -> CoreError {
    LlmError::InvalidResponseFormat {
        provider,
        details: details.to_string(),
    }
    .into()
}

/// OpenAI and Anthropic both wrap failures as `{"error": {"message": ...}}`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_structured_body() {
        let body = r#"{"error": {"message": "model not found", "type": "invalid_request_error"}}"#;
        assert_eq!(error_message(body), "model not found");
    }

    #[test]
    fn test_error_message_truncates_plain_body() {
        let body = "x".repeat(500);
        assert_eq!(error_message(&body).len(), MAX_ERROR_BODY_CHARS);
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
