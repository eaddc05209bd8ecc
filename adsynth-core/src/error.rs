use crate::types::Provider;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Reddit API error: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("All {} requested providers failed", failures.len())]
    AllProvidersFailed { failures: Vec<(Provider, LlmError)> },
}

#[derive(Error, Debug, Clone)]
pub enum RedditApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Subreddit not found: {subreddit}")]
    SubredditNotFound { subreddit: String },

    #[error("Invalid OAuth token")]
    InvalidToken,

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("Provider authentication failed: {provider}")]
    AuthenticationFailed { provider: Provider },

    #[error("API key invalid or missing for {provider}")]
    InvalidApiKey { provider: Provider },

    #[error("Rate limit exceeded for {provider}. Retry after {retry_after} seconds")]
    RateLimitExceeded { provider: Provider, retry_after: u64 },

    #[error("Provider service unavailable: {provider} (status {status_code})")]
    ServiceUnavailable { provider: Provider, status_code: u16 },

    #[error("Request timeout for {provider}")]
    RequestTimeout { provider: Provider },

    #[error("{provider} request failed with status {status_code}: {message}")]
    RequestFailed {
        provider: Provider,
        status_code: u16,
        message: String,
    },

    #[error("Invalid response format from {provider}: {details}")]
    InvalidResponseFormat { provider: Provider, details: String },

    #[error("Transport error talking to {provider}: {message}")]
    Transport { provider: Provider, message: String },
}

impl LlmError {
    pub fn provider(&self) -> Provider {
        match self {
            LlmError::AuthenticationFailed { provider }
            | LlmError::InvalidApiKey { provider }
            | LlmError::RateLimitExceeded { provider, .. }
            | LlmError::ServiceUnavailable { provider, .. }
            | LlmError::RequestTimeout { provider }
            | LlmError::RequestFailed { provider, .. }
            | LlmError::InvalidResponseFormat { provider, .. }
            | LlmError::Transport { provider, .. } => *provider,
        }
    }

    /// Missing or rejected credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            LlmError::AuthenticationFailed { .. } | LlmError::InvalidApiKey { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid configuration format: {details}")]
    InvalidFormat { details: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Environment variable not set: {var_name}")]
    MissingEnvironmentVariable { var_name: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
