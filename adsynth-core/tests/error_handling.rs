use adsynth_core::{
    ConfigError, CoreError, ErrorExt, ErrorReporter, LlmError, Provider, RedditApiError,
};
use std::time::Duration;

#[test]
fn test_error_codes() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    assert_eq!(reddit_error.error_code(), "REDDIT_API");

    let llm_error = CoreError::Llm(LlmError::InvalidApiKey {
        provider: Provider::OpenAi,
    });
    assert_eq!(llm_error.error_code(), "LLM");

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "REDDIT_CLIENT_ID".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");

    let rate_limited = LlmError::RateLimitExceeded {
        provider: Provider::Groq,
        retry_after: 20,
    };
    assert_eq!(rate_limited.error_code(), "LLM_RATE_LIMIT");
}

#[test]
fn test_retryable_errors() {
    let retryable_error =
        CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 60 });
    assert!(retryable_error.is_retryable());

    let non_retryable_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "GROQ_API_KEY".to_string(),
    });
    assert!(!non_retryable_error.is_retryable());

    let auth_error = LlmError::AuthenticationFailed {
        provider: Provider::Claude,
    };
    assert!(!auth_error.is_retryable());
    assert!(auth_error.is_auth_error());
}

#[test]
fn test_retry_after() {
    let rate_limit_error = CoreError::Llm(LlmError::RateLimitExceeded {
        provider: Provider::OpenAi,
        retry_after: 60,
    });
    assert_eq!(
        rate_limit_error.retry_after(),
        Some(Duration::from_secs(60))
    );

    let config_error = CoreError::Config(ConfigError::ValidationFailed {
        reason: "no keys".to_string(),
    });
    assert_eq!(config_error.retry_after(), None);
}

#[test]
fn test_user_friendly_messages() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    let message = reddit_error.user_friendly_message();
    assert!(message.contains("authentication token is invalid"));

    let missing_key = CoreError::Llm(LlmError::InvalidApiKey {
        provider: Provider::Claude,
    });
    assert!(missing_key
        .user_friendly_message()
        .contains("ANTHROPIC_API_KEY"));

    let all_failed = CoreError::AllProvidersFailed {
        failures: vec![
            (
                Provider::OpenAi,
                LlmError::InvalidApiKey {
                    provider: Provider::OpenAi,
                },
            ),
            (
                Provider::Groq,
                LlmError::RateLimitExceeded {
                    provider: Provider::Groq,
                    retry_after: 30,
                },
            ),
        ],
    };
    let message = all_failed.user_friendly_message();
    assert!(message.contains("OpenAI"));
    assert!(message.contains("Groq"));
    assert!(all_failed.is_retryable());
    assert_eq!(all_failed.to_string(), "All 2 requested providers failed");
}

#[test]
fn test_llm_error_carries_provider() {
    let error = LlmError::RequestFailed {
        provider: Provider::Groq,
        status_code: 400,
        message: "bad request".to_string(),
    };
    assert_eq!(error.provider(), Provider::Groq);
    assert!(error.to_string().contains("Groq"));
}

#[test]
fn test_error_reporter() {
    let reporter = ErrorReporter::new();
    let error = CoreError::RedditApi(RedditApiError::InvalidToken);

    // This test just ensures the methods don't panic
    reporter.report_error(&error);
    reporter.report_provider_failure(&LlmError::RequestTimeout {
        provider: Provider::OpenAi,
    });
}
