#[cfg(test)]
mod tests {
    use crate::{clean_completion, LlmProvider, ProviderAdapter};
    use adsynth_core::testing::{StubResponse, StubServer};
    use adsynth_core::{AppConfig, CoreError, LlmError, Prompt, Provider};
    use std::collections::HashMap;

    const OPENAI_PATH: &str = "/v1/chat/completions";
    const CLAUDE_PATH: &str = "/v1/messages";
    const GROQ_PATH: &str = "/openai/v1/chat/completions";

    const CHAT_JSON: &str = r#"{
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "  Meet FocusFlow: your focus, back.  "}, "finish_reason": "stop"}
        ]
    }"#;

    const CLAUDE_JSON: &str = r#"{
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": "<think>plan</think>Stop juggling tabs."}],
        "stop_reason": "end_turn"
    }"#;

    const GROQ_SSE: &str = concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"Focus \"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"starts \"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"here.\"}}]}\n\n",
        "data: [DONE]\n\n",
    );

    fn config_for(server: &StubServer, providers: &[Provider]) -> AppConfig {
        config_with_base(server.base_url(), providers)
    }

    fn config_with_base(base_url: &str, providers: &[Provider]) -> AppConfig {
        let mut vars: HashMap<String, String> = HashMap::from([
            ("REDDIT_CLIENT_ID".to_string(), "id".to_string()),
            ("REDDIT_CLIENT_SECRET".to_string(), "secret".to_string()),
            ("OPENAI_BASE_URL".to_string(), format!("{}/v1", base_url)),
            ("ANTHROPIC_BASE_URL".to_string(), base_url.to_string()),
            ("GROQ_BASE_URL".to_string(), format!("{}/openai/v1", base_url)),
        ]);
        for provider in providers {
            vars.insert(
                provider.api_key_var().to_string(),
                format!("key-{}", provider.slug()),
            );
        }
        AppConfig::from_lookup(move |key| vars.get(key).cloned()).unwrap()
    }

    fn prompt() -> Prompt {
        Prompt::new("Write a short ad for FocusFlow.")
    }

    #[test]
    fn test_clean_completion() {
        assert_eq!(clean_completion("<think>hmm</think>\n Buy now \n"), "hmm\n Buy now");
        assert_eq!(clean_completion("   "), "");
    }

    #[tokio::test]
    async fn test_openai_completion() {
        let server = StubServer::start(vec![(OPENAI_PATH, StubResponse::json(200, CHAT_JSON))]).await;
        let config = config_for(&server, &[Provider::OpenAi]);

        let adapter = ProviderAdapter::from_config(Provider::OpenAi, &config).unwrap();
        let result = adapter.generate(&prompt(), false, |_| {}).await.unwrap();

        assert_eq!(result.provider, Provider::OpenAi);
        assert_eq!(result.text, "Meet FocusFlow: your focus, back.");
        assert!(!result.streamed);

        let requests = server.requests_to(OPENAI_PATH);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].header("authorization"), Some("Bearer key-openai"));

        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Write a short ad for FocusFlow.");
        assert!(body.get("stream").is_none());
    }

    #[tokio::test]
    async fn test_claude_completion() {
        let server =
            StubServer::start(vec![(CLAUDE_PATH, StubResponse::json(200, CLAUDE_JSON))]).await;
        let config = config_for(&server, &[Provider::Claude]);

        let adapter = ProviderAdapter::from_config(Provider::Claude, &config).unwrap();
        let result = adapter.generate(&prompt(), false, |_| {}).await.unwrap();

        assert_eq!(result.provider, Provider::Claude);
        assert_eq!(result.text, "planStop juggling tabs.");

        let request = &server.requests_to(CLAUDE_PATH)[0];
        assert_eq!(request.header("x-api-key"), Some("key-claude"));
        assert_eq!(request.header("anthropic-version"), Some("2023-06-01"));
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["max_tokens"], 500);
    }

    #[tokio::test]
    async fn test_groq_streaming() {
        let server =
            StubServer::start(vec![(GROQ_PATH, StubResponse::event_stream(GROQ_SSE))]).await;
        let config = config_for(&server, &[Provider::Groq]);

        let adapter = ProviderAdapter::from_config(Provider::Groq, &config).unwrap();
        assert!(adapter.supports_streaming());

        let mut chunks = Vec::new();
        let result = adapter
            .generate(&prompt(), true, |chunk| chunks.push(chunk.to_string()))
            .await
            .unwrap();

        assert_eq!(chunks, vec!["Focus ", "starts ", "here."]);
        assert_eq!(result.text, "Focus starts here.");
        assert!(result.streamed);

        let body: serde_json::Value =
            serde_json::from_str(&server.requests_to(GROQ_PATH)[0].body).unwrap();
        assert_eq!(body["stream"], true);
        assert_eq!(body["model"], "llama-3.3-70b-versatile");
    }

    #[tokio::test]
    async fn test_stream_flag_without_streaming_support() {
        let server = StubServer::start(vec![(OPENAI_PATH, StubResponse::json(200, CHAT_JSON))]).await;
        let config = config_for(&server, &[Provider::OpenAi]);
        let adapter = ProviderAdapter::from_config(Provider::OpenAi, &config).unwrap();

        let mut chunk_calls = 0;
        let streamed = adapter
            .generate(&prompt(), true, |_| chunk_calls += 1)
            .await
            .unwrap();
        let plain = adapter.generate(&prompt(), false, |_| {}).await.unwrap();

        assert_eq!(streamed, plain);
        assert!(!streamed.streamed);
        assert_eq!(chunk_calls, 0);
    }

    #[tokio::test]
    async fn test_default_stream_yields_one_chunk() {
        use futures::StreamExt;

        let server = StubServer::start(vec![(OPENAI_PATH, StubResponse::json(200, CHAT_JSON))]).await;
        let config = config_for(&server, &[Provider::OpenAi]);
        let adapter = ProviderAdapter::from_config(Provider::OpenAi, &config).unwrap();

        let chunks: Vec<_> = adapter.stream(&prompt()).await.unwrap().collect().await;
        assert_eq!(chunks.len(), 1);
    }

    #[tokio::test]
    async fn test_authentication_failure() {
        let server = StubServer::start(vec![(
            OPENAI_PATH,
            StubResponse::json(401, r#"{"error": {"message": "Incorrect API key provided"}}"#),
        )])
        .await;
        let config = config_for(&server, &[Provider::OpenAi]);
        let adapter = ProviderAdapter::from_config(Provider::OpenAi, &config).unwrap();

        match adapter.generate(&prompt(), false, |_| {}).await {
            Err(CoreError::Llm(err)) => {
                assert!(err.is_auth_error());
                assert_eq!(err.provider(), Provider::OpenAi);
            }
            other => panic!("Expected authentication error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let server = StubServer::start(vec![(
            CLAUDE_PATH,
            StubResponse::json(429, r#"{"error": {"message": "slow down"}}"#)
                .with_header("retry-after", "12"),
        )])
        .await;
        let config = config_for(&server, &[Provider::Claude]);
        let adapter = ProviderAdapter::from_config(Provider::Claude, &config).unwrap();

        assert!(matches!(
            adapter.generate(&prompt(), false, |_| {}).await,
            Err(CoreError::Llm(LlmError::RateLimitExceeded {
                provider: Provider::Claude,
                retry_after: 12,
            }))
        ));
    }

    #[tokio::test]
    async fn test_other_failures() {
        let server = StubServer::start(vec![
            ("/v1/chat/completions", StubResponse::json(503, "{}")),
            (
                "/openai/v1/chat/completions",
                StubResponse::json(400, r#"{"error": {"message": "model not found"}}"#),
            ),
            ("/v1/messages", StubResponse::json(200, r#"{"unexpected": true}"#)),
        ])
        .await;
        let config = config_for(&server, &Provider::ALL);

        let openai = ProviderAdapter::from_config(Provider::OpenAi, &config).unwrap();
        assert!(matches!(
            openai.generate(&prompt(), false, |_| {}).await,
            Err(CoreError::Llm(LlmError::ServiceUnavailable {
                status_code: 503,
                ..
            }))
        ));

        let groq = ProviderAdapter::from_config(Provider::Groq, &config).unwrap();
        match groq.generate(&prompt(), false, |_| {}).await {
            Err(CoreError::Llm(LlmError::RequestFailed {
                status_code,
                message,
                ..
            })) => {
                assert_eq!(status_code, 400);
                assert_eq!(message, "model not found");
            }
            other => panic!("Expected RequestFailed, got {:?}", other),
        }

        let claude = ProviderAdapter::from_config(Provider::Claude, &config).unwrap();
        assert!(matches!(
            claude.generate(&prompt(), false, |_| {}).await,
            Err(CoreError::Llm(LlmError::InvalidResponseFormat {
                provider: Provider::Claude,
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let config = config_with_base("http://127.0.0.1:1", &[Provider::OpenAi, Provider::Groq]);

        for (provider, stream) in [(Provider::OpenAi, false), (Provider::Groq, true)] {
            let adapter = ProviderAdapter::from_config(provider, &config).unwrap();
            match adapter.generate(&prompt(), stream, |_| {}).await {
                Err(CoreError::Llm(LlmError::Transport {
                    provider: failed, ..
                })) => assert_eq!(failed, provider),
                other => panic!("Expected Transport error for {}, got {:?}", provider, other),
            }
        }
    }

    #[tokio::test]
    async fn test_empty_completion_is_rejected() {
        let server = StubServer::start(vec![(
            OPENAI_PATH,
            StubResponse::json(
                200,
                r#"{"choices": [{"message": {"role": "assistant", "content": "<think></think>  "}}]}"#,
            ),
        )])
        .await;
        let config = config_for(&server, &[Provider::OpenAi]);
        let adapter = ProviderAdapter::from_config(Provider::OpenAi, &config).unwrap();

        assert!(matches!(
            adapter.generate(&prompt(), false, |_| {}).await,
            Err(CoreError::Llm(LlmError::InvalidResponseFormat { .. }))
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key_makes_no_request() {
        let server = StubServer::start(vec![]).await;
        let config = config_for(&server, &[Provider::Groq]);

        for provider in [Provider::OpenAi, Provider::Claude] {
            match ProviderAdapter::from_config(provider, &config) {
                Err(CoreError::Llm(LlmError::InvalidApiKey { provider: p })) => {
                    assert_eq!(p, provider)
                }
                other => panic!("Expected InvalidApiKey, got {:?}", other),
            }
        }
        assert!(server.requests().is_empty());
    }
}
