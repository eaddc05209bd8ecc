//! OpenAI-compatible chat completions wire layer, shared by the OpenAI and
//! Groq adapters.

use adsynth_core::{CoreError, Provider};
use reqwest::header;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::http::{build_client, check_status, invalid_response, read_json, transport_error};
use crate::streaming::SseTextStream;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    provider: Provider,
    http_client: Client,
    api_key: String,
    endpoint: String,
}

impl ChatClient {
    pub fn new(provider: Provider, api_key: String, base_url: &str) -> Result<Self, CoreError> {
        Ok(Self {
            provider,
            http_client: build_client()?,
            api_key,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn complete(&self, request: &ChatRequest) -> Result<String, CoreError> {
        info!(
            "Requesting {} completion (model {})",
            self.provider, request.model
        );
        let response = self.send(request).await?;
        let body: ChatResponse = read_json(self.provider, response).await?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| invalid_response(self.provider, "response contained no choices"))?;

        debug!("{} returned {} characters", self.provider, content.len());
        Ok(content)
    }

    pub async fn stream(&self, request: &ChatRequest) -> Result<SseTextStream, CoreError> {
        info!(
            "Requesting streamed {} completion (model {})",
            self.provider, request.model
        );
        let mut request = request.clone();
        request.stream = true;

        let response = self.send(&request).await?;
        Ok(SseTextStream::new(self.provider, response.bytes_stream()))
    }

    async fn send(&self, request: &ChatRequest) -> Result<reqwest::Response, CoreError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(self.provider, e))?;

        check_status(self.provider, response).await
    }
}
