//! Anthropic messages API.

use adsynth_core::{CoreError, Prompt, Provider};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chat::ChatMessage;
use crate::http::{build_client, check_status, invalid_response, read_json, transport_error};
use crate::LlmProvider;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 500;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClaudeProvider {
    http_client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl ClaudeProvider {
    pub fn new(api_key: String, model: String, base_url: &str) -> Result<Self, CoreError> {
        Ok(Self {
            http_client: build_client()?,
            api_key,
            model,
            endpoint: format!("{}/v1/messages", base_url.trim_end_matches('/')),
        })
    }
}

impl LlmProvider for ClaudeProvider {
    fn provider(&self) -> Provider {
        Provider::Claude
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, CoreError> {
        let provider = Provider::Claude;
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![ChatMessage::user(prompt.as_str())],
        };

        info!("Requesting Claude completion (model {})", self.model);
        let response = self
            .http_client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(provider, e))?;

        let response = check_status(provider, response).await?;
        let body: MessagesResponse = read_json(provider, response).await?;

        // Text blocks are concatenated; other block types are skipped
        let text: String = body
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.is_empty() {
            return Err(invalid_response(provider, "response contained no text blocks"));
        }
        debug!("Claude returned {} characters", text.len());
        Ok(text)
    }
}
