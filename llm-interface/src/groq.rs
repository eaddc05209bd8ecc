use adsynth_core::{CoreError, Prompt, Provider};

use crate::chat::{ChatClient, ChatMessage, ChatRequest};
use crate::{LlmProvider, TextStream};

const TEMPERATURE: f32 = 0.6;
const MAX_TOKENS: u32 = 2000;
const TOP_P: f32 = 0.95;

/// Groq's OpenAI-compatible endpoint, the only provider that streams.
#[derive(Debug, Clone)]
pub struct GroqProvider {
    client: ChatClient,
    model: String,
}

impl GroqProvider {
    pub fn new(api_key: String, model: String, base_url: &str) -> Result<Self, CoreError> {
        Ok(Self {
            client: ChatClient::new(Provider::Groq, api_key, base_url)?,
            model,
        })
    }

    fn request(&self, prompt: &Prompt) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt.as_str())],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            top_p: Some(TOP_P),
            stream: false,
        }
    }
}

impl LlmProvider for GroqProvider {
    fn provider(&self) -> Provider {
        Provider::Groq
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, CoreError> {
        self.client.complete(&self.request(prompt)).await
    }

    async fn stream(&self, prompt: &Prompt) -> Result<TextStream, CoreError> {
        let stream = self.client.stream(&self.request(prompt)).await?;
        Ok(Box::pin(stream))
    }
}
