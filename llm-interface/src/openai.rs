use adsynth_core::{CoreError, Prompt, Provider};

use crate::chat::{ChatClient, ChatMessage, ChatRequest};
use crate::LlmProvider;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 2000;

/// OpenAI chat completions. Answers in one block.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: ChatClient,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, base_url: &str) -> Result<Self, CoreError> {
        Ok(Self {
            client: ChatClient::new(Provider::OpenAi, api_key, base_url)?,
            model,
        })
    }

    fn request(&self, prompt: &Prompt) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt.as_str())],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            top_p: None,
            stream: false,
        }
    }
}

impl LlmProvider for OpenAiProvider {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, CoreError> {
        self.client.complete(&self.request(prompt)).await
    }
}
