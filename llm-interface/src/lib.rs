//! Provider adapters that turn a [`Prompt`] into ad copy.
//!
//! Every vendor implements [`LlmProvider`]. [`ProviderAdapter`] is the closed
//! set of adapters the CLI dispatches over, and [`ProviderAdapter::generate`]
//! is the single entry point the orchestrator calls.

pub mod chat;
pub mod claude;
mod http;
pub mod groq;
pub mod openai;
pub mod streaming;
mod tests;

pub use claude::ClaudeProvider;
pub use groq::GroqProvider;
pub use openai::OpenAiProvider;
pub use streaming::SseTextStream;

use adsynth_core::{AdCopyResult, AppConfig, CoreError, LlmError, Prompt, Provider};
use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use tracing::{debug, info};

/// Lazy, finite sequence of completion text chunks. Not restartable.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, CoreError>> + Send>>;

#[allow(async_fn_in_trait)]
pub trait LlmProvider {
    fn provider(&self) -> Provider;

    fn supports_streaming(&self) -> bool {
        false
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, CoreError>;

    /// Providers without streaming yield their whole completion as one chunk.
    async fn stream(&self, prompt: &Prompt) -> Result<TextStream, CoreError> {
        let text = self.complete(prompt).await?;
        Ok(Box::pin(stream::iter(std::iter::once(Ok(text)))))
    }
}

#[derive(Debug, Clone)]
pub enum ProviderAdapter {
    OpenAi(OpenAiProvider),
    Claude(ClaudeProvider),
    Groq(GroqProvider),
}

impl ProviderAdapter {
    /// Builds the adapter for `provider`. Fails with `InvalidApiKey` when no
    /// key is configured, before anything touches the network.
    pub fn from_config(provider: Provider, config: &AppConfig) -> Result<Self, CoreError> {
        let api_key = config
            .api_key(provider)
            .ok_or(LlmError::InvalidApiKey { provider })?
            .to_string();
        let model = config.model(provider).to_string();
        let base_url = config.base_url(provider);

        debug!("Configuring {} adapter (model {})", provider, model);
        Ok(match provider {
            Provider::OpenAi => Self::OpenAi(OpenAiProvider::new(api_key, model, base_url)?),
            Provider::Claude => Self::Claude(ClaudeProvider::new(api_key, model, base_url)?),
            Provider::Groq => Self::Groq(GroqProvider::new(api_key, model, base_url)?),
        })
    }

    /// Runs the prompt through this provider.
    ///
    /// With `stream` set and a provider that supports it, every chunk is handed
    /// to `on_chunk` as it arrives and the result is marked as streamed.
    /// Otherwise the call behaves exactly like a plain completion and
    /// `on_chunk` is never invoked.
    pub async fn generate<F>(
        &self,
        prompt: &Prompt,
        stream: bool,
        mut on_chunk: F,
    ) -> Result<AdCopyResult, CoreError>
    where
        F: FnMut(&str),
    {
        let provider = self.provider();
        let streamed = stream && self.supports_streaming();
        if stream && !streamed {
            debug!("{} does not stream, falling back to a single response", provider);
        }

        let raw = if streamed {
            let mut chunks = self.stream(prompt).await?;
            let mut text = String::new();
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk?;
                on_chunk(&chunk);
                text.push_str(&chunk);
            }
            text
        } else {
            self.complete(prompt).await?
        };

        let text = clean_completion(&raw);
        if text.is_empty() {
            return Err(LlmError::InvalidResponseFormat {
                provider,
                details: "completion was empty".to_string(),
            }
            .into());
        }

        info!("{} produced {} characters of ad copy", provider, text.len());
        Ok(AdCopyResult {
            provider,
            text,
            streamed,
        })
    }
}

impl LlmProvider for ProviderAdapter {
    fn provider(&self) -> Provider {
        match self {
            Self::OpenAi(inner) => inner.provider(),
            Self::Claude(inner) => inner.provider(),
            Self::Groq(inner) => inner.provider(),
        }
    }

    fn supports_streaming(&self) -> bool {
        match self {
            Self::OpenAi(inner) => inner.supports_streaming(),
            Self::Claude(inner) => inner.supports_streaming(),
            Self::Groq(inner) => inner.supports_streaming(),
        }
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, CoreError> {
        match self {
            Self::OpenAi(inner) => inner.complete(prompt).await,
            Self::Claude(inner) => inner.complete(prompt).await,
            Self::Groq(inner) => inner.complete(prompt).await,
        }
    }

    async fn stream(&self, prompt: &Prompt) -> Result<TextStream, CoreError> {
        match self {
            Self::OpenAi(inner) => inner.stream(prompt).await,
            Self::Claude(inner) => inner.stream(prompt).await,
            Self::Groq(inner) => inner.stream(prompt).await,
        }
    }
}

/// Strips reasoning markers some models emit and trims the result.
pub fn clean_completion(raw: &str) -> String {
    raw.replace("<think>", "")
        .replace("</think>", "")
        .trim()
        .to_string()
}
