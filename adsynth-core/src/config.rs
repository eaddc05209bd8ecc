//! Process configuration, read once at startup.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file. The resulting [`AppConfig`] is passed by reference to every
//! component; nothing reads the environment after construction.

use crate::error::{ConfigError, CoreError};
use crate::types::Provider;
use std::collections::HashMap;
use std::env;
use tracing::debug;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "script:adsynth:v0.1 (by /u/adsynth)";
pub const DEFAULT_REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const DEFAULT_REDDIT_API_BASE: &str = "https://oauth.reddit.com";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub auth_url: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub reddit: RedditCredentials,
    pub llm_api_keys: HashMap<Provider, String>,
    pub llm_models: HashMap<Provider, String>,
    pub llm_base_urls: HashMap<Provider, String>,
}

impl AppConfig {
    /// Loads `.env` files if present, then reads the process environment.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::try_load_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| ConfigError::MissingEnvironmentVariable {
                var_name: key.to_string(),
            })
        };

        let reddit = RedditCredentials {
            client_id: require("REDDIT_CLIENT_ID")?,
            client_secret: require("REDDIT_CLIENT_SECRET")?,
            user_agent: get("REDDIT_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            auth_url: validated_url(
                "REDDIT_AUTH_URL",
                get("REDDIT_AUTH_URL").unwrap_or_else(|| DEFAULT_REDDIT_AUTH_URL.to_string()),
            )?,
            api_base: validated_url(
                "REDDIT_API_BASE",
                get("REDDIT_API_BASE").unwrap_or_else(|| DEFAULT_REDDIT_API_BASE.to_string()),
            )?,
        };

        let mut llm_api_keys = HashMap::new();
        let mut llm_models = HashMap::new();
        let mut llm_base_urls = HashMap::new();

        for provider in Provider::ALL {
            if let Some(key) = get(provider.api_key_var()) {
                llm_api_keys.insert(provider, key);
            }

            let (model_var, fallback_model) = default_model(provider);
            llm_models.insert(
                provider,
                get(model_var).unwrap_or_else(|| fallback_model.to_string()),
            );

            let (url_var, default_url) = default_base_url(provider);
            let base_url = get(url_var).unwrap_or_else(|| default_url.to_string());
            llm_base_urls.insert(provider, validated_url(url_var, base_url)?);
        }

        if llm_api_keys.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "No LLM API key configured. Set at least one of OPENAI_API_KEY, \
                         ANTHROPIC_API_KEY or GROQ_API_KEY."
                    .to_string(),
            }
            .into());
        }

        debug!(
            "Configured providers: {:?}",
            Provider::ALL
                .iter()
                .filter(|p| llm_api_keys.contains_key(*p))
                .collect::<Vec<_>>()
        );

        Ok(Self {
            reddit,
            llm_api_keys,
            llm_models,
            llm_base_urls,
        })
    }

    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        self.llm_api_keys.get(&provider).map(String::as_str)
    }

    pub fn model(&self, provider: Provider) -> &str {
        self.llm_models
            .get(&provider)
            .map(String::as_str)
            .unwrap_or_else(|| default_model(provider).1)
    }

    pub fn base_url(&self, provider: Provider) -> &str {
        self.llm_base_urls
            .get(&provider)
            .map(String::as_str)
            .unwrap_or_else(|| default_base_url(provider).1)
    }

    fn try_load_dotenv() {
        if dotenvy::dotenv().is_ok() {
            return;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("adsynth").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }
    }
}

fn default_model(provider: Provider) -> (&'static str, &'static str) {
    match provider {
        Provider::OpenAi => ("OPENAI_MODEL", "gpt-4o"),
        Provider::Claude => ("CLAUDE_MODEL", "claude-3-5-sonnet-20240620"),
        Provider::Groq => ("GROQ_MODEL", "llama-3.3-70b-versatile"),
    }
}

fn default_base_url(provider: Provider) -> (&'static str, &'static str) {
    match provider {
        Provider::OpenAi => ("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
        Provider::Claude => ("ANTHROPIC_BASE_URL", DEFAULT_ANTHROPIC_BASE_URL),
        Provider::Groq => ("GROQ_BASE_URL", DEFAULT_GROQ_BASE_URL),
    }
}

fn validated_url(field: &str, value: String) -> Result<String, ConfigError> {
    Url::parse(&value).map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.clone(),
    })?;
    Ok(value.trim_end_matches('/').to_string())
}
