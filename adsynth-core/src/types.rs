use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A thread fetched from the forum, with its top comments in ranking order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub id: String,
    pub title: String,
    pub body: String,
    pub comments: Vec<String>,
    pub score: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub num_comments: u32,
}

impl ThreadSummary {
    /// Title, body and comments in reading order, skipping empty fields.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.title.as_str())
            .chain(std::iter::once(self.body.as_str()))
            .chain(self.comments.iter().map(String::as_str))
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightSet {
    pub pain_points: Vec<String>,
    pub trending_terms: Vec<String>,
    pub source_thread_ids: BTreeSet<String>,
}

impl InsightSet {
    pub fn is_empty(&self) -> bool {
        self.pain_points.is_empty()
            && self.trending_terms.is_empty()
            && self.source_thread_ids.is_empty()
    }
}

/// User-supplied description of the advertised product.
///
/// Every field is optional in the source file; absent keys deserialize to an
/// empty string and the prompt builder substitutes a default clause.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductInfo {
    pub product_name: String,
    pub product_description: String,
    pub target_audience: String,
    #[serde(alias = "use_cases")]
    pub key_use_cases: String,
    pub campaign_goal: String,
    pub niche: String,
}

impl ProductInfo {
    /// Built-in demo product.
    pub fn sample() -> Self {
        Self {
            product_name: "FocusFlow".to_string(),
            product_description: "A productivity app that helps users maintain focus and track their work habits using AI-powered insights and gentle reminders.".to_string(),
            target_audience: "Remote workers, freelancers, and students who struggle with distractions".to_string(),
            key_use_cases: "Deep work sessions, deadline management, habit building, distraction blocking".to_string(),
            campaign_goal: "Increase app downloads and free trial signups".to_string(),
            niche: "productivity".to_string(),
        }
    }
}

/// The rendered prompt sent to every provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prompt(String);

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Claude,
    Groq,
}

impl Provider {
    /// Every provider, in the order "all" mode invokes them.
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Claude, Provider::Groq];

    /// Lower-case identifier used on the command line and in file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Claude => "claude",
            Provider::Groq => "groq",
        }
    }

    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Claude => "ANTHROPIC_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::OpenAi => "OpenAI",
            Provider::Claude => "Claude",
            Provider::Groq => "Groq",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdCopyResult {
    pub provider: Provider,
    pub text: String,
    pub streamed: bool,
}
