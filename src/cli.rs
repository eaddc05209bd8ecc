use adsynth_core::Provider;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "generate_ad")]
#[command(about = "Generate ad scripts from Reddit discussions using LLM providers")]
pub struct Args {
    /// Subreddit to scrape
    #[arg(short, long, default_value = "productivity")]
    pub subreddit: String,

    /// Number of hot threads to scrape
    #[arg(short, long, default_value_t = 7)]
    pub limit: u32,

    /// LLM provider to use
    #[arg(short, long, value_enum, default_value_t = ModelArg::All)]
    pub model: ModelArg,

    /// JSON or TOML file with product information. Without it the prompt uses
    /// generic product wording; pass --sample-product for the FocusFlow example.
    #[arg(long, value_name = "PATH")]
    pub product_info: Option<PathBuf>,

    /// Use the built-in FocusFlow product when no file is given
    #[arg(long, conflicts_with = "product_info")]
    pub sample_product: bool,

    /// Save scraped data, the prompt and the generated ads to files
    #[arg(long)]
    pub save_data: bool,

    /// Stream output for providers that support it (currently only Groq)
    #[arg(long)]
    pub stream: bool,

    /// Top comments kept per thread
    #[arg(long, default_value_t = reddit_client::DEFAULT_COMMENT_LIMIT)]
    pub comment_limit: u32,

    /// Directory for files written by --save-data
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelArg {
    Openai,
    Claude,
    Groq,
    All,
}

/// Which providers a run asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSelector {
    Single(Provider),
    All,
}

impl ModelSelector {
    pub fn providers(&self) -> Vec<Provider> {
        match self {
            ModelSelector::Single(provider) => vec![*provider],
            ModelSelector::All => Provider::ALL.to_vec(),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ModelSelector::All)
    }
}

impl From<ModelArg> for ModelSelector {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Openai => ModelSelector::Single(Provider::OpenAi),
            ModelArg::Claude => ModelSelector::Single(Provider::Claude),
            ModelArg::Groq => ModelSelector::Single(Provider::Groq),
            ModelArg::All => ModelSelector::All,
        }
    }
}
