//! Turns scraped threads into a prompt: heuristic insight extraction
//! followed by template rendering.

pub mod extractor;
pub mod prompt;

pub use extractor::{extract, ExtractorConfig, InsightExtractor};
pub use prompt::{build, PromptBuilder};
