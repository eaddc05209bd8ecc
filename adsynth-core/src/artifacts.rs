//! Optional on-disk artifacts written with `--save-data`.

use crate::error::CoreError;
use crate::types::{AdCopyResult, Prompt, ThreadSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const RAW_DUMP_FILE: &str = "scraped_data.json";
pub const PROMPT_FILE: &str = "llm_prompt.txt";
pub const RAW_DUMP_VERSION: &str = "1.0";

/// Scraped threads as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawThreadDump {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub subreddit: String,
    pub threads: Vec<ThreadSummary>,
}

impl RawThreadDump {
    pub fn new(subreddit: impl Into<String>, threads: Vec<ThreadSummary>) -> Self {
        Self {
            version: RAW_DUMP_VERSION.to_string(),
            created_at: Utc::now(),
            subreddit: subreddit.into(),
            threads,
        }
    }
}

pub fn save_raw_dump(dir: &Path, dump: &RawThreadDump) -> Result<PathBuf, CoreError> {
    let json = serde_json::to_string_pretty(dump)?;
    write_artifact(dir, RAW_DUMP_FILE, &json)
}

pub fn load_raw_dump(path: &Path) -> Result<RawThreadDump, CoreError> {
    let content = fs::read_to_string(path)?;
    let dump: RawThreadDump = serde_json::from_str(&content)?;

    if dump.version != RAW_DUMP_VERSION {
        return Err(CoreError::InvalidInput {
            message: format!(
                "Unsupported raw dump version {} in {}. Expected {}.",
                dump.version,
                path.display(),
                RAW_DUMP_VERSION
            ),
        });
    }

    Ok(dump)
}

pub fn save_prompt(dir: &Path, prompt: &Prompt) -> Result<PathBuf, CoreError> {
    write_artifact(dir, PROMPT_FILE, prompt.as_str())
}

pub fn save_ad_copy(dir: &Path, result: &AdCopyResult) -> Result<PathBuf, CoreError> {
    let filename = format!("generated_ad_{}.txt", result.provider.slug());
    write_artifact(dir, &filename, &result.text)
}

fn write_artifact(dir: &Path, filename: &str, contents: &str) -> Result<PathBuf, CoreError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    fs::write(&path, contents)?;
    info!("Saved data to {}", path.display());
    Ok(path)
}
