//! Linear pipeline behind `generate_ad`: scrape, extract, build the prompt,
//! then run each requested provider in turn.

use adsynth_core::artifacts::{save_ad_copy, save_prompt, save_raw_dump, RawThreadDump};
use adsynth_core::{
    AdCopyResult, AppConfig, CoreError, ErrorReporter, LlmError, ProductInfo, Provider,
};
use insight_engine::{InsightExtractor, PromptBuilder};
use llm_interface::{LlmProvider, ProviderAdapter};
use reddit_client::{RedditClient, RedditOAuth2Config};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::cli::ModelSelector;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub subreddit: String,
    pub limit: u32,
    pub models: ModelSelector,
    pub product: Option<ProductInfo>,
    pub save_data: bool,
    pub stream: bool,
    pub comment_limit: u32,
    pub output_dir: PathBuf,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub thread_count: usize,
    pub results: Vec<AdCopyResult>,
    pub failures: Vec<(Provider, LlmError)>,
    pub artifacts: Vec<PathBuf>,
}

pub fn ad_header(provider: Provider) -> String {
    format!("--- GENERATED AD SCRIPT ({}) ---", provider)
}

/// Runs the whole pipeline once, writing ad copy to `out`.
///
/// With a single provider selected, any provider error aborts the run. With
/// all providers selected, failures are collected and the run only fails when
/// none of them produced copy.
pub async fn run<W: Write>(
    config: &AppConfig,
    options: &RunOptions,
    out: &mut W,
) -> Result<RunReport, CoreError> {
    let reporter = ErrorReporter::new();
    let mut report = RunReport::default();

    // Adapters are built before scraping so a missing key in single-provider
    // mode fails without touching the network.
    let mut adapters = Vec::new();
    for provider in options.models.providers() {
        match ProviderAdapter::from_config(provider, config) {
            Ok(adapter) => adapters.push(adapter),
            Err(CoreError::Llm(err)) if options.models.is_all() => {
                reporter.report_provider_failure(&err);
                report.failures.push((provider, err));
            }
            Err(err) => return Err(err),
        }
    }

    let oauth = RedditOAuth2Config::from_credentials(&config.reddit)
        .with_comment_limit(options.comment_limit);
    let mut reddit = RedditClient::new(oauth)?;
    let threads = reddit
        .fetch_top_threads(&options.subreddit, options.limit)
        .await?;
    report.thread_count = threads.len();
    if threads.is_empty() {
        warn!("r/{} returned no threads", options.subreddit);
    }

    if options.save_data {
        let dump = RawThreadDump::new(options.subreddit.clone(), threads.clone());
        report
            .artifacts
            .push(save_raw_dump(&options.output_dir, &dump)?);
    }

    let insights = InsightExtractor::default().extract(&threads);
    let prompt = PromptBuilder::default().build(&insights, options.product.as_ref());
    if options.save_data {
        report
            .artifacts
            .push(save_prompt(&options.output_dir, &prompt)?);
    }

    for adapter in &adapters {
        let provider = adapter.provider();
        info!("Generating ad script with {}...", provider);

        // The header goes out with the first text so a failed provider leaves
        // nothing on stdout.
        let header = format!("\n{}\n", ad_header(provider));
        let mut header_written = false;
        let mut write_error: Option<io::Error> = None;
        let outcome = adapter
            .generate(&prompt, options.stream, |chunk| {
                if write_error.is_some() {
                    return;
                }
                let mut written = Ok(());
                if !header_written {
                    header_written = true;
                    written = out.write_all(header.as_bytes());
                }
                if let Err(e) = written
                    .and_then(|_| out.write_all(chunk.as_bytes()))
                    .and_then(|_| out.flush())
                {
                    write_error = Some(e);
                }
            })
            .await;
        if let Some(e) = write_error {
            return Err(e.into());
        }

        match outcome {
            Ok(result) => {
                if !header_written {
                    write!(out, "{}", header)?;
                }
                if !result.streamed {
                    write!(out, "{}", result.text)?;
                }
                writeln!(out)?;
                out.flush()?;

                if options.save_data {
                    report
                        .artifacts
                        .push(save_ad_copy(&options.output_dir, &result)?);
                }
                report.results.push(result);
            }
            Err(CoreError::Llm(err)) if options.models.is_all() => {
                if header_written {
                    writeln!(out)?;
                }
                reporter.report_provider_failure(&err);
                report.failures.push((provider, err));
            }
            Err(err) => return Err(err),
        }
    }

    if report.results.is_empty() && !report.failures.is_empty() {
        return Err(CoreError::AllProvidersFailed {
            failures: report.failures,
        });
    }

    info!(
        "Generated {} ad script(s), {} provider(s) failed",
        report.results.len(),
        report.failures.len()
    );
    Ok(report)
}
