mod cli;
mod orchestrator;

use adsynth_core::product::load_product_info;
use adsynth_core::{AppConfig, CoreError, ErrorExt, ErrorReporter, ProductInfo};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cli::{Args, ModelSelector};
use orchestrator::{RunOptions, RunReport};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    tracing::info!("Starting AdSynth ad generator");

    match run(args).await {
        Ok(report) => {
            tracing::info!(
                "Done: {} threads scraped, {} ad script(s), {} file(s) saved",
                report.thread_count,
                report.results.len(),
                report.artifacts.len()
            );
            for (provider, err) in &report.failures {
                eprintln!("Warning: {} failed: {}", provider, err.user_friendly_message());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            ErrorReporter::new().report_error(&e);
            eprintln!("Error: {}", e.user_friendly_message());
            if let CoreError::AllProvidersFailed { failures } = &e {
                for (provider, err) in failures {
                    eprintln!("  {}: {}", provider, err);
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let default_filter = format!(
        "generate_ad={lvl},adsynth_core={lvl},reddit_client={lvl},llm_interface={lvl},insight_engine={lvl}",
        lvl = default_level
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<RunReport, CoreError> {
    let config = AppConfig::from_env()?;

    let product = match (&args.product_info, args.sample_product) {
        (Some(path), _) => Some(load_product_info(path)?),
        (None, true) => Some(ProductInfo::sample()),
        (None, false) => None,
    };

    let options = RunOptions {
        subreddit: args.subreddit,
        limit: args.limit,
        models: ModelSelector::from(args.model),
        product,
        save_data: args.save_data,
        stream: args.stream,
        comment_limit: args.comment_limit,
        output_dir: args.output_dir,
    };

    let mut stdout = std::io::stdout().lock();
    orchestrator::run(&config, &options, &mut stdout).await
}
