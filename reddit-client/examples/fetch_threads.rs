//! Fetches hot threads from a subreddit using credentials from the environment.
//!
//! ```text
//! cargo run -p reddit-client --example fetch_threads -- --subreddit rust --limit 3
//! ```

use adsynth_core::AppConfig;
use anyhow::Context;
use clap::Parser;
use reddit_client::{RedditClient, RedditOAuth2Config};

#[derive(Parser, Debug)]
#[command(name = "fetch_threads", about = "Print hot threads and their top comments")]
struct Args {
    #[arg(short, long, default_value = "productivity")]
    subreddit: String,

    #[arg(short, long, default_value_t = 5)]
    limit: u32,

    #[arg(long, default_value_t = 3)]
    comment_limit: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env().context("loading configuration")?;

    let oauth = RedditOAuth2Config::from_credentials(&config.reddit)
        .with_comment_limit(args.comment_limit);
    let mut client = RedditClient::new(oauth)?;

    let threads = client
        .fetch_top_threads(&args.subreddit, args.limit)
        .await
        .with_context(|| format!("fetching r/{}", args.subreddit))?;

    if threads.is_empty() {
        println!("r/{} returned no threads", args.subreddit);
        return Ok(());
    }

    for (index, thread) in threads.iter().enumerate() {
        println!("{}. [{}] {}", index + 1, thread.score, thread.title);
        println!("   {}", thread.url);
        for comment in &thread.comments {
            let preview: String = comment.chars().take(100).collect();
            println!("   > {}", preview);
        }
        println!();
    }

    Ok(())
}
