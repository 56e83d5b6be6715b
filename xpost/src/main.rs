//! xpost - Publish a post to X, optionally with one media attachment

use clap::{Parser, ValueEnum};
use libxpost::logging::{LogFormat, LoggingConfig};
use libxpost::transport::HttpTransport;
use libxpost::{Config, Credentials, PostPublisher, PublishOutcome, Result, UploadStrategy};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "xpost")]
#[command(version)]
#[command(about = "Publish a post to X, optionally with one media attachment")]
#[command(long_about = "\
xpost - Publish a post to X, optionally with one media attachment

DESCRIPTION:
    Signs every request with OAuth 1.0a (HMAC-SHA1). When FILE exists it is
    uploaded first and attached to the post. If the upload fails, the post is
    still published as text only and a warning is printed.

CREDENTIALS:
    X_API_KEY, X_API_SECRET, X_ACCESS_TOKEN, X_ACCESS_TOKEN_SECRET
    must all be set. Nothing is sent when any of them is missing.

CONFIGURATION:
    Optional file: $XPOST_CONFIG or ~/.config/xpost/config.toml

    [api]
    post_endpoint = \"https://api.x.com/2/tweets\"
    site_root = \"https://x.com\"
    timeout_secs = 30

    [upload]
    strategy = \"media_v2\"   # or \"legacy\"
    category = \"tweet_image\"
    max_bytes = 5242880

EXIT CODES:
    0 - Post published (with or without attachment)
    1 - Missing credentials, configuration error or post rejected
    3 - Invalid input (empty text)
")]
struct Cli {
    /// Text of the post
    text: String,

    /// Media file to attach (ignored if it does not exist)
    file: Option<PathBuf>,

    /// Configuration file (overrides XPOST_CONFIG)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Media upload protocol (legacy or media-v2)
    #[arg(short, long, value_name = "STRATEGY")]
    strategy: Option<UploadStrategy>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log format for stderr (text, json or pretty; overrides XPOST_LOG_FORMAT)
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if let Some(format) = cli.log_format {
        logging.format = format;
    }
    logging.verbose = cli.verbose;
    logging.init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let credentials = Credentials::from_env()?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if let Some(strategy) = cli.strategy {
        config.upload.strategy = strategy;
    }
    debug!(strategy = %config.upload.strategy, "Configuration loaded");

    let transport = HttpTransport::new(config.timeout())?;
    let publisher = PostPublisher::from_config(&config, credentials, Arc::new(transport));

    let outcome = publisher.publish(&cli.text, cli.file.as_deref()).await?;

    if let Some(failure) = &outcome.attachment_failure {
        eprintln!("Warning: attachment not posted, published text only: {}", failure);
    }

    let url = publisher.permalink(&outcome);
    match cli.format {
        OutputFormat::Text => print_text(&outcome, &url),
        OutputFormat::Json => print_json(&outcome, &url),
    }

    Ok(())
}

fn print_text(outcome: &PublishOutcome, url: &str) {
    println!("Post ID: {}", outcome.post_id);
    println!("URL: {}", url);
    for media_id in &outcome.media_ids {
        println!("Media ID: {}", media_id);
    }
}

fn print_json(outcome: &PublishOutcome, url: &str) {
    let output = serde_json::json!({
        "post_id": outcome.post_id,
        "url": url,
        "media_ids": outcome.media_ids,
        "attachment_error": outcome.attachment_failure.as_ref().map(|e| e.to_string()),
    });
    println!("{}", output);
}
