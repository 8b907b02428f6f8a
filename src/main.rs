//! Lingua-Crawl main entry point
//!
//! This is the command-line interface for the repository language harvester.

use anyhow::Context;
use clap::Parser;
use lingua_crawl::config::{load_config_with_hash, Config};
use lingua_crawl::crawler::Crawler;
use lingua_crawl::input::{handle_input, CrawlRequest, ObjectType};
use lingua_crawl::output::{JsonFileSink, ReportSink};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Lingua-Crawl: repository language harvester
///
/// Searches a code-hosting site for keywords and reports the language
/// composition of every repository found. The response is always JSON on
/// stdout: the report, or an `{"error": ...}` object.
#[derive(Parser, Debug)]
#[command(name = "lingua-crawl")]
#[command(version)]
#[command(about = "Repository language harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Read the JSON request from a file ("-" for stdin)
    #[arg(short, long, value_name = "FILE", conflicts_with = "keywords")]
    input: Option<String>,

    /// Whitespace-separated search keywords
    #[arg(short, long, required_unless_present = "input")]
    keywords: Option<String>,

    /// Object type to search for (Repositories, Issues, Wikis)
    #[arg(short = 't', long = "type", default_value = "Repositories")]
    object_type: String,

    /// Egress proxy as host:port (repeatable)
    #[arg(short, long = "proxy", value_name = "HOST:PORT")]
    proxies: Vec<String>,

    /// Do not write the report to the results directory
    #[arg(long)]
    no_save: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("invalid configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let request_text = read_request(&cli)?;
    let sink = (!cli.no_save).then(|| JsonFileSink::from_config(&config.output));

    let crawler =
        Crawler::with_proxies(config, &cli.proxies).context("failed to initialize crawler")?;
    let response = handle_input(
        &crawler,
        &request_text,
        sink.as_ref().map(|s| s as &dyn ReportSink),
    )
    .await;

    println!("{}", response);
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the JSON response.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lingua_crawl=info,warn"),
            1 => EnvFilter::new("lingua_crawl=debug,info"),
            2 => EnvFilter::new("lingua_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Produces the raw JSON request from `--input` or the keyword flags
fn read_request(cli: &Cli) -> anyhow::Result<String> {
    if let Some(source) = &cli.input {
        if source == "-" {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read request from stdin")?;
            return Ok(text);
        }
        return std::fs::read_to_string(source)
            .with_context(|| format!("failed to read request from {}", source));
    }

    let object_type: ObjectType = cli.object_type.parse()?;
    let keywords = cli.keywords.as_deref().unwrap_or_default();
    let request = CrawlRequest::from_keyword_line(keywords, object_type, cli.proxies.clone())?;

    Ok(serde_json::to_string(&request)?)
}
