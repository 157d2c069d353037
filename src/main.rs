//! searchsynth command-line entry point

use anyhow::{bail, Result};
use clap::Parser;
use searchsynth::{
    config::{self, FetchStrategy, SynthesisBackend},
    Pipeline, Query,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Search the web and synthesize a new answer from the result pages
#[derive(Debug, Parser)]
#[command(name = "searchsynth", version)]
struct Cli {
    /// Query text; multiple words are joined with spaces
    query: Vec<String>,

    /// How result pages are fetched
    #[arg(short, long, value_enum)]
    method: Option<FetchStrategy>,

    /// Which provider writes the answer
    #[arg(short, long, value_enum)]
    provider: Option<SynthesisBackend>,

    /// Number of search results to read (1-10)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u16).range(1..=10))]
    results: Option<u16>,

    /// Path to a settings file
    #[arg(short, long, env = config::SETTINGS_PATH_VAR)]
    config: Option<PathBuf>,

    /// Print the result list before the answer
    #[arg(long)]
    show_sources: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let query = match Query::new(cli.query.join(" ")) {
        Ok(query) => query,
        Err(_) => bail!("A search query is required."),
    };

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            bail!("Failed to read .env: {}", e);
        }
    }

    let mut settings = config::load(cli.config.as_deref())?;
    if let Some(method) = cli.method {
        settings.fetch.strategy = method;
    }
    if let Some(provider) = cli.provider {
        settings.synthesis.provider = provider;
    }
    if let Some(count) = cli.results {
        settings.search.result_count = usize::from(count);
    }
    settings.validate()?;

    info!("Starting searchsynth v{}", searchsynth::VERSION);

    let pipeline = Pipeline::from_settings(&settings)?;
    let outcome = pipeline.run(&query).await;

    if cli.show_sources {
        for (i, locator) in outcome.locators().iter().enumerate() {
            println!("{}. {} <{}>", i + 1, locator.title, locator.link);
        }
        if !outcome.locators().is_empty() {
            println!();
        }
    }
    println!("{}", outcome.answer());

    Ok(())
}
