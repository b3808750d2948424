#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the options-chain extractor.
//!
//! Loads an options page (live or saved), splits the chain by expiration,
//! and writes one CSV per expiration into the output directory.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use option_chain_export::{ExportTarget, export_chain, export_first_expiration};
use option_chain_parser::{ChainParser, ParseMode, Parsed};
use option_chain_source::{DocumentSource, FetchConfig, SavedPageSource, WebPageSource};

#[derive(Parser, Debug)]
#[command(
    name = "option_chain",
    about = "Parses an options chain page into one CSV per expiration"
)]
struct Cli {
    /// Symbol to look up
    #[arg(long, default_value = "spx")]
    symbol: String,
    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,
    /// Parse a saved HTML page instead of fetching one
    #[arg(long)]
    input: Option<PathBuf>,
    /// Only export the first expiration in the page
    #[arg(long)]
    first_only: bool,
    /// Page URL with a `{symbol}` placeholder
    #[arg(long)]
    url_template: Option<String>,
    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,
    /// Print additional information
    #[arg(long)]
    info: bool,
    /// Print debug information
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    const fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else if self.info {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        }
    }

    const fn mode(&self) -> ParseMode {
        if self.first_only {
            ParseMode::FirstExpiration
        } else {
            ParseMode::AllExpirations
        }
    }

    fn fetch_config(&self) -> FetchConfig {
        let config = FetchConfig::default().with_timeout(Duration::from_secs(self.timeout));
        match &self.url_template {
            Some(template) => config.with_url_template(template),
            None => config,
        }
    }
}

/// Sets up `pretty_env_logger` at `level`; `RUST_LOG` still wins when set.
fn init_logger(level: log::LevelFilter) {
    pretty_env_logger::formatted_builder()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .try_init()
        .ok();
}

async fn run(
    source: &impl DocumentSource,
    cli: &Cli,
    target: &ExportTarget,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    log::info!("Loading {} chain ({})", cli.symbol, source.kind());
    let rows = source.load(&cli.symbol).await?;

    let paths = match ChainParser::default().parse(&rows, cli.mode())? {
        Parsed::Chain(chain) => {
            if chain.is_empty() {
                log::warn!("No expirations found for {}", cli.symbol);
            }
            export_chain(&chain, target)?
        }
        Parsed::First(first) => export_first_expiration(first, target)?
            .into_iter()
            .collect(),
    };

    Ok(paths)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logger(cli.log_level());

    let target = ExportTarget::new(&cli.out, &cli.symbol, chrono::Local::now().date_naive());

    let paths = if let Some(input) = &cli.input {
        run(&SavedPageSource::new(input), &cli, &target).await?
    } else {
        run(&WebPageSource::new(cli.fetch_config()), &cli, &target).await?
    };

    for path in &paths {
        println!("{}", path.display());
    }

    Ok(())
}
