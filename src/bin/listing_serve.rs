//! Line-delimited JSON front end for the listing operations.
//!
//! Reads one request per line on stdin and writes one reply per line on
//! stdout. The catalog loads before the first request is read; a catalog that
//! fails to load ends the process without serving anything.

use anyhow::{Context, Result};
use clap::Parser;
use listingdesk::telemetry::init_logging;
use listingdesk::{Catalog, CommonArgs, ListingTools, serve};
use std::io::{self, BufReader};

#[derive(Parser, Debug)]
#[command(name = "listing-serve")]
#[command(about = "Answer newline-delimited JSON tool requests on stdin")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.common.log_filter.as_deref(), cli.common.log_format)?;
    let settings = cli.common.resolve()?;
    let catalog = Catalog::load(&settings.data_dir)
        .with_context(|| format!("loading catalog from {}", settings.data_dir.display()))?;
    let tools = ListingTools::new(&catalog);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let stats = serve(&tools, BufReader::new(stdin.lock()), stdout.lock())?;
    tracing::info!(
        requests = stats.requests,
        failed = stats.failed,
        malformed = stats.malformed,
        "input closed"
    );
    Ok(())
}
