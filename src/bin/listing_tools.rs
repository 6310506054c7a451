//! One-shot access to the listing operations.
//!
//! Usage:
//!   listing-tools tools
//!   listing-tools call list_brands --args '{"query": "trek", "limit": 5}'
//!   listing-tools call validate_bike_listing --args-file draft.json
//!   listing-tools check --data-dir ./data

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use listingdesk::telemetry::init_logging;
use listingdesk::{Catalog, CommonArgs, ListingTools, TOOLS};
use serde_json::Value;
use std::fs;
use std::io::{Read, stdin};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "listing-tools")]
#[command(about = "Call bike listing catalog and validation operations")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available operations.
    Tools,
    /// Run one operation and print its response envelope.
    Call {
        /// Operation name, e.g. `list_brands`.
        tool: String,
        /// Arguments as a JSON object.
        #[arg(long, conflicts_with = "args_file")]
        args: Option<String>,
        /// Read arguments from a file (`-` for stdin).
        #[arg(long)]
        args_file: Option<PathBuf>,
        /// Print compact JSON instead of pretty JSON.
        #[arg(long)]
        compact: bool,
    },
    /// Load the data directory and report table sizes.
    Check,
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

    match cli.command {
        Command::Tools => {
            for spec in TOOLS {
                let step = spec
                    .step
                    .map(|step| format!("step {step}"))
                    .unwrap_or_else(|| "any".to_string());
                println!("{:<34} {:<7} {}", spec.name, step, spec.description);
            }
            Ok(())
        }
        Command::Call {
            tool,
            args,
            args_file,
            compact,
        } => {
            let arguments = read_arguments(args, args_file)?;
            let settings = cli.common.resolve()?;
            let catalog = Catalog::load(&settings.data_dir)?;
            let response = ListingTools::new(&catalog).call(&tool, &arguments);
            let rendered = if compact {
                serde_json::to_string(&response)?
            } else {
                serde_json::to_string_pretty(&response)?
            };
            println!("{rendered}");
            if !response.success {
                std::process::exit(2);
            }
            Ok(())
        }
        Command::Check => {
            let settings = cli.common.resolve()?;
            let catalog = Catalog::load(&settings.data_dir)?;
            println!("data dir: {}", settings.data_dir.display());
            println!("schema:   {}", catalog.schema().schema_version);
            for (table, count) in catalog.counts() {
                println!("{table:<16} {count}");
            }
            println!("{:<16} {}", "option groups", catalog.option_groups().len());
            Ok(())
        }
    }
}

fn read_arguments(inline: Option<String>, file: Option<PathBuf>) -> Result<Value> {
    let raw = match (inline, file) {
        (Some(inline), _) => inline,
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            stdin()
                .read_to_string(&mut buf)
                .context("reading arguments from stdin")?;
            buf
        }
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("reading arguments from {}", path.display()))?,
        (None, None) => return Ok(Value::Null),
    };
    let value: Value = serde_json::from_str(&raw).context("parsing arguments JSON")?;
    if !value.is_object() && !value.is_null() {
        bail!("arguments must be a JSON object");
    }
    Ok(value)
}
