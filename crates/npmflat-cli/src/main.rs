#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use commands::resolve::{OutputFormat, ResolveArgs};
use miette::Result;
use npmflat_core::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "npmflat")]
#[command(author, version, about = "Flatten an npm dependency tree into recipe resources", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output and logs (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Flatten the dependency tree of a project into resources
    Resolve {
        /// Saved `npm ls --json --long` output ("-" for stdin).
        /// Without it, npm is run in the working directory.
        #[arg(long, value_name = "FILE")]
        listing: Option<PathBuf>,

        /// Native-addon mode: capture executables of root-level resources
        #[arg(long)]
        native: bool,

        /// Output format (defaults to json with --json, recipe otherwise)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Write output to a file instead of stdout
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,

        /// Skip fetching tarball hashes
        #[arg(long)]
        no_hash: bool,

        /// Maximum number of hashes fetched at once
        #[arg(long, value_name = "N")]
        max_concurrent: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Commands::Version => commands::version::run(),
        Commands::Resolve {
            listing,
            native,
            format,
            output,
            no_hash,
            max_concurrent,
        } => {
            let mut config = Config::new(cwd)
                .with_verbosity(cli.verbose)
                .with_json_logs(cli.json)
                .with_native_addons(native);
            if let Some(max) = max_concurrent {
                config = config.with_max_concurrent_fetches(max);
            }

            logging::init(config.verbosity, config.json_logs)?;

            let format = format.unwrap_or(if cli.json {
                OutputFormat::Json
            } else {
                OutputFormat::Recipe
            });

            commands::resolve::run(
                &config,
                ResolveArgs {
                    listing,
                    format,
                    output,
                    hash: !no_hash,
                },
            )
        }
    }
}
