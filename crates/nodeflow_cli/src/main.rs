// SPDX-License-Identifier: MIT OR Apache-2.0
//! `nodeflow` - check and format node graph files.
//!
//! Reads the plain-data (JSON) graph format, hydrates it through
//! `nodeflow_graph`, and reports or re-emits it in canonical form.

mod commands;
mod error;
mod settings;

use clap::{Parser, Subcommand};
use error::CliError;
use settings::CliSettings;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Node graph file tools
#[derive(Debug, Parser)]
#[command(name = "nodeflow", version, about = "Check and format node graph files")]
struct Cli {
    /// Settings file (RON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode a graph and print node/connection counts
    Check {
        /// Graph file
        file: PathBuf,
    },

    /// Print the canonical encoding of a graph
    Fmt {
        /// Graph file
        file: PathBuf,

        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },

    /// Verify that decoding and re-encoding is lossless
    Roundtrip {
        /// Graph file
        file: PathBuf,
    },

    /// Write a default settings file
    InitConfig {
        /// Destination path
        path: PathBuf,
    },
}

fn init_tracing(filter: &str, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("nodeflow_cli=debug,nodeflow_graph=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli, settings: &CliSettings) -> Result<(), CliError> {
    match cli.command {
        Command::Check { file } => {
            let report = commands::check(&file, settings)?;
            println!(
                "{}: {} nodes, {} connections",
                file.display(),
                report.nodes,
                report.connections
            );
            for id in &report.dangling {
                println!("dangling connection {id}");
            }
        }
        Command::Fmt { file, pretty } => {
            println!("{}", commands::format(&file, pretty || settings.pretty)?);
        }
        Command::Roundtrip { file } => {
            commands::round_trip(&file)?;
            println!("{}: round trip ok", file.display());
        }
        Command::InitConfig { path } => commands::init_config(&path)?,
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let settings = match CliSettings::load_or_default(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("nodeflow: {e}");
            std::process::exit(2);
        }
    };

    init_tracing(&settings.log_filter, cli.verbose);
    tracing::debug!("Starting nodeflow v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli, &settings) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
