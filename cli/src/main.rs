#![deny(missing_docs)]

//! # OpenAPI Graph CLI
//!
//! Command Line Interface over the document graph.
//!
//! Supported Commands:
//! - `tree`: Prints the namespace hierarchy of an API description.
//! - `routes`: Lists routes, operations and responses (text or JSON).

use clap::{Parser, Subcommand};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod error;
mod routes;
mod source;
mod tree;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI document graph CLI")]
struct Cli {
    /// Log construction details to stderr.
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the namespace hierarchy derived from route segments.
    Tree(tree::TreeArgs),
    /// List routes with their operations and responses.
    Routes(routes::RoutesArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &cli.command {
        Commands::Tree(args) => tree::execute(args, &mut out),
        Commands::Routes(args) => routes::execute(args, &mut out),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
