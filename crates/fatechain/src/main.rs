mod commands;
mod config;
mod error;
mod output;
mod session;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use crate::commands::Commands;
use crate::error::CliError;
use crate::session::Session;

#[derive(Parser)]
#[command(name = "fatechain")]
#[command(about = "Run namespace operations as resumable step chains", long_about = None)]
struct Cli {
    /// Cluster state file
    #[arg(long, global = true, default_value = "fatechain-state.json")]
    state: PathBuf,

    /// Directory holding chain records
    #[arg(long, global = true, default_value = "fatechain-chains")]
    store: PathBuf,

    /// Configuration file (default: fatechain.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = Session::open(&cli.state, &cli.store, cli.config.as_deref())
        .and_then(|session| cli.command.execute(&session));

    if let Err(e) = result {
        print_error(&e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_error(error: &CliError) {
    eprintln!("error: {error}");

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("caused by: {cause}");
        source = std::error::Error::source(cause);
    }
}
