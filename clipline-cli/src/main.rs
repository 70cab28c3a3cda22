// clipline-cli/src/main.rs
//
// Entry point for the clipline CLI. Responsibilities:
// - Parsing command-line arguments (see cli.rs).
// - Initializing logging (env_logger, driven by RUST_LOG).
// - Dispatching to the subcommand implementations.
// - Mapping core errors to user-facing messages and exit codes.

use clap::Parser;
use clipline_core::CoreError;
use std::process;

mod cli;
mod commands;
mod error;
mod logging;
mod progress;
mod terminal;

use cli::{Cli, Commands};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze(args) => commands::analyze::run_analyze(args),
        Commands::Export(args) => commands::export::run_export(args),
    };

    if let Err(e) = result {
        let suggestion = match &e {
            CoreError::LaunchFailure { program, .. } => Some(format!(
                "Install '{program}' or point clipline at it with --analyzer/--encoder"
            )),
            _ => None,
        };
        terminal::print_error("Fatal error", &e.to_string(), suggestion.as_deref());
        process::exit(1);
    }
}
