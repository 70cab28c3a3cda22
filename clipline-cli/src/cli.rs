// clipline-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Clipline: clip detection and export tool",
    long_about = "Detects clip-worthy segments in long recordings via an external analysis worker and exports them with an external encoder, via the clipline-core library."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detects clip-worthy segments in a recording
    Analyze(AnalyzeArgs),
    /// Exports planned clips as independent media files
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Input recording to analyze
    #[arg(short = 'i', long = "input", required = true, value_name = "INPUT_FILE")]
    pub input_path: PathBuf,

    /// Optional: write the detected clips as a JSON plan file
    #[arg(short = 'p', long = "plan", value_name = "PLAN_FILE")]
    pub plan_path: Option<PathBuf>,

    /// Optional: analysis worker binary (defaults to clip-analyzer in PATH).
    /// Can also be set via the CLIPLINE_ANALYZER environment variable.
    #[arg(long, value_name = "PROGRAM", env = "CLIPLINE_ANALYZER")]
    pub analyzer: Option<PathBuf>,

    /// Optional: extra arguments passed to the analysis worker
    #[arg(long = "analyzer-arg", value_name = "ARG")]
    pub analyzer_args: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Clip plan file produced by `clipline analyze --plan`
    #[arg(short = 'p', long = "plan", required = true, value_name = "PLAN_FILE")]
    pub plan_path: PathBuf,

    /// Directory where exported clips will be saved
    #[arg(short = 'o', long = "output", required = true, value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Resume a previous run from its manifest, skipping completed clips
    #[arg(long, value_name = "MANIFEST_FILE")]
    pub resume: Option<PathBuf>,

    /// Re-encode clips instead of stream-copying them
    #[arg(long, default_value_t = false)]
    pub reencode: bool,

    /// Optional: encoder binary (defaults to ffmpeg in PATH).
    /// Can also be set via the CLIPLINE_ENCODER environment variable.
    #[arg(long, value_name = "PROGRAM", env = "CLIPLINE_ENCODER")]
    pub encoder: Option<PathBuf>,

    /// Optional: ntfy topic URL for a completion notification
    /// (e.g. https://ntfy.sh/your_topic).
    /// Can also be set via the CLIPLINE_NTFY_TOPIC environment variable.
    #[arg(long, value_name = "TOPIC_URL", env = "CLIPLINE_NTFY_TOPIC")]
    pub ntfy: Option<String>,
}
