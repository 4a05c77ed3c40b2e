use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mailbench")]
#[command(about = "Launch email classifier runs and review their quality metrics", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the configured classifier on a source and analyze its output
    Run(RunArgs),
    /// Analyze existing result files without running the classifier
    Analyze(AnalyzeArgs),
    /// List recorded runs, newest first
    History {
        /// Only runs with this status (pending, running, completed, failed)
        #[arg(long)]
        status: Option<String>,
        /// Only runs with this mode (sr, qf, both)
        #[arg(long)]
        mode: Option<String>,
    },
    /// Show one run with its per-file analyses
    Show {
        run_id: String,
        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a run from history
    Delete {
        run_id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Source file (.csv, .xlsx) or folder of source files
    #[arg(long)]
    pub source: String,
    /// Where the classifier writes its result files
    #[arg(long)]
    pub out: Option<String>,
    /// Classification mode: sr, qf or both
    #[arg(long)]
    pub mode: Option<String>,
    #[arg(long)]
    pub use_filter: Option<bool>,
    #[arg(long)]
    pub async_mode: Option<bool>,
    #[arg(long)]
    pub max_concurrency: Option<u32>,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// A result file or a directory of result files
    pub path: PathBuf,
    /// JSON file with a list of pre-filter stats to merge
    #[arg(long)]
    pub stats: Option<PathBuf>,
    /// Print analyses as JSON
    #[arg(long)]
    pub json: bool,
    /// Analyze files on a thread pool
    #[arg(long)]
    pub parallel: bool,
}
