use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stockline")]
#[command(about = "Line age and author ownership statistics for git repositories")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, help = "Path to git repository")]
    pub repo: Option<PathBuf>,

    #[arg(long = "exclude", help = "Exclude files matching this gitignore-style pattern (repeatable)")]
    pub exclude: Vec<String>,

    #[arg(long, help = "Resolve author identities through the repository's .mailmap")]
    pub use_mailmap: bool,

    #[arg(long, help = "Resolve author identities through this mailmap file")]
    pub mailmap: Option<PathBuf>,

    #[arg(long, help = "Compute ages relative to the current time instead of the newest commit")]
    pub now: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Line age and ownership statistics for a single tree snapshot
    Snapshot {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,

        #[arg(help = "Revision to analyze (default HEAD)")]
        rev: Option<String>,
    },
    /// Per-day statistics across the full history of a branch
    History {
        #[arg(long, default_value_t = 4, help = "Number of worker threads")]
        threads: usize,

        #[arg(long, help = "Write NDJSON records to this file instead of stdout")]
        output: Option<PathBuf>,

        #[arg(long, help = "Suppress the progress bar")]
        quiet: bool,

        #[arg(help = "Revision to start from (default HEAD)")]
        rev: Option<String>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Snapshot { json, ndjson, rev } => {
                crate::snapshot::exec(self.common, json, ndjson, rev)
            }
            Commands::History {
                threads,
                output,
                quiet,
                rev,
            } => crate::history::exec(self.common, threads, output, quiet, rev),
        }
    }
}
