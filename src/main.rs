use anyhow::Result;
use clap::Parser;
use stockline::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.execute()
}
