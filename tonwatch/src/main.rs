mod cmds;
mod config_file;
mod tasks;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tonwatch")]
#[command(version = "0.1.0")]
#[command(about = "TON validator-election indexer CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Run(cmds::run::Opts),

    #[command(alias = "validation_cycles")]
    ValidationCycles(cmds::validation_cycles::Opts),

    Elections(cmds::elections::Opts),

    Complaints(cmds::complaints::Opts),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Run(opts) => cmds::run::run(opts).await?,
        Commands::ValidationCycles(opts) => cmds::validation_cycles::run(opts).await?,
        Commands::Elections(opts) => cmds::elections::run(opts).await?,
        Commands::Complaints(opts) => cmds::complaints::run(opts).await?,
    }

    Ok(())
}
