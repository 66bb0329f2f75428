use anyhow::Result;
use clap::Parser;

use tonwatch_datastore::queries;

use crate::cmds::{load_config, open_datastore};

#[derive(Debug, Parser)]
pub struct Opts {
    #[clap(long, default_value = "./config.json")]
    config: std::path::PathBuf,

    #[clap(long)]
    db: Option<std::path::PathBuf>,

    #[clap(long)]
    election_id: Option<u64>,

    #[clap(long, default_value = "1")]
    limit: usize,
}

pub async fn run(opts: &Opts) -> Result<()> {
    let config = load_config(&opts.config)?;
    let datastore = open_datastore(&config, &opts.db)?;

    let elections = queries::elections(&datastore, opts.election_id, opts.limit).await?;
    println!("{}", serde_json::to_string_pretty(&elections)?);

    Ok(())
}
