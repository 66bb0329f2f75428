use anyhow::Result;
use clap::Parser;
use std::time::Duration;

use crate::cmds::{load_config, make_client, open_datastore};
use crate::tasks;

const DEFAULT_TICK_SECS: u64 = 60;

#[derive(Debug, Parser)]
pub struct Opts {
    #[clap(long, default_value = "./config.json")]
    config: std::path::PathBuf,

    #[clap(long)]
    db: Option<std::path::PathBuf>,

    /// Seconds between task runs; takes precedence over the config file.
    #[clap(long)]
    tick_interval: Option<u64>,

    /// Run each task once and exit instead of looping.
    #[clap(long)]
    once: bool,
}

pub async fn run(opts: &Opts) -> Result<()> {
    log::info!("Config: {:?}", opts.config);

    let config = load_config(&opts.config)?;
    let client = make_client(&config)?;
    let datastore = open_datastore(&config, &opts.db)?;

    let tick_interval =
        Duration::from_secs(tick_interval_secs(opts.tick_interval, config.tick_interval));
    let mut tick = tokio::time::interval(tick_interval);

    loop {
        tick.tick().await;

        match tasks::update_validation_cycle(&client, &datastore).await {
            Ok(status) => log::info!("update_validation_cycle: {status}"),
            Err(err) => log::error!("update_validation_cycle failed: {err:#}"),
        }
        match tasks::update_elections(&client, &datastore).await {
            Ok(status) => log::info!("update_elections: {status}"),
            Err(err) => log::error!("update_elections failed: {err:#}"),
        }
        match tasks::update_complaints(&client, &datastore).await {
            Ok(status) => log::info!("update_complaints: {status}"),
            Err(err) => log::error!("update_complaints failed: {err:#}"),
        }

        if opts.once {
            return Ok(());
        }
    }
}

fn tick_interval_secs(flag: Option<u64>, config: Option<u64>) -> u64 {
    flag.or(config).unwrap_or(DEFAULT_TICK_SECS)
}
