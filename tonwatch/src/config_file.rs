use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    pub lite_client_binary: Option<String>,
    pub lite_client_config: Option<String>,
    pub db_path: Option<String>,
    pub tick_interval: Option<u64>,
}

pub fn read_or_create_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let file = fs::File::open(path).context("Failed to open config file")?;
        let config: Config = serde_json::from_reader(file).context("Failed to parse config file")?;
        Ok(config)
    } else {
        let config = Config::default();
        let file = fs::File::create(path).context("Failed to create config file")?;
        serde_json::to_writer_pretty(file, &config).context("Failed to write default config file")?;
        Ok(config)
    }
}
