pub mod complaints;
pub mod elections;
pub mod run;
pub mod validation_cycles;

use anyhow::{Context, Result};
use std::path::Path;

use tonwatch_datastore::ValidationDatastore;
use tonwatch_liteclient::LiteClient;

use crate::config_file::{read_or_create_config, Config};

pub(crate) fn load_config(path: &Path) -> Result<Config> {
    read_or_create_config(path).context("Failed to read config")
}

pub(crate) fn open_datastore(config: &Config, db_path: &Option<std::path::PathBuf>) -> Result<ValidationDatastore> {
    let path = db_path
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .or_else(|| config.db_path.clone())
        .unwrap_or_else(|| "./tonwatch_db".to_string());
    ValidationDatastore::new(Path::new(&path)).context("Failed to open datastore")
}

pub(crate) fn make_client(config: &Config) -> Result<LiteClient> {
    let binary = config
        .lite_client_binary
        .clone()
        .unwrap_or_else(|| "lite-client".to_string());
    let global_config = config
        .lite_client_config
        .clone()
        .unwrap_or_else(|| "liteserver_config.json".to_string());
    Ok(LiteClient::new(binary, global_config))
}
