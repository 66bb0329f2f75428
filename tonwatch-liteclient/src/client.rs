use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use tonwatch_utils::stack_list::result_to_list;
use tonwatch_utils::tlb_text::tlb_to_tree;
use tonwatch_utils::tree::TreeValue;
use tonwatch_utils::pars::pars;

use crate::complaints::{decode_complaints, Complaint};
use crate::error::LiteClientError;
use crate::validators::{decode_validator_set, ValidatorSet};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shell-out wrapper around the TON `lite-client` binary. One invocation
/// per logical query; the decoders only ever see the captured stdout.
pub struct LiteClient {
    binary_path: PathBuf,
    config_path: PathBuf,
    timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config17 {
    pub min_stake: u64,
    pub max_stake: u64,
    pub max_stake_factor: u64,
}

impl LiteClient {
    pub fn new(binary_path: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: binary_path.into(),
            config_path: config_path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn run(&self, cmd: &str) -> std::result::Result<String, LiteClientError> {
        log::debug!("lite-client cmd: {cmd}");
        let mut command = Command::new(&self.binary_path);
        command
            .arg("--global-config")
            .arg(&self.config_path)
            .arg("--verbosity")
            .arg("0")
            .arg("--cmd")
            .arg(cmd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| LiteClientError::Timeout {
                cmd: cmd.to_string(),
            })??;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            return Err(LiteClientError::Stderr {
                cmd: cmd.to_string(),
                stderr: stderr.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    pub async fn get_config(&self, config_id: u32) -> Result<TreeValue> {
        let output = self.run(&format!("getconfig {config_id}")).await?;
        let start = output
            .find("ConfigParam")
            .ok_or_else(|| anyhow!("no ConfigParam in getconfig {config_id} output: {output:?}"))?;
        Ok(tlb_to_tree(&output[start..])?)
    }

    pub async fn run_method(
        &self,
        addr: &str,
        method: &str,
        params: &[String],
    ) -> Result<Option<TreeValue>> {
        let output = self
            .run(&format!("runmethod {addr} {method} {}", params.join(" ")))
            .await?;
        Ok(result_to_list(&output)?)
    }

    /// Like `run_method` but via `runmethodfull`, optionally pinned to the
    /// masterchain block current at `timestamp`.
    pub async fn run_method_full(
        &self,
        addr: &str,
        method: &str,
        params: &[String],
        timestamp: Option<u64>,
    ) -> Result<Option<TreeValue>> {
        let output = if let Some(timestamp) = timestamp {
            let block_output = self
                .run(&format!("byutime -1:8000000000000000 {timestamp}"))
                .await?;
            let block_id = pars(&block_output, "reference masterchain block : ", Some("\n"))
                .ok_or_else(|| anyhow!("block not found by unixtime {timestamp}"))?;
            self.run(&format!(
                "runmethodfull {addr} {block_id} {method} {}",
                params.join(" ")
            ))
            .await?
        } else {
            self.run(&format!("runmethodfull {addr} {method} {}", params.join(" ")))
                .await?
        };
        Ok(result_to_list(&output)?)
    }

    pub async fn get_config_17(&self) -> Result<Config17> {
        decode_config_17(&self.get_config(17).await?)
    }

    /// Decodes one of the validator-set config params. `Ok(None)` means the
    /// param is `(null)`, i.e. the set has not materialized yet.
    pub async fn get_validator_set(&self, config_id: u32) -> Result<Option<ValidatorSet>> {
        if ![32, 34, 36].contains(&config_id) {
            bail!("validator set config_id has to be 32, 34 or 36, got {config_id}");
        }
        let output = self.run(&format!("getconfig {config_id}")).await?;
        decode_validator_set(&output)
    }

    /// Elector contract address from config param 1, in `-1:<hex>` form.
    pub async fn elector_addr(&self) -> Result<String> {
        let config = self.get_config(1).await?;
        let addr = config
            .get("elector_addr")
            .and_then(TreeValue::as_str)
            .context("config 1 has no elector_addr")?;
        match addr.strip_prefix('x') {
            Some(hex) => Ok(format!("-1:{hex}")),
            None => Ok(addr.to_string()),
        }
    }

    /// Complaints filed against the validator set of config param 32 or 34,
    /// fetched from the elector's `list_complaints` get-method.
    pub async fn get_complaints(&self, config_id: u32) -> Result<Vec<Complaint>> {
        if ![32, 34].contains(&config_id) {
            bail!("complaints config_id has to be 32 or 34, got {config_id}");
        }
        let elector = self.elector_addr().await?;
        let Some(vset) = self.get_validator_set(config_id).await? else {
            log::debug!("config {config_id} is null, no complaints to list");
            return Ok(Vec::new());
        };
        let election_id = vset.utime_since;
        let Some(raw) = self
            .run_method_full(&elector, "list_complaints", &[election_id.to_string()], None)
            .await?
        else {
            return Ok(Vec::new());
        };
        let entries = raw
            .at(0)
            .context("list_complaints result is not a tuple")?;
        decode_complaints(entries, &vset, election_id)
    }
}

/// Shapes a decoded config-17 tree into the stake limits, unwrapping each
/// nested `(nanograms amount:(var_uint len:N value:V))` encoding.
pub fn decode_config_17(config: &TreeValue) -> Result<Config17> {
    let grams = |field: &str| -> Result<u64> {
        config
            .get(field)
            .and_then(|v| v.get("amount"))
            .and_then(|v| v.get("value"))
            .and_then(TreeValue::as_u64)
            .ok_or_else(|| anyhow!("config 17 missing {field}"))
    };
    Ok(Config17 {
        min_stake: grams("min_stake")?,
        max_stake: grams("max_stake")?,
        max_stake_factor: config
            .get("max_stake_factor")
            .and_then(TreeValue::as_u64)
            .ok_or_else(|| anyhow!("config 17 missing max_stake_factor"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonwatch_utils::tlb_text::tlb_to_tree;

    #[test]
    fn test_decode_config_17() {
        let text = "ConfigParam(17) = (_ min_stake:(nanograms amount:(var_uint len:6 value:10000000000000)) max_stake:(nanograms amount:(var_uint len:7 value:10000000000000000)) min_total_stake:(nanograms amount:(var_uint len:7 value:75000000000000000)) max_stake_factor:196608)\nx{C4DE}";
        let config17 = decode_config_17(&tlb_to_tree(text).unwrap()).unwrap();
        assert_eq!(config17.min_stake, 10000000000000);
        assert_eq!(config17.max_stake, 10000000000000000);
        assert_eq!(config17.max_stake_factor, 196608);
    }

    #[test]
    fn test_decode_config_17_missing_stake_field() {
        let tree = tlb_to_tree("ConfigParam(17) = (_ max_stake_factor:196608)").unwrap();
        assert!(decode_config_17(&tree).is_err());
    }
}
