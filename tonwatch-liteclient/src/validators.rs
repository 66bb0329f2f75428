use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tonwatch_utils::pars::pars;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Validator {
    pub adnl_addr: String,
    pub pubkey: String,
    pub weight: u64,
    pub index: u64,
}

/// One validation cycle's validator set, keyed in time by `utime_since`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidatorSet {
    pub total: u64,
    pub utime_since: u64,
    pub utime_until: u64,
    pub total_weight: u64,
    pub validators: Vec<Validator>,
}

impl ValidatorSet {
    /// pubkey → adnl_addr index for the cross-record lookups done while
    /// decoding complaints.
    pub fn adnl_by_pubkey(&self) -> HashMap<&str, &str> {
        self.validators
            .iter()
            .map(|v| (v.pubkey.as_str(), v.adnl_addr.as_str()))
            .collect()
    }
}

/// Decodes a `getconfig 32|34|36` dump. `Ok(None)` signals a null config,
/// the normal "not materialized yet" state. `index` is assigned in order of
/// appearance.
pub fn decode_validator_set(text: &str) -> Result<Option<ValidatorSet>> {
    if text.contains("= (null)") {
        return Ok(None);
    }

    let field = |name: &str| -> Result<u64> {
        pars(text, name, Some(" "))
            .with_context(|| format!("validator set dump has no {name} field: {text:?}"))?
            .parse::<u64>()
            .with_context(|| format!("bad {name} field in validator set dump"))
    };

    let total = field("total:")?;
    let utime_since = field("utime_since:")?;
    let utime_until = field("utime_until:")?;
    let total_weight = field("total_weight:")?;

    let mut validators = Vec::new();
    for line in text.lines() {
        if !line.contains("public_key:") {
            continue;
        }
        let adnl_addr = pars(line, "adnl_addr:x", Some(")"))
            .with_context(|| format!("validator line has no adnl_addr: {line:?}"))?;
        let pubkey = pars(line, "pubkey:x", Some(")"))
            .with_context(|| format!("validator line has no pubkey: {line:?}"))?;
        let weight = pars(line, "weight:", Some(" "))
            .with_context(|| format!("validator line has no weight: {line:?}"))?
            .parse::<u64>()
            .with_context(|| format!("bad weight in validator line: {line:?}"))?;
        validators.push(Validator {
            adnl_addr: adnl_addr.to_string(),
            pubkey: pubkey.to_string(),
            weight,
            index: validators.len() as u64,
        });
    }

    Ok(Some(ValidatorSet {
        total,
        utime_since,
        utime_until,
        total_weight,
        validators,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dump() -> String {
        [
            "ConfigParam(34) = (cur_validators:(validators_ext utime_since:1651662797 utime_until:1651728333 total:3 main:3 total_weight:300 list:(",
            "  list:(hmn_leaf#82 value:(validator_addr#73 public_key:(ed25519_pubkey pubkey:xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA01) weight:100 adnl_addr:xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB01)))",
            "  list:(hmn_leaf#82 value:(validator_addr#73 public_key:(ed25519_pubkey pubkey:xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA02) weight:120 adnl_addr:xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB02)))",
            "  list:(hmn_leaf#82 value:(validator_addr#73 public_key:(ed25519_pubkey pubkey:xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA03) weight:80 adnl_addr:xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB03))))",
        ]
        .join("\n")
    }

    #[test]
    fn test_decode_validator_set() {
        let vset = decode_validator_set(&sample_dump()).unwrap().unwrap();
        assert_eq!(vset.total, 3);
        assert_eq!(vset.utime_since, 1651662797);
        assert_eq!(vset.utime_until, 1651728333);
        assert_eq!(vset.total_weight, 300);
        assert_eq!(vset.validators.len(), 3);
        let indexes: Vec<u64> = vset.validators.iter().map(|v| v.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert_eq!(
            vset.validators[1].pubkey,
            "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA02"
        );
        assert_eq!(
            vset.validators[1].adnl_addr,
            "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB02"
        );
        assert_eq!(vset.validators[2].weight, 80);
    }

    #[test]
    fn test_null_config_is_deferred_not_error() {
        assert!(decode_validator_set("ConfigParam(36) = (null)")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_missing_header_field_is_fatal() {
        assert!(decode_validator_set("utime_since:1 utime_until:2 ").is_err());
    }

    #[test]
    fn test_adnl_lookup_index() {
        let vset = decode_validator_set(&sample_dump()).unwrap().unwrap();
        let index = vset.adnl_by_pubkey();
        assert_eq!(
            index
                .get("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA03")
                .copied(),
            Some("BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB03")
        );
    }
}
