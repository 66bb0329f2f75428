use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use tonwatch_utils::address::{dec_to_hex_addr, hex_to_base64_addr};
use tonwatch_utils::tree::TreeValue;

use crate::validators::ValidatorSet;

/// A misbehavior complaint against a validator of a finished cycle,
/// persisted keyed on `pseudohash` (pubkey ++ election_id). Numbers wider
/// than 64 bits (hash, description, vset_id) are kept as decimal strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Complaint {
    pub election_id: u64,
    pub hash: String,
    pub pubkey: String,
    pub adnl_addr: String,
    pub description: String,
    pub created_time: u64,
    pub severity: u64,
    pub reward_addr: String,
    pub paid: u64,
    pub suggested_fine: u64,
    pub suggested_fine_part: u64,
    pub voted_validators: Vec<u64>,
    pub vset_id: String,
    pub weight_remaining: f64,
    pub approved_percent: f64,
    pub is_passed: bool,
    pub pseudohash: String,
    #[serde(default)]
    pub wallet_address: Option<String>,
}

/// Decodes the elector's `list_complaints` entries. Each entry is
/// `[hash, [[pubkey, description, created_time, severity, reward_addr,
/// paid, suggested_fine, suggested_fine_part], voters, vset_id,
/// weight_remaining]]`; the field order follows the elector contract's
/// complaint serialization. Empty entries are skipped. Every complaint must
/// reference a validator present in `vset`.
pub fn decode_complaints(
    entries: &TreeValue,
    vset: &ValidatorSet,
    election_id: u64,
) -> Result<Vec<Complaint>> {
    let entries = entries.as_list().context("complaint list is not a tuple")?;
    let adnl_index = vset.adnl_by_pubkey();
    let total_weight = vset.total_weight as f64;
    let required_weight = total_weight * 2.0 / 3.0;

    let mut complaints = Vec::new();
    for entry in entries {
        let items = entry.as_list().context("complaint entry is not a tuple")?;
        if items.is_empty() {
            continue;
        }
        let hash = items
            .first()
            .and_then(TreeValue::as_int)
            .context("complaint entry has no hash")?
            .to_string();
        let subdata = items
            .get(1)
            .and_then(TreeValue::as_list)
            .context("complaint entry has no body")?;
        let fields = subdata
            .first()
            .and_then(TreeValue::as_list)
            .context("complaint body has no field tuple")?;

        let int_field = |i: usize, name: &str| -> Result<u64> {
            fields
                .get(i)
                .and_then(TreeValue::as_u64)
                .with_context(|| format!("complaint has no {name}"))
        };

        let pubkey_dec = fields
            .first()
            .and_then(TreeValue::as_biguint)
            .context("complaint has no validator pubkey")?;
        let pubkey = dec_to_hex_addr(&pubkey_dec)?;
        let adnl_addr = adnl_index
            .get(pubkey.as_str())
            .copied()
            .ok_or_else(|| anyhow!("complaint pubkey {pubkey} not in validator set"))?
            .to_string();

        let description = fields
            .get(1)
            .and_then(TreeValue::as_int)
            .context("complaint has no description")?
            .to_string();
        let reward_dec = fields
            .get(4)
            .and_then(TreeValue::as_biguint)
            .context("complaint has no reward address")?;
        let reward_addr = hex_to_base64_addr(-1, &dec_to_hex_addr(&reward_dec)?, true, false)?;

        let voted_validators = subdata
            .get(1)
            .and_then(TreeValue::as_list)
            .context("complaint has no voters list")?
            .iter()
            .map(|v| v.as_u64().context("bad voter index"))
            .collect::<Result<Vec<u64>>>()?;
        let vset_id = subdata
            .get(2)
            .and_then(TreeValue::as_int)
            .context("complaint has no vset_id")?
            .to_string();
        let mut weight_remaining = subdata
            .get(3)
            .and_then(TreeValue::as_f64)
            .context("complaint has no weight_remaining")?;

        // no votes cast yet: the full approval threshold is outstanding
        if voted_validators.is_empty() {
            weight_remaining = required_weight;
        }
        let available_weight = required_weight - weight_remaining;
        let approved_percent = round3(available_weight / total_weight * 100.0);
        let is_passed = weight_remaining < 0.0;

        complaints.push(Complaint {
            election_id,
            hash,
            pubkey: pubkey.clone(),
            adnl_addr,
            description,
            created_time: int_field(2, "created_time")?,
            severity: int_field(3, "severity")?,
            reward_addr,
            paid: int_field(5, "paid")?,
            suggested_fine: int_field(6, "suggested_fine")?,
            suggested_fine_part: int_field(7, "suggested_fine_part")?,
            voted_validators,
            vset_id,
            weight_remaining,
            approved_percent,
            is_passed,
            pseudohash: format!("{pubkey}{election_id}"),
            wallet_address: None,
        });
    }
    Ok(complaints)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
