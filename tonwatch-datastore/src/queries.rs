//! Read-side joins over the stored collections. Each function mirrors an
//! upsert-side natural key: `cycle_id`, `election_id`, `pseudohash`.

use std::collections::HashMap;

use serde_json::Value;

use crate::models::{Complaint, Election, ValidationCycle};
use crate::{Model, Result, ValidationDatastore};

/// Validation cycles, newest first, each enriched with the matching
/// election's participant data (wallet address, stake, max factor) and the
/// complaints filed against each validator.
pub async fn validation_cycles(
    datastore: &ValidationDatastore,
    cycle_id: Option<u64>,
    limit: usize,
) -> Result<Vec<Value>> {
    let cycles = match cycle_id {
        Some(id) => ValidationCycle::find_by_id(datastore, id)
            .await?
            .into_iter()
            .collect(),
        None => newest_first(ValidationCycle::find_all(datastore).await?, |c| c.cycle_id, limit),
    };
    let all_complaints = Complaint::find_all(datastore).await?;

    let mut response = Vec::with_capacity(cycles.len());
    for cycle in cycles {
        let mut doc = serde_json::to_value(&cycle)?;
        let Some(election) = Election::find_by_id(datastore, cycle.cycle_id).await? else {
            log::error!("election entry for cycle_id={} not found", cycle.cycle_id);
            response.push(doc);
            continue;
        };

        let participants: HashMap<&str, _> = election
            .participants_list
            .iter()
            .map(|p| (p.pubkey.as_str(), p))
            .collect();

        if let Some(validators) = doc["cycle_info"]["validators"].as_array_mut() {
            for validator in validators {
                let pubkey = validator["pubkey"].as_str().unwrap_or_default().to_string();
                match participants.get(pubkey.as_str()) {
                    Some(participant) => {
                        validator["wallet_address"] =
                            Value::String(participant.wallet_address.clone());
                        validator["stake"] = Value::from(participant.stake);
                        validator["max_factor"] = Value::from(participant.max_factor);
                    }
                    None => {
                        log::warn!(
                            "validator {pubkey} of cycle {} has no election entry",
                            cycle.cycle_id
                        );
                    }
                }
                let complaints: Vec<Value> = all_complaints
                    .iter()
                    .filter(|c| c.election_id == cycle.cycle_id && c.pubkey == pubkey)
                    .map(serde_json::to_value)
                    .collect::<std::result::Result<_, _>>()?;
                validator["complaints"] = Value::Array(complaints);
            }
        }
        response.push(doc);
    }
    Ok(response)
}

/// Elections, newest first, each participant annotated with the validator
/// `index` it ended up with in the corresponding validation cycle (null when
/// the participant did not make the set).
pub async fn elections(
    datastore: &ValidationDatastore,
    election_id: Option<u64>,
    limit: usize,
) -> Result<Vec<Value>> {
    let elections = match election_id {
        Some(id) => Election::find_by_id(datastore, id)
            .await?
            .into_iter()
            .collect(),
        None => newest_first(Election::find_all(datastore).await?, |e| e.election_id, limit),
    };

    let mut response = Vec::with_capacity(elections.len());
    for election in elections {
        let mut doc = serde_json::to_value(&election)?;
        let cycle = ValidationCycle::find_by_id(datastore, election.election_id).await?;
        let Some(cycle) = cycle else {
            if election.finished {
                log::error!(
                    "validation entry for election_id={} not found",
                    election.election_id
                );
            }
            response.push(doc);
            continue;
        };

        let index_by_pubkey: HashMap<&str, u64> = cycle
            .cycle_info
            .validators
            .iter()
            .map(|v| (v.pubkey.as_str(), v.index))
            .collect();
        if let Some(participants) = doc["participants_list"].as_array_mut() {
            for participant in participants {
                let pubkey = participant["pubkey"].as_str().unwrap_or_default();
                participant["index"] = match index_by_pubkey.get(pubkey) {
                    Some(index) => Value::from(*index),
                    None => Value::Null,
                };
            }
        }
        response.push(doc);
    }
    Ok(response)
}

/// Complaints filtered by wallet address, adnl address and election id,
/// ordered by (election_id, created_time) descending.
pub async fn complaints(
    datastore: &ValidationDatastore,
    wallet_address: Option<&str>,
    adnl_address: Option<&str>,
    election_id: Option<u64>,
    limit: usize,
) -> Result<Vec<Value>> {
    let mut found: Vec<Complaint> = Complaint::find_all(datastore)
        .await?
        .into_iter()
        .filter(|c| match wallet_address {
            Some(wallet) => c.wallet_address.as_deref() == Some(wallet),
            None => true,
        })
        .filter(|c| adnl_address.map_or(true, |adnl| c.adnl_addr == adnl))
        .filter(|c| election_id.map_or(true, |id| c.election_id == id))
        .collect();
    found.sort_by(|a, b| {
        (b.election_id, b.created_time).cmp(&(a.election_id, a.created_time))
    });
    found.truncate(limit);
    found.iter().map(|c| Ok(serde_json::to_value(c)?)).collect()
}

fn newest_first<T>(mut items: Vec<T>, id: impl Fn(&T) -> u64, limit: usize) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(id(item)));
    items.truncate(limit);
    items
}
