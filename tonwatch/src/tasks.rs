use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};

use tonwatch_datastore::{Election, Model, ValidationCycle, ValidationDatastore};
use tonwatch_liteclient::elections::decode_participants;
use tonwatch_liteclient::validators::ValidatorSet;
use tonwatch_liteclient::LiteClient;
use tonwatch_utils::tree::TreeValue;

// run `participant_list_extended` shortly before the election closes
const ELECTION_CLOSE_THRESHOLD: u64 = 10;
// small offset from now(); runmethod without a pinned block trips a
// lite-client parsing bug
const NOW_THRESHOLD: u64 = 10;

/// Stores the current validator set (config 36) together with configs
/// 15/16/17, skipping the write when nothing changed.
pub async fn update_validation_cycle(
    client: &LiteClient,
    datastore: &ValidationDatastore,
) -> Result<String> {
    let Some(vset) = client.get_validator_set(36).await? else {
        return Ok("config 36 is not ready yet".to_string());
    };

    let prev = ValidationCycle::find_by_id(datastore, vset.utime_since).await?;
    if !cycle_changed(prev.as_ref(), &vset) {
        return Ok("validators config did not change".to_string());
    }

    let config15 = client.get_config(15).await?.to_json();
    let config16 = client.get_config(16).await?.to_json();
    let config17 = serde_json::to_value(client.get_config_17().await?)?;

    let cycle = ValidationCycle {
        cycle_id: vset.utime_since,
        cycle_info: vset,
        config15,
        config16,
        config17,
    };
    cycle.save(datastore).await?;

    Ok("validators config updated".to_string())
}

/// Stores the election in progress, or the most recently closed one pinned
/// to a block just before its close.
pub async fn update_elections(
    client: &LiteClient,
    datastore: &ValidationDatastore,
) -> Result<String> {
    let elector = client.elector_addr().await?;

    let active_election_id = client
        .run_method(&elector, "active_election_id", &[])
        .await?
        .as_ref()
        .and_then(|r| r.at(0))
        .and_then(TreeValue::as_u64)
        .context("active_election_id returned no value")?;

    let (election_id, in_progress, participants_info) = if active_election_id == 0 {
        // No election running: snapshot the last one at the moment before it
        // closed. Note: election_id is the start timestamp of the next
        // validation cycle.
        let past_ids = client
            .run_method(&elector, "past_election_ids", &[])
            .await?
            .as_ref()
            .and_then(|r| r.at(0))
            .and_then(TreeValue::as_list)
            .map(|ids| ids.to_vec())
            .context("past_election_ids returned no value")?;
        let election_id = past_ids
            .iter()
            .filter_map(TreeValue::as_u64)
            .max()
            .context("no past elections")?;

        if let Some(prev) = Election::find_by_id(datastore, election_id).await? {
            if prev.finished {
                return Ok("election is finished and already stored".to_string());
            }
        }

        let config15 = client.get_config(15).await?;
        let elections_end_before = config15
            .get("elections_end_before")
            .and_then(TreeValue::as_u64)
            .context("config 15 has no elections_end_before")?;
        let before_close = election_id - elections_end_before - ELECTION_CLOSE_THRESHOLD;
        let info = client
            .run_method_full(&elector, "participant_list_extended", &[], Some(before_close))
            .await?
            .context("participant_list_extended returned no value")?;
        (election_id, false, info)
    } else {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock is before the unix epoch")?
            .as_secs()
            - NOW_THRESHOLD;
        let info = client
            .run_method_full(&elector, "participant_list_extended", &[], Some(now))
            .await?
            .context("participant_list_extended returned no value")?;
        (active_election_id, true, info)
    };

    let tuple_field = |i: usize, name: &str| -> Result<u64> {
        participants_info
            .at(i)
            .and_then(TreeValue::as_u64)
            .with_context(|| format!("participant_list_extended has no {name}"))
    };
    let elect_at = tuple_field(0, "elect_at")?;
    let elect_close = tuple_field(1, "elect_close")?;
    let min_stake = tuple_field(2, "min_stake")?;
    let total_stake = tuple_field(3, "total_stake")?;

    if elect_at != election_id {
        bail!("inconsistency error: election_id={election_id}, elect_at={elect_at}");
    }

    let participants_list = decode_participants(
        participants_info
            .at(4)
            .context("participant_list_extended has no participant list")?,
    )?;

    let election = Election {
        election_id,
        elect_close,
        min_stake,
        total_stake,
        participants_list,
        finished: !in_progress,
    };
    election.save(datastore).await?;

    Ok(format!("election {election_id} was added/updated"))
}

/// Stores the complaints for the previous and current validator sets
/// (configs 32 and 34), annotated with each accused validator's wallet
/// address from the stored election.
pub async fn update_complaints(
    client: &LiteClient,
    datastore: &ValidationDatastore,
) -> Result<String> {
    let mut stored = 0usize;
    for config_id in [32u32, 34] {
        let cycle_complaints = client.get_complaints(config_id).await?;
        let Some(first) = cycle_complaints.first() else {
            continue;
        };

        let election = Election::find_by_id(datastore, first.election_id).await?;
        for mut complaint in cycle_complaints {
            if let Some(election) = &election {
                complaint.wallet_address = election
                    .participant_by_pubkey(&complaint.pubkey)
                    .map(|p| p.wallet_address.clone());
            }
            complaint.save(datastore).await?;
            stored += 1;
        }
    }
    Ok(format!("{stored} complaints added/updated"))
}

// a write happens only for a cycle never seen before or whose validator set
// differs from the stored one
fn cycle_changed(prev: Option<&ValidationCycle>, vset: &ValidatorSet) -> bool {
    match prev {
        Some(prev) => prev.cycle_info != *vset,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonwatch_liteclient::validators::Validator;

    fn sample_vset(weight: u64) -> ValidatorSet {
        ValidatorSet {
            total: 1,
            utime_since: 1651662797,
            utime_until: 1651728333,
            total_weight: weight,
            validators: vec![Validator {
                adnl_addr: "B".repeat(64),
                pubkey: "A".repeat(64),
                weight,
                index: 0,
            }],
        }
    }

    fn sample_cycle(vset: &ValidatorSet) -> ValidationCycle {
        ValidationCycle {
            cycle_id: vset.utime_since,
            cycle_info: vset.clone(),
            config15: serde_json::json!({}),
            config16: serde_json::json!({}),
            config17: serde_json::json!({}),
        }
    }

    #[test]
    fn test_unseen_cycle_triggers_update() {
        assert!(cycle_changed(None, &sample_vset(300)));
    }

    #[test]
    fn test_unchanged_cycle_is_skipped() {
        let vset = sample_vset(300);
        let cycle = sample_cycle(&vset);
        assert!(!cycle_changed(Some(&cycle), &vset));
    }

    #[test]
    fn test_changed_validator_set_triggers_update() {
        let cycle = sample_cycle(&sample_vset(300));
        assert!(cycle_changed(Some(&cycle), &sample_vset(400)));
    }
}
