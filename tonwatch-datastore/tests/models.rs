use tonwatch_datastore::{Complaint, Election, Model, ValidationCycle, ValidationDatastore};
use tonwatch_liteclient::elections::Participant;
use tonwatch_liteclient::validators::{Validator, ValidatorSet};

fn sample_vset(utime_since: u64) -> ValidatorSet {
    ValidatorSet {
        total: 1,
        utime_since,
        utime_until: utime_since + 65536,
        total_weight: 300,
        validators: vec![Validator {
            adnl_addr: "B".repeat(64),
            pubkey: "A".repeat(64),
            weight: 300,
            index: 0,
        }],
    }
}

fn sample_cycle(cycle_id: u64) -> ValidationCycle {
    ValidationCycle {
        cycle_id,
        cycle_info: sample_vset(cycle_id),
        config15: serde_json::json!({"elections_end_before": 8192}),
        config16: serde_json::json!({"max_validators": 400}),
        config17: serde_json::json!({"min_stake": 10000000000000u64}),
    }
}

fn sample_complaint(pubkey: &str, election_id: u64) -> Complaint {
    Complaint {
        election_id,
        hash: "777".to_string(),
        pubkey: pubkey.to_string(),
        adnl_addr: "B".repeat(64),
        description: "900".to_string(),
        created_time: election_id + 100,
        severity: 2,
        reward_addr: "Ef8AAAA".to_string(),
        paid: 0,
        suggested_fine: 101000000000,
        suggested_fine_part: 4096,
        voted_validators: vec![],
        vset_id: "4242".to_string(),
        weight_remaining: 200.0,
        approved_percent: 0.0,
        is_passed: false,
        pseudohash: format!("{pubkey}{election_id}"),
        wallet_address: None,
    }
}

#[tokio::test]
async fn test_validation_cycle_round_trip() {
    let datastore = ValidationDatastore::create_in_memory().unwrap();
    let cycle = sample_cycle(1651662797);
    cycle.save(&datastore).await.unwrap();

    let found = ValidationCycle::find_by_id(&datastore, 1651662797)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, cycle);
    assert!(ValidationCycle::find_by_id(&datastore, 1)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_save_is_upsert() {
    let datastore = ValidationDatastore::create_in_memory().unwrap();
    let mut cycle = sample_cycle(1651662797);
    cycle.save(&datastore).await.unwrap();
    cycle.config16 = serde_json::json!({"max_validators": 500});
    cycle.save(&datastore).await.unwrap();

    let found = ValidationCycle::find_by_id(&datastore, 1651662797)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.config16["max_validators"], 500);
    assert_eq!(ValidationCycle::find_all(&datastore).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_election_model() {
    let datastore = ValidationDatastore::create_in_memory().unwrap();
    let election = Election {
        election_id: 1651728333,
        elect_close: 1651720141,
        min_stake: 300000000000000,
        total_stake: 900000000000000,
        participants_list: vec![Participant {
            pubkey: "A".repeat(64),
            stake: 350000000000000,
            max_factor: 196608,
            wallet_address: "Ef8zzz".to_string(),
            adnl_addr: "B".repeat(64),
        }],
        finished: true,
    };
    election.save(&datastore).await.unwrap();

    let found = Election::find_by_id(&datastore, 1651728333)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, election);
    assert_eq!(
        found.participant_by_pubkey(&"A".repeat(64)).unwrap().stake,
        350000000000000
    );
    assert!(found.participant_by_pubkey("missing").is_none());
}

#[tokio::test]
async fn test_complaint_keyed_on_pseudohash() {
    let datastore = ValidationDatastore::create_in_memory().unwrap();
    let complaint = sample_complaint(&"A".repeat(64), 1651662797);
    complaint.save(&datastore).await.unwrap();
    assert_eq!(complaint.get_id(), format!("/complaint/{}", complaint.pseudohash));

    // same validator, later election: a distinct document
    let other = sample_complaint(&"A".repeat(64), 1651728333);
    other.save(&datastore).await.unwrap();

    let all = Complaint::find_all(&datastore).await.unwrap();
    assert_eq!(all.len(), 2);

    // re-saving the same pseudohash replaces, not duplicates
    let mut updated = complaint.clone();
    updated.voted_validators = vec![0];
    updated.save(&datastore).await.unwrap();
    assert_eq!(Complaint::find_all(&datastore).await.unwrap().len(), 2);
}
