use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use tonwatch_liteclient::elections::Participant;

use crate::Model;
use crate::Result;
use crate::ValidationDatastore;

/// An election round on the elector contract. `election_id` is the start
/// time of the validation cycle being elected, `finished` flips once the
/// round has closed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Election {
    pub election_id: u64,
    pub elect_close: u64,
    pub min_stake: u64,
    pub total_stake: u64,
    pub participants_list: Vec<Participant>,
    pub finished: bool,
}

impl Model for Election {
    const ID_PATH: &'static str = "/election/${election_id}";

    fn get_id_keys(&self) -> HashMap<String, String> {
        let mut keys = HashMap::new();
        keys.insert("election_id".to_string(), self.election_id.to_string());
        keys
    }
}

impl Election {
    pub async fn find_by_id(
        datastore: &ValidationDatastore,
        election_id: u64,
    ) -> Result<Option<Self>> {
        let mut keys = HashMap::new();
        keys.insert("election_id".to_string(), election_id.to_string());
        Self::find_one(datastore, keys).await
    }

    pub fn participant_by_pubkey(&self, pubkey: &str) -> Option<&Participant> {
        self.participants_list.iter().find(|p| p.pubkey == pubkey)
    }
}
