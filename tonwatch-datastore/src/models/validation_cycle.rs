use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use tonwatch_liteclient::validators::ValidatorSet;

use crate::Model;
use crate::Result;
use crate::ValidationDatastore;

/// One validation cycle: the decoded validator set plus the config params
/// that governed it, keyed by the cycle's start time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ValidationCycle {
    pub cycle_id: u64,
    pub cycle_info: ValidatorSet,
    pub config15: serde_json::Value,
    pub config16: serde_json::Value,
    pub config17: serde_json::Value,
}

impl Model for ValidationCycle {
    const ID_PATH: &'static str = "/validation_cycle/${cycle_id}";

    fn get_id_keys(&self) -> HashMap<String, String> {
        let mut keys = HashMap::new();
        keys.insert("cycle_id".to_string(), self.cycle_id.to_string());
        keys
    }
}

impl ValidationCycle {
    pub async fn find_by_id(
        datastore: &ValidationDatastore,
        cycle_id: u64,
    ) -> Result<Option<Self>> {
        let mut keys = HashMap::new();
        keys.insert("cycle_id".to_string(), cycle_id.to_string());
        Self::find_one(datastore, keys).await
    }
}
