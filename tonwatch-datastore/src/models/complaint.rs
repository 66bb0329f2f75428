use std::collections::HashMap;

pub use tonwatch_liteclient::complaints::Complaint;

use crate::Model;

impl Model for Complaint {
    const ID_PATH: &'static str = "/complaint/${pseudohash}";

    fn get_id_keys(&self) -> HashMap<String, String> {
        let mut keys = HashMap::new();
        keys.insert("pseudohash".to_string(), self.pseudohash.clone());
        keys
    }
}
