use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::validation_datastore::ValidationDatastore;

/// A JSON document stored under a templated key path such as
/// `/election/${election_id}`. `save` has upsert semantics: writing an id
/// that already exists replaces the stored document.
#[async_trait]
pub trait Model: Sized + Serialize + for<'de> Deserialize<'de> + Send + Sync {
    const ID_PATH: &'static str;

    fn from_json_string(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn get_id_for(keys: &HashMap<String, String>) -> String {
        let mut id = String::from(Self::ID_PATH);
        for (key, value) in keys {
            id = id.replace(&format!("${{{}}}", key), value);
        }
        id
    }

    fn get_key_names() -> Vec<String> {
        let re = regex::Regex::new(r"\$\{(\w+)\}").unwrap();
        re.captures_iter(Self::ID_PATH)
            .map(|cap| cap[1].to_string())
            .collect()
    }

    fn get_id_keys(&self) -> HashMap<String, String>;

    fn get_id(&self) -> String {
        let keys = self.get_id_keys();
        Self::get_id_for(&keys)
    }

    /// Key prefix shared by every document of this model.
    fn key_prefix() -> String {
        match Self::ID_PATH.find("/${") {
            Some(at) => Self::ID_PATH[..at].to_string(),
            None => Self::ID_PATH.to_string(),
        }
    }

    async fn save(&self, datastore: &ValidationDatastore) -> Result<()> {
        let json = self.to_json_string()?;
        datastore.put(&self.get_id(), json.as_bytes()).await
    }

    async fn find_one(
        datastore: &ValidationDatastore,
        keys: HashMap<String, String>,
    ) -> Result<Option<Self>> {
        let key = Self::get_id_for(&keys);
        match datastore.get_string(&key).await? {
            Some(value) => Ok(Some(Self::from_json_string(&value)?)),
            None => Ok(None),
        }
    }

    /// All documents of this model, in key order.
    async fn find_all(datastore: &ValidationDatastore) -> Result<Vec<Self>> {
        let prefix = Self::key_prefix();
        let mut found = Vec::new();
        for result in datastore.iterator(&prefix) {
            let (_, value) = result?;
            let json = String::from_utf8(value.to_vec())?;
            found.push(Self::from_json_string(&json)?);
        }
        Ok(found)
    }

    async fn reload(&mut self, datastore: &ValidationDatastore) -> Result<()> {
        let keys = self.get_id_keys();
        if let Some(obj) = Self::find_one(datastore, keys).await? {
            *self = obj;
            Ok(())
        } else {
            Err(Error::KeyNotFound(self.get_id()))
        }
    }

    async fn delete(&self, datastore: &ValidationDatastore) -> Result<()> {
        datastore.delete(&self.get_id()).await
    }
}
