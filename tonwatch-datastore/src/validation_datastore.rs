use crate::{Error, Result};
use rocksdb::{IteratorMode, Options, DB};
use serde::Deserialize;
use std::path::Path;
use std::path::PathBuf;

pub struct ValidationDatastore {
    // declared before temp_dir so the DB is closed before the directory goes
    db: DB,
    path: PathBuf,
    _temp_dir: Option<tempfile::TempDir>,
}

impl ValidationDatastore {
    pub fn new(path: &Path) -> Result<Self> {
        let db = DB::open_default(path)?;
        Ok(Self {
            db,
            path: path.to_path_buf(),
            _temp_dir: None,
        })
    }

    // "in-memory" database, used by tests; the backing directory is removed
    // on drop
    pub fn create_in_memory() -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_allow_mmap_reads(false);
        opts.set_compression_type(rocksdb::DBCompressionType::None);
        let temp_dir = tempfile::tempdir().map_err(|e| Error::Database(e.to_string()))?;
        let temp_path = temp_dir.path().to_path_buf();
        let db = DB::open(&opts, &temp_path)?;
        Ok(Self {
            db,
            path: temp_path,
            _temp_dir: Some(temp_dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get_data_by_key(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.db.get(key)? {
            Some(value) => Ok(Some(value)),
            None => Ok(None),
        }
    }

    pub async fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.get_data_by_key(key).await? {
            Some(data) => Ok(Some(String::from_utf8(data)?)),
            None => Ok(None),
        }
    }

    pub async fn get_json<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
        match self.get_string(key).await? {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    pub async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.db.put(key, value)?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        self.db.delete(key)?;
        Ok(())
    }

    pub fn iterator(
        &self,
        prefix: &str,
    ) -> impl Iterator<Item = Result<(Box<[u8]>, Box<[u8]>)>> + '_ {
        let mut readopts = rocksdb::ReadOptions::default();
        readopts.set_iterate_lower_bound(format!("{}/", prefix).as_bytes());
        readopts.set_iterate_upper_bound(format!("{}0", prefix).as_bytes());
        let iter = self.db.iterator_opt(IteratorMode::Start, readopts);
        iter.map(|result| result.map_err(|e| Error::Database(e.to_string())))
    }

    pub async fn find_max_int_key(&self, prefix: &str) -> Result<Option<u64>> {
        let mut max_value: Option<u64> = None;
        for result in self.iterator(prefix) {
            let (key, _) = result?;
            let key_str = String::from_utf8(key.to_vec())?;
            if key_str.starts_with(prefix) {
                let value_str = key_str.split_at(prefix.len() + 1).1;
                if let Ok(value) = value_str.parse::<u64>() {
                    max_value = Some(max_value.map_or(value, |m| m.max(value)));
                }
            }
        }
        Ok(max_value)
    }
}
