//! Override store persisted as a JSON file
//!
//! The file holds an array of `{"id": "AS..", "name": ".."}` records. A
//! missing file reads as an empty store. Writes go to a sibling temp file
//! that is then renamed over the original.

use super::{AsnOverride, OverrideStore};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Override store backed by a JSON file
#[derive(Debug)]
pub struct JsonFileOverrideStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl JsonFileOverrideStore {
    /// Store backed by `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StoreError(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )))
            }
        };
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        let records: Vec<AsnOverride> = serde_json::from_slice(&data)
            .map_err(|e| StoreError(format!("cannot parse {}: {e}", self.path.display())))?;
        Ok(records.into_iter().map(|r| (r.asn, r.name)).collect())
    }

    async fn save(&self, records: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let list: Vec<AsnOverride> = records
            .iter()
            .map(|(asn, name)| AsnOverride {
                asn: asn.clone(),
                name: name.clone(),
            })
            .collect();
        let data = serde_json::to_vec_pretty(&list)
            .map_err(|e| StoreError(format!("cannot serialize overrides: {e}")))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, data)
            .await
            .map_err(|e| StoreError(format!("cannot write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError(format!("cannot replace {}: {e}", self.path.display())))
    }
}

#[async_trait]
impl OverrideStore for JsonFileOverrideStore {
    async fn get(&self, asn: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(asn))
    }

    async fn put(&self, asn: &str, name: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        records.insert(asn.to_string(), name.to_string());
        self.save(&records).await
    }

    async fn delete(&self, asn: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        if records.remove(asn).is_none() {
            return Ok(false);
        }
        self.save(&records).await?;
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<AsnOverride>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self
            .load()
            .await?
            .into_iter()
            .map(|(asn, name)| AsnOverride { asn, name })
            .collect())
    }
}
