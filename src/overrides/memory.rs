//! In-memory override store

use super::{AsnOverride, OverrideStore};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// Override store kept in process memory
#[derive(Debug, Default)]
pub struct MemoryOverrideStore {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryOverrideStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records
    pub fn with_records(records: impl IntoIterator<Item = AsnOverride>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|r| (r.asn, r.name)).collect()),
        }
    }
}

#[async_trait]
impl OverrideStore for MemoryOverrideStore {
    async fn get(&self, asn: &str) -> Result<Option<String>, StoreError> {
        let records = self.records.read().expect("rwlock poisoned");
        Ok(records.get(asn).cloned())
    }

    async fn put(&self, asn: &str, name: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().expect("rwlock poisoned");
        records.insert(asn.to_string(), name.to_string());
        Ok(())
    }

    async fn delete(&self, asn: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().expect("rwlock poisoned");
        Ok(records.remove(asn).is_some())
    }

    async fn list(&self) -> Result<Vec<AsnOverride>, StoreError> {
        let records = self.records.read().expect("rwlock poisoned");
        Ok(records
            .iter()
            .map(|(asn, name)| AsnOverride {
                asn: asn.clone(),
                name: name.clone(),
            })
            .collect())
    }
}
