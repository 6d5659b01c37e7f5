//! Locally managed ASN description overrides
//!
//! An override replaces whatever description the data sources produced for
//! an ASN. Records live in an external [`OverrideStore`]; [`Overrides`] is
//! the thin adapter the resolver talks to. A resolver built without a store
//! has overrides disabled, and every adapter call reports
//! [`OverrideError::NilCollection`].

pub mod file;
pub mod memory;

pub use file::JsonFileOverrideStore;
pub use memory::MemoryOverrideStore;

use crate::asn::is_asn;
use crate::error::{OverrideError, StoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One override record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AsnOverride {
    /// ASN identifier, `AS<digits>`
    #[serde(rename = "id")]
    pub asn: String,
    /// Description that replaces any sourced one
    pub name: String,
}

/// Persistent key-value collection of overrides, keyed by ASN
///
/// Implementations handle their own concurrency.
#[async_trait]
pub trait OverrideStore: Send + Sync {
    /// Point lookup; `None` if no record exists
    async fn get(&self, asn: &str) -> Result<Option<String>, StoreError>;

    /// Insert or replace the record for `asn`
    async fn put(&self, asn: &str, name: &str) -> Result<(), StoreError>;

    /// Delete the record for `asn`; returns whether one existed
    async fn delete(&self, asn: &str) -> Result<bool, StoreError>;

    /// Every record
    async fn list(&self) -> Result<Vec<AsnOverride>, StoreError>;
}

/// Adapter over an optional [`OverrideStore`]
#[derive(Clone, Default)]
pub struct Overrides {
    store: Option<Arc<dyn OverrideStore>>,
}

impl Overrides {
    /// Adapter backed by `store`
    pub fn new(store: Arc<dyn OverrideStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Adapter with overrides disabled
    pub fn disabled() -> Self {
        Self { store: None }
    }

    /// Whether a store is configured
    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self) -> Result<&Arc<dyn OverrideStore>, OverrideError> {
        self.store.as_ref().ok_or(OverrideError::NilCollection)
    }

    /// Description override for `asn`
    pub async fn lookup(&self, asn: &str) -> Result<String, OverrideError> {
        self.store()?
            .get(asn)
            .await?
            .ok_or(OverrideError::AsnNotFound)
    }

    /// Store or update the override for `asn`
    pub async fn set(&self, asn: &str, description: &str) -> Result<(), OverrideError> {
        let store = self.store()?;
        if !is_asn(asn) {
            return Err(OverrideError::MalformedAsn(asn.to_string()));
        }
        store.put(asn, description).await?;
        Ok(())
    }

    /// Make sure no override exists for `asn`
    ///
    /// Removing a missing override succeeds.
    pub async fn remove(&self, asn: &str) -> Result<(), OverrideError> {
        self.store()?.delete(asn).await?;
        Ok(())
    }

    /// All overrides, sorted by ASN
    pub async fn list(&self) -> Result<Vec<AsnOverride>, OverrideError> {
        let mut records = self.store()?.list().await?;
        records.sort();
        Ok(records)
    }
}

impl std::fmt::Debug for Overrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overrides")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    #[async_trait]
    impl OverrideStore for BrokenStore {
        async fn get(&self, _asn: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError("connection refused".to_string()))
        }
        async fn put(&self, _asn: &str, _name: &str) -> Result<(), StoreError> {
            Err(StoreError("connection refused".to_string()))
        }
        async fn delete(&self, _asn: &str) -> Result<bool, StoreError> {
            Err(StoreError("connection refused".to_string()))
        }
        async fn list(&self) -> Result<Vec<AsnOverride>, StoreError> {
            Err(StoreError("connection refused".to_string()))
        }
    }

    fn memory() -> Overrides {
        Overrides::new(Arc::new(MemoryOverrideStore::new()))
    }

    #[tokio::test]
    async fn test_disabled_overrides() {
        let overrides = Overrides::disabled();
        assert!(!overrides.is_enabled());
        assert_eq!(
            overrides.lookup("AS15169").await,
            Err(OverrideError::NilCollection)
        );
        assert_eq!(
            overrides.set("AS15169", "x").await,
            Err(OverrideError::NilCollection)
        );
        assert_eq!(
            overrides.remove("AS15169").await,
            Err(OverrideError::NilCollection)
        );
        assert_eq!(overrides.list().await, Err(OverrideError::NilCollection));
    }

    #[tokio::test]
    async fn test_lookup_set_remove() {
        let overrides = memory();
        assert_eq!(
            overrides.lookup("AS15169").await,
            Err(OverrideError::AsnNotFound)
        );

        overrides.set("AS15169", "Custom Name").await.unwrap();
        assert_eq!(overrides.lookup("AS15169").await.unwrap(), "Custom Name");

        // Upsert replaces
        overrides.set("AS15169", "Other Name").await.unwrap();
        assert_eq!(overrides.lookup("AS15169").await.unwrap(), "Other Name");
        assert_eq!(overrides.list().await.unwrap().len(), 1);

        overrides.remove("AS15169").await.unwrap();
        assert_eq!(
            overrides.lookup("AS15169").await,
            Err(OverrideError::AsnNotFound)
        );
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let overrides = memory();
        assert_eq!(overrides.remove("AS64496").await, Ok(()));
        assert_eq!(overrides.remove("AS64496").await, Ok(()));
    }

    #[tokio::test]
    async fn test_set_rejects_malformed_asn() {
        let overrides = memory();
        for asn in ["15169", "as15169", "AS", "AS12a", ""] {
            assert_eq!(
                overrides.set(asn, "x").await,
                Err(OverrideError::MalformedAsn(asn.to_string()))
            );
        }
        assert!(overrides.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_empty_and_sorted() {
        let overrides = memory();
        assert_eq!(overrides.list().await.unwrap(), Vec::new());

        overrides.set("AS3356", "Level 3").await.unwrap();
        overrides.set("AS13335", "Cloudflare").await.unwrap();

        let list = overrides.list().await.unwrap();
        assert_eq!(
            list,
            vec![
                AsnOverride {
                    asn: "AS13335".to_string(),
                    name: "Cloudflare".to_string()
                },
                AsnOverride {
                    asn: "AS3356".to_string(),
                    name: "Level 3".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_store_failures_propagate() {
        let overrides = Overrides::new(Arc::new(BrokenStore));
        assert_eq!(
            overrides.lookup("AS15169").await,
            Err(OverrideError::Store("connection refused".to_string()))
        );
        assert!(matches!(
            overrides.remove("AS15169").await,
            Err(OverrideError::Store(_))
        ));
    }

    #[test]
    fn test_override_serializes_with_id() {
        let record = AsnOverride {
            asn: "AS15169".to_string(),
            name: "Google".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"id":"AS15169","name":"Google"}"#);
    }
}
