//! Override precedence over sourced descriptions

#![allow(clippy::unwrap_used)]

mod common;

use async_trait::async_trait;
use common::{record, FakeDescriber, FakeLocal, FakeRemote, Recorder};
use geoasn::{
    AsnOverride, MemoryOverrideStore, OverrideError, OverrideStore, Resolver, ResolverEvent,
    SourceError, StoreError,
};
use std::sync::Arc;

struct UnreachableStore;

#[async_trait]
impl OverrideStore for UnreachableStore {
    async fn get(&self, _asn: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError("no reachable servers".to_string()))
    }
    async fn put(&self, _asn: &str, _name: &str) -> Result<(), StoreError> {
        Err(StoreError("no reachable servers".to_string()))
    }
    async fn delete(&self, _asn: &str) -> Result<bool, StoreError> {
        Err(StoreError("no reachable servers".to_string()))
    }
    async fn list(&self) -> Result<Vec<AsnOverride>, StoreError> {
        Err(StoreError("no reachable servers".to_string()))
    }
}

fn custom_google() -> Arc<MemoryOverrideStore> {
    Arc::new(MemoryOverrideStore::with_records([AsnOverride {
        asn: "AS15169".to_string(),
        name: "Custom Name".to_string(),
    }]))
}

#[tokio::test]
async fn test_override_replaces_local_description() {
    let resolver = Resolver::builder()
        .local_source(FakeLocal::new(Some(record("AS15169", "Google Inc."))))
        .override_store(custom_google())
        .build()
        .unwrap();

    let result = resolver.resolve("8.8.8.8").await.unwrap();
    assert_eq!(result, record("AS15169", "Custom Name"));
}

#[tokio::test]
async fn test_override_replaces_remote_and_dns_descriptions() {
    let remote_only = Resolver::builder()
        .remote_source(FakeRemote::new(Ok(record("AS15169", "Google LLC"))))
        .override_store(custom_google())
        .build()
        .unwrap();
    assert_eq!(
        remote_only.resolve("8.8.8.8").await.unwrap().description,
        "Custom Name"
    );

    let dns_only = Resolver::builder()
        .local_source(FakeLocal::new(Some(record("AS15169", ""))))
        .description_source(FakeDescriber::new(Ok("GOOGLE".to_string())))
        .override_store(custom_google())
        .build()
        .unwrap();
    assert_eq!(
        dns_only.resolve("8.8.4.4").await.unwrap().description,
        "Custom Name"
    );

    // Even an ASN with no description from any source gets the override
    let bare = Resolver::builder()
        .local_source(FakeLocal::new(Some(record("AS15169", ""))))
        .description_source(FakeDescriber::new(Err(SourceError::EmptyAnswer)))
        .override_store(custom_google())
        .build()
        .unwrap();
    assert_eq!(
        bare.resolve("8.8.4.4").await.unwrap().description,
        "Custom Name"
    );
}

#[tokio::test]
async fn test_override_for_other_asn_is_ignored() {
    let recorder = Recorder::new();
    let resolver = Resolver::builder()
        .local_source(FakeLocal::new(Some(record("AS13335", "Cloudflare"))))
        .override_store(custom_google())
        .observer(recorder.clone())
        .build()
        .unwrap();

    let result = resolver.resolve("1.1.1.1").await.unwrap();
    assert_eq!(result, record("AS13335", "Cloudflare"));

    // Not-found is an expected outcome and is not reported
    assert!(!recorder
        .events()
        .iter()
        .any(|e| matches!(e, ResolverEvent::OverrideFailed { .. })));
}

#[tokio::test]
async fn test_failing_store_fails_open() {
    let recorder = Recorder::new();
    let resolver = Resolver::builder()
        .local_source(FakeLocal::new(Some(record("AS15169", "Google Inc."))))
        .override_store(Arc::new(UnreachableStore))
        .observer(recorder.clone())
        .build()
        .unwrap();

    let result = resolver.resolve("8.8.8.8").await.unwrap();
    assert_eq!(result, record("AS15169", "Google Inc."));
    assert!(recorder.events().contains(&ResolverEvent::OverrideFailed {
        asn: "AS15169".to_string(),
        error: OverrideError::Store("no reachable servers".to_string()),
    }));
}

#[tokio::test]
async fn test_disabled_overrides() {
    let recorder = Recorder::new();
    let resolver = Resolver::builder()
        .local_source(FakeLocal::new(Some(record("AS15169", "Google Inc."))))
        .observer(recorder.clone())
        .build()
        .unwrap();

    assert!(!resolver.overrides().is_enabled());
    assert_eq!(
        resolver.resolve("8.8.8.8").await.unwrap(),
        record("AS15169", "Google Inc.")
    );
    assert_eq!(
        resolver.override_lookup("AS15169").await,
        Err(OverrideError::NilCollection)
    );
    assert_eq!(
        resolver.override_list().await,
        Err(OverrideError::NilCollection)
    );
    assert!(!recorder.events().iter().any(|e| matches!(
        e,
        ResolverEvent::OverrideFailed { .. } | ResolverEvent::OverrideApplied { .. }
    )));
}

#[tokio::test]
async fn test_setting_override_invalidates_cached_asn() {
    let local = FakeLocal::new(Some(record("AS15169", "Google Inc.")));
    let resolver = Resolver::builder()
        .local_source(local.clone())
        .override_store(Arc::new(MemoryOverrideStore::new()))
        .build()
        .unwrap();

    assert_eq!(
        resolver.resolve("8.8.8.8").await.unwrap().description,
        "Google Inc."
    );
    assert_eq!(local.calls(), 1);

    resolver.override_set("AS15169", "Custom Name").await.unwrap();
    assert!(resolver.cached_ips("AS15169").is_empty());

    assert_eq!(
        resolver.resolve("8.8.8.8").await.unwrap().description,
        "Custom Name"
    );
    assert_eq!(local.calls(), 2);

    resolver.override_remove("AS15169").await.unwrap();
    assert_eq!(
        resolver.resolve("8.8.8.8").await.unwrap().description,
        "Google Inc."
    );

    // Removing again is not an error
    assert_eq!(resolver.override_remove("AS15169").await, Ok(()));
}

#[tokio::test]
async fn test_override_set_validates_asn() {
    let resolver = Resolver::builder()
        .override_store(Arc::new(MemoryOverrideStore::new()))
        .build()
        .unwrap();

    assert_eq!(
        resolver.override_set("15169", "x").await,
        Err(OverrideError::MalformedAsn("15169".to_string()))
    );
    assert!(resolver.override_list().await.unwrap().is_empty());
}
