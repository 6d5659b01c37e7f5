//! Fake sources shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use geoasn::{
    AsnDescriptionSource, AsnRecord, LocalAsnSource, RemoteAsnSource, ResolverEvent,
    ResolverObserver, SourceError,
};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Local database with a fixed answer
#[derive(Default)]
pub struct FakeLocal {
    pub answer: Option<AsnRecord>,
    pub calls: AtomicUsize,
}

impl FakeLocal {
    pub fn new(answer: Option<AsnRecord>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocalAsnSource for FakeLocal {
    async fn lookup_local(&self, _ip: IpAddr) -> Option<AsnRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

/// Remote service with a fixed answer and optional latency
pub struct FakeRemote {
    pub answer: Result<AsnRecord, SourceError>,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl FakeRemote {
    pub fn new(answer: Result<AsnRecord, SourceError>) -> Arc<Self> {
        Self::slow(answer, Duration::ZERO)
    }

    pub fn slow(answer: Result<AsnRecord, SourceError>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            answer,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteAsnSource for FakeRemote {
    async fn lookup_remote(&self, _ip: IpAddr) -> Result<AsnRecord, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.answer.clone()
    }
}

/// Description service with a fixed answer; records queried ASNs
pub struct FakeDescriber {
    pub answer: Result<String, SourceError>,
    pub queried: Mutex<Vec<String>>,
}

impl FakeDescriber {
    pub fn new(answer: Result<String, SourceError>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            queried: Mutex::new(Vec::new()),
        })
    }

    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }
}

#[async_trait]
impl AsnDescriptionSource for FakeDescriber {
    async fn lookup_description(&self, asn: &str) -> Result<String, SourceError> {
        self.queried.lock().unwrap().push(asn.to_string());
        self.answer.clone()
    }
}

/// Observer that keeps every event
#[derive(Default)]
pub struct Recorder {
    pub events: Mutex<Vec<ResolverEvent>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<ResolverEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ResolverObserver for Recorder {
    fn on_event(&self, event: &ResolverEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn record(asn: &str, description: &str) -> AsnRecord {
    AsnRecord::new(asn, description)
}
