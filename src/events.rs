//! Resolution events
//!
//! The resolver does not print. It reports what happened to an injected
//! [`ResolverObserver`]; [`LogObserver`] forwards events to the `log` facade.

use crate::error::{OverrideError, SourceError};
use std::fmt;

/// Which data source an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Offline ASN database
    LocalDatabase,
    /// Remote "IP organization" HTTP service
    Remote,
    /// WHOIS-over-DNS description service
    Description,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::LocalDatabase => "local database",
            SourceKind::Remote => "remote lookup",
            SourceKind::Description => "description lookup",
        };
        f.write_str(name)
    }
}

/// Something noteworthy that happened while resolving
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverEvent {
    /// A fresh cache entry answered the request
    CacheHit {
        /// Normalized IP
        ip: String,
    },
    /// The cache had nothing usable
    CacheMiss {
        /// Normalized IP
        ip: String,
        /// An entry existed but had expired
        stale: bool,
    },
    /// The local database had no ASN for the IP
    LocalMiss {
        /// Normalized IP
        ip: String,
    },
    /// A source failed; resolution continued with the next one
    SourceFailed {
        /// Failing source
        source: SourceKind,
        /// IP or ASN that was queried
        target: String,
        /// Failure
        error: SourceError,
    },
    /// An override replaced the computed description
    OverrideApplied {
        /// ASN whose description was replaced
        asn: String,
    },
    /// The override store failed; the computed description was kept
    OverrideFailed {
        /// ASN being looked up
        asn: String,
        /// Failure
        error: OverrideError,
    },
    /// A resolution was written to the cache
    Stored {
        /// Normalized IP
        ip: String,
        /// Resolved ASN
        asn: String,
    },
    /// Cache entries were purged
    Purged {
        /// Purged ASN, or `None` for a full purge
        asn: Option<String>,
    },
}

/// Receives resolver events
pub trait ResolverObserver: Send + Sync {
    /// Called once per event, synchronously, on the resolving task
    fn on_event(&self, event: &ResolverEvent);
}

impl<F> ResolverObserver for F
where
    F: Fn(&ResolverEvent) + Send + Sync,
{
    fn on_event(&self, event: &ResolverEvent) {
        self(event)
    }
}

/// Forwards events to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl ResolverObserver for LogObserver {
    fn on_event(&self, event: &ResolverEvent) {
        match event {
            ResolverEvent::CacheHit { ip } => log::debug!("cache hit for {ip}"),
            ResolverEvent::CacheMiss { ip, stale } => {
                if *stale {
                    log::debug!("cache entry for {ip} expired");
                } else {
                    log::debug!("cache miss for {ip}");
                }
            }
            ResolverEvent::LocalMiss { ip } => {
                log::warn!("local database lookup failed for ip '{ip}'")
            }
            ResolverEvent::SourceFailed {
                source,
                target,
                error,
            } => log::warn!("{source} failed for '{target}': {error}"),
            ResolverEvent::OverrideApplied { asn } => log::debug!("override applied for {asn}"),
            ResolverEvent::OverrideFailed { asn, error } => {
                log::warn!("override lookup failed for {asn}: {error}")
            }
            ResolverEvent::Stored { ip, asn } => log::debug!("cached {ip} -> {asn}"),
            ResolverEvent::Purged { asn: Some(asn) } => log::info!("cache purge for {asn}"),
            ResolverEvent::Purged { asn: None } => log::info!("cache purge"),
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ResolverObserver for NullObserver {
    fn on_event(&self, _event: &ResolverEvent) {}
}
