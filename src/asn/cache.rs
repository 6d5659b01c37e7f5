//! Bidirectional ASN resolution cache
//!
//! Keeps two indices under one lock: IP to cached record, and ASN to the set
//! of IPs currently cached under it. An IP appears in the ASN index under `X`
//! exactly when its forward entry carries ASN `X`.
//!
//! Expiry is advisory. Expired entries stay in place and are reported as
//! such on read; only [`AsnCache::purge_asn`] and [`AsnCache::purge_all`]
//! remove data.

use crate::config::DEFAULT_CACHE_TTL_SECS;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry {
    asn: String,
    description: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct Indices {
    by_ip: HashMap<String, CacheEntry>,
    by_asn: HashMap<String, HashSet<String>>,
}

/// A cache hit, possibly stale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAsn {
    /// Cached ASN identifier
    pub asn: String,
    /// Cached description
    pub description: String,
    /// Whether the entry outlived its TTL
    pub expired: bool,
}

/// Thread-safe IP to ASN cache with an ASN to IP reverse index
#[derive(Debug)]
pub struct AsnCache {
    inner: RwLock<Indices>,
    ttl: Duration,
}

impl AsnCache {
    /// Create a cache with the default TTL (24 hours)
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }

    /// Create a cache with a custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(Indices::default()),
            ttl,
        }
    }

    /// TTL applied to newly stored entries
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up an IP address
    ///
    /// Returns `None` only if the IP was never stored or has been purged.
    /// Expired entries are still returned, flagged with `expired`.
    pub fn lookup_by_ip(&self, ip: &str) -> Option<CachedAsn> {
        let inner = self.inner.read().expect("rwlock poisoned");
        inner.by_ip.get(ip).map(|entry| CachedAsn {
            asn: entry.asn.clone(),
            description: entry.description.clone(),
            expired: Instant::now() > entry.expires_at,
        })
    }

    /// Store a record for an IP, replacing any prior entry
    pub fn store(&self, ip: &str, asn: &str, description: &str) {
        let mut inner = self.inner.write().expect("rwlock poisoned");

        // Drop the IP from whatever bucket holds it and prune empty buckets
        inner.by_asn.retain(|_, ips| {
            ips.remove(ip);
            !ips.is_empty()
        });

        inner.by_ip.insert(
            ip.to_string(),
            CacheEntry {
                asn: asn.to_string(),
                description: description.to_string(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        inner
            .by_asn
            .entry(asn.to_string())
            .or_default()
            .insert(ip.to_string());
    }

    /// All IPs currently cached under an ASN; empty if the ASN is unknown
    pub fn lookup_by_asn(&self, asn: &str) -> HashSet<String> {
        let inner = self.inner.read().expect("rwlock poisoned");
        inner.by_asn.get(asn).cloned().unwrap_or_default()
    }

    /// Remove every entry cached under an ASN
    pub fn purge_asn(&self, asn: &str) {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        inner.by_ip.retain(|_, entry| entry.asn != asn);
        inner.by_asn.remove(asn);
    }

    /// Remove all entries
    pub fn purge_all(&self) {
        let mut inner = self.inner.write().expect("rwlock poisoned");
        inner.by_ip.clear();
        inner.by_asn.clear();
    }

    /// Every distinct ASN in the cache, in no particular order
    pub fn list_asns(&self) -> Vec<String> {
        let inner = self.inner.read().expect("rwlock poisoned");
        inner.by_asn.keys().cloned().collect()
    }

    /// Number of cached IPs
    pub fn len(&self) -> usize {
        self.inner.read().expect("rwlock poisoned").by_ip.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("rwlock poisoned").by_ip.is_empty()
    }

    /// Snapshot of cache sizes
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.read().expect("rwlock poisoned");
        let now = Instant::now();
        CacheStats {
            entries: inner.by_ip.len(),
            asns: inner.by_asn.len(),
            expired: inner
                .by_ip
                .values()
                .filter(|entry| now > entry.expires_at)
                .count(),
        }
    }
}

impl Default for AsnCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the ASN cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached IPs
    pub entries: usize,
    /// Number of distinct ASNs
    pub asns: usize,
    /// Number of entries past their TTL
    pub expired: usize,
}
