//! ASN resolution with layered sources, overrides and caching
//!
//! [`Resolver::resolve`] is the entry point most callers want. For a public
//! IPv4 address it answers from the cache when a fresh entry exists, and
//! otherwise queries, in order:
//!
//! 1. the local database; a complete ASN + description answer wins outright
//! 2. the remote HTTP service; likewise
//! 3. the description service, for the first bare ASN found above
//!
//! The override table then gets the final say on the description, and the
//! result is cached under the normalized address.

use crate::addr::{classify, ClassifiedAddr};
use crate::asn::{AsnCache, AsnRecord, CacheStats};
use crate::config::{with_timeout, ResolverConfig};
use crate::error::{ConfigError, LookupError, OverrideError, ResolveError, SourceError};
use crate::events::{LogObserver, ResolverEvent, ResolverObserver, SourceKind};
use crate::overrides::{AsnOverride, OverrideStore, Overrides};
use crate::sources::{
    AsnDescriptionSource, CymruClient, GeoIpDatabase, IpInfoClient, LocalAsnSource,
    RemoteAsnSource,
};
use anyhow::Context;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// ASN resolver
///
/// Cheap to share behind an `Arc`; concurrent `resolve` calls for the same
/// address may both miss the cache, and the last one to finish decides the
/// cached value.
///
/// # Examples
///
/// ```no_run
/// use geoasn::{Resolver, ResolverConfig};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let resolver = Resolver::with_default_sources(ResolverConfig::default(), None, None)?;
///
///     let record = resolver.resolve("8.8.8.8").await?;
///     println!("{} {}", record.asn, record.description);
///     Ok(())
/// }
/// ```
pub struct Resolver {
    config: ResolverConfig,
    cache: Arc<AsnCache>,
    local: Option<Arc<dyn LocalAsnSource>>,
    remote: Option<Arc<dyn RemoteAsnSource>>,
    describer: Option<Arc<dyn AsnDescriptionSource>>,
    overrides: Overrides,
    observer: Arc<dyn ResolverObserver>,
}

impl Resolver {
    /// Create a new Resolver builder
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// Resolver over the stock sources
    ///
    /// Uses the MaxMind database at `geoip_db` when given, ipinfo.io, and
    /// Team Cymru's DNS service. `overrides` of `None` disables overrides.
    pub fn with_default_sources(
        config: ResolverConfig,
        geoip_db: Option<&Path>,
        overrides: Option<Arc<dyn OverrideStore>>,
    ) -> anyhow::Result<Self> {
        let mut builder = Self::builder()
            .config(config.clone())
            .remote_source(Arc::new(
                IpInfoClient::new(config.timeout).context("cannot create HTTP client")?,
            ))
            .description_source(Arc::new(CymruClient::new(config.timeout)));

        if let Some(path) = geoip_db {
            let db = GeoIpDatabase::open(path).context("cannot open GeoIP database")?;
            builder = builder.local_source(Arc::new(db));
        }
        if let Some(store) = overrides {
            builder = builder.override_store(store);
        }

        Ok(builder.build()?)
    }

    /// Active configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn emit(&self, event: ResolverEvent) {
        self.observer.on_event(&event);
    }

    /// Classify `ip` and reject anything but a public IPv4 address
    fn public_ipv4(ip: &str) -> Result<ClassifiedAddr, ResolveError> {
        let addr = classify(ip)?;
        if !addr.is_ipv4 {
            return Err(ResolveError::Ipv6Unsupported(ip.to_string()));
        }
        if addr.is_local {
            return Err(ResolveError::PrivateAddress(ip.to_string()));
        }
        Ok(addr)
    }

    /// Resolve the ASN and organization of an IP address
    ///
    /// Source failures never surface here; only a total absence of an ASN
    /// does, as [`ResolveError::UnknownAsn`]. Failed resolutions are not
    /// cached.
    pub async fn resolve(&self, ip: &str) -> Result<AsnRecord, ResolveError> {
        let addr = Self::public_ipv4(ip)?;
        let key = addr.normalized();

        match self.cache.lookup_by_ip(&key) {
            Some(hit) if !hit.expired => {
                self.emit(ResolverEvent::CacheHit { ip: key });
                return Ok(AsnRecord::new(hit.asn, hit.description));
            }
            Some(_) => self.emit(ResolverEvent::CacheMiss {
                ip: key.clone(),
                stale: true,
            }),
            None => self.emit(ResolverEvent::CacheMiss {
                ip: key.clone(),
                stale: false,
            }),
        }

        let record = self.resolve_uncached(addr.addr, &key).await?;

        self.cache.store(&key, &record.asn, &record.description);
        self.emit(ResolverEvent::Stored {
            ip: key,
            asn: record.asn.clone(),
        });
        Ok(record)
    }

    async fn resolve_uncached(&self, ip: IpAddr, key: &str) -> Result<AsnRecord, ResolveError> {
        let local = self.query_local(ip, key).await;
        if let Some(record) = local.as_ref().filter(|r| r.is_complete()) {
            return Ok(self.with_override(record.clone()).await);
        }

        let remote = self.query_remote(ip, key).await;
        if let Some(record) = remote.as_ref().filter(|r| r.is_complete()) {
            return Ok(self.with_override(record.clone()).await);
        }

        // An ASN without description; the database answer is preferred
        let asn = local
            .or(remote)
            .map(|r| r.asn)
            .ok_or_else(|| ResolveError::UnknownAsn(key.to_string()))?;

        let description = self.query_description(&asn).await.unwrap_or_default();
        Ok(self.with_override(AsnRecord::new(asn, description)).await)
    }

    /// Local database answer carrying at least a well-formed ASN
    async fn query_local(&self, ip: IpAddr, key: &str) -> Option<AsnRecord> {
        let source = self.local.as_ref()?;
        let found = with_timeout(self.config.timeout, async {
            Ok(source.lookup_local(ip).await)
        })
        .await
        .ok()
        .flatten()
        .filter(AsnRecord::has_asn);

        if found.is_none() {
            self.emit(ResolverEvent::LocalMiss {
                ip: key.to_string(),
            });
        }
        found
    }

    /// Remote answer carrying at least a well-formed ASN
    async fn query_remote(&self, ip: IpAddr, key: &str) -> Option<AsnRecord> {
        let source = self.remote.as_ref()?;
        match with_timeout(self.config.timeout, source.lookup_remote(ip)).await {
            Ok(record) if record.has_asn() => Some(record),
            Ok(record) => {
                let error = if record.asn.is_empty() {
                    SourceError::EmptyAnswer
                } else {
                    SourceError::InvalidResponse(format!("malformed ASN '{}'", record.asn))
                };
                self.emit(ResolverEvent::SourceFailed {
                    source: SourceKind::Remote,
                    target: key.to_string(),
                    error,
                });
                None
            }
            Err(error) => {
                self.emit(ResolverEvent::SourceFailed {
                    source: SourceKind::Remote,
                    target: key.to_string(),
                    error,
                });
                None
            }
        }
    }

    async fn query_description(&self, asn: &str) -> Option<String> {
        let source = self.describer.as_ref()?;
        match with_timeout(self.config.timeout, source.lookup_description(asn)).await {
            Ok(description) => Some(description),
            Err(error) => {
                self.emit(ResolverEvent::SourceFailed {
                    source: SourceKind::Description,
                    target: asn.to_string(),
                    error,
                });
                None
            }
        }
    }

    /// Replace the description with the override for its ASN, if any
    ///
    /// Fails open: store errors keep the computed description.
    async fn with_override(&self, mut record: AsnRecord) -> AsnRecord {
        match self.overrides.lookup(&record.asn).await {
            Ok(description) => {
                self.emit(ResolverEvent::OverrideApplied {
                    asn: record.asn.clone(),
                });
                record.description = description;
            }
            Err(OverrideError::NilCollection | OverrideError::AsnNotFound) => {}
            Err(error) => self.emit(ResolverEvent::OverrideFailed {
                asn: record.asn.clone(),
                error,
            }),
        }
        record
    }

    /// Query only the local database
    ///
    /// Returns `Ok(None)` when the database has no answer, does not answer
    /// within the timeout, or none is configured.
    pub async fn lookup_local(&self, ip: &str) -> Result<Option<AsnRecord>, ResolveError> {
        let addr = Self::public_ipv4(ip)?;
        let Some(source) = &self.local else {
            return Ok(None);
        };
        Ok(with_timeout(self.config.timeout, async {
            Ok(source.lookup_local(addr.addr).await)
        })
        .await
        .ok()
        .flatten())
    }

    /// Query only the remote HTTP service
    pub async fn lookup_remote(&self, ip: &str) -> Result<AsnRecord, LookupError> {
        let addr = Self::public_ipv4(ip)?;
        let source = self.remote.as_ref().ok_or(SourceError::NotConfigured)?;
        Ok(with_timeout(self.config.timeout, source.lookup_remote(addr.addr)).await?)
    }

    /// Query only the description service for an ASN
    pub async fn lookup_description(&self, asn: &str) -> Result<String, SourceError> {
        let source = self.describer.as_ref().ok_or(SourceError::NotConfigured)?;
        with_timeout(self.config.timeout, source.lookup_description(asn)).await
    }

    /// Shared cache instance
    pub fn cache(&self) -> &Arc<AsnCache> {
        &self.cache
    }

    /// Erase all cached resolutions
    pub fn purge_cache(&self) {
        self.cache.purge_all();
        self.emit(ResolverEvent::Purged { asn: None });
    }

    /// Erase cached resolutions for one ASN
    pub fn purge_asn(&self, asn: &str) {
        self.cache.purge_asn(asn);
        self.emit(ResolverEvent::Purged {
            asn: Some(asn.to_string()),
        });
    }

    /// Cached IPs that resolved to `asn`, sorted
    pub fn cached_ips(&self, asn: &str) -> Vec<String> {
        let mut ips: Vec<String> = self.cache.lookup_by_asn(asn).into_iter().collect();
        ips.sort();
        ips
    }

    /// Every ASN present in the cache, sorted
    pub fn cached_asns(&self) -> Vec<String> {
        let mut asns = self.cache.list_asns();
        asns.sort();
        asns
    }

    /// Cache size statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Override table
    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    /// Override description for an ASN
    pub async fn override_lookup(&self, asn: &str) -> Result<String, OverrideError> {
        self.overrides.lookup(asn).await
    }

    /// Set an override and drop cached resolutions for its ASN
    pub async fn override_set(&self, asn: &str, description: &str) -> Result<(), OverrideError> {
        self.overrides.set(asn, description).await?;
        self.purge_asn(asn);
        Ok(())
    }

    /// Remove an override and drop cached resolutions for its ASN
    pub async fn override_remove(&self, asn: &str) -> Result<(), OverrideError> {
        self.overrides.remove(asn).await?;
        self.purge_asn(asn);
        Ok(())
    }

    /// All overrides
    pub async fn override_list(&self) -> Result<Vec<AsnOverride>, OverrideError> {
        self.overrides.list().await
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("config", &self.config)
            .field("local", &self.local.is_some())
            .field("remote", &self.remote.is_some())
            .field("describer", &self.describer.is_some())
            .field("overrides", &self.overrides)
            .finish_non_exhaustive()
    }
}

/// Builder for Resolver
///
/// Sources left unset are skipped during resolution.
pub struct ResolverBuilder {
    config: ResolverConfig,
    cache: Option<Arc<AsnCache>>,
    local: Option<Arc<dyn LocalAsnSource>>,
    remote: Option<Arc<dyn RemoteAsnSource>>,
    describer: Option<Arc<dyn AsnDescriptionSource>>,
    overrides: Overrides,
    observer: Arc<dyn ResolverObserver>,
}

impl ResolverBuilder {
    /// Create a builder with default configuration and no sources
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::default(),
            cache: None,
            local: None,
            remote: None,
            describer: None,
            overrides: Overrides::disabled(),
            observer: Arc::new(LogObserver),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the per-call timeout for source lookups
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the TTL of the cache created by [`ResolverBuilder::build`]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl = ttl;
        self
    }

    /// Use an existing cache instead of creating one
    pub fn cache(mut self, cache: Arc<AsnCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the local database source
    pub fn local_source(mut self, source: Arc<dyn LocalAsnSource>) -> Self {
        self.local = Some(source);
        self
    }

    /// Set the remote HTTP source
    pub fn remote_source(mut self, source: Arc<dyn RemoteAsnSource>) -> Self {
        self.remote = Some(source);
        self
    }

    /// Set the ASN description source
    pub fn description_source(mut self, source: Arc<dyn AsnDescriptionSource>) -> Self {
        self.describer = Some(source);
        self
    }

    /// Enable overrides backed by `store`
    pub fn override_store(mut self, store: Arc<dyn OverrideStore>) -> Self {
        self.overrides = Overrides::new(store);
        self
    }

    /// Receive resolution events; defaults to [`LogObserver`]
    pub fn observer(mut self, observer: Arc<dyn ResolverObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Build the resolver
    pub fn build(self) -> Result<Resolver, ConfigError> {
        self.config.validate()?;
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(AsnCache::with_ttl(self.config.cache_ttl)));
        Ok(Resolver {
            config: self.config,
            cache,
            local: self.local,
            remote: self.remote,
            describer: self.describer,
            overrides: self.overrides,
            observer: self.observer,
        })
    }
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}
