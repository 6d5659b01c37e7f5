//! geoasn - ASN and organization lookup for IP addresses
//!
//! This library resolves the autonomous system of an IP address by querying
//! an offline database, a remote HTTP service and a WHOIS-over-DNS service
//! in a fixed precedence order, applying locally managed description
//! overrides, and caching results.

pub mod addr;
pub mod asn;
pub mod config;
pub mod error;
pub mod events;
pub mod overrides;
pub mod resolver;
pub mod sources;

// Re-export core types for library users
pub use addr::{classify, is_local_ip, ClassifiedAddr};
pub use asn::{is_asn, AsnCache, AsnRecord, CacheStats, CachedAsn};
pub use config::{ResolverConfig, ResolverConfigBuilder};
pub use error::{ConfigError, LookupError, OverrideError, ResolveError, SourceError, StoreError};
pub use events::{LogObserver, NullObserver, ResolverEvent, ResolverObserver, SourceKind};
pub use overrides::{
    AsnOverride, JsonFileOverrideStore, MemoryOverrideStore, OverrideStore, Overrides,
};
pub use resolver::{Resolver, ResolverBuilder};
pub use sources::{
    AsnDescriptionSource, CymruClient, GeoIpDatabase, IpInfoClient, LocalAsnSource,
    RemoteAsnSource,
};
