//! ASN data sources
//!
//! Three capabilities, queried by the resolver in a fixed precedence order:
//! an offline database, a remote "IP organization" HTTP service, and a
//! WHOIS-over-DNS service that only knows ASN descriptions.

pub mod cymru;
pub mod geoip;
pub mod ipinfo;

pub use cymru::CymruClient;
pub use geoip::GeoIpDatabase;
pub use ipinfo::IpInfoClient;

use crate::asn::AsnRecord;
use crate::error::SourceError;
use async_trait::async_trait;
use std::net::IpAddr;

/// Offline ASN database
///
/// Best-effort: a miss and a failure look the same.
#[async_trait]
pub trait LocalAsnSource: Send + Sync {
    /// ASN and description for `ip`; the description may be empty
    async fn lookup_local(&self, ip: IpAddr) -> Option<AsnRecord>;
}

/// Remote service mapping an IP to its ASN and organization
#[async_trait]
pub trait RemoteAsnSource: Send + Sync {
    /// ASN and description for `ip`; the description may be empty
    async fn lookup_remote(&self, ip: IpAddr) -> Result<AsnRecord, SourceError>;
}

/// Service describing an ASN
#[async_trait]
pub trait AsnDescriptionSource: Send + Sync {
    /// Organization name for `asn`
    async fn lookup_description(&self, asn: &str) -> Result<String, SourceError>;
}
