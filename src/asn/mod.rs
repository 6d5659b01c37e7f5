//! ASN identifiers and the resolution cache

pub mod cache;
pub mod id;

pub use cache::{AsnCache, CacheStats, CachedAsn};
pub use id::{is_asn, AsnRecord};
