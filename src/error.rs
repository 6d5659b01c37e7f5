//! Error types for ASN resolution

use thiserror::Error;

/// Errors surfaced to callers of [`crate::Resolver::resolve`]
///
/// This is a closed set. Failures of individual data sources never appear
/// here directly; they degrade to the next source and only surface as
/// [`ResolveError::UnknownAsn`] when no source produced an ASN at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Input is not an IPv4 or IPv6 literal
    #[error("malformed IP address: {0}")]
    MalformedAddress(String),

    /// Input is inside a non-globally-routable special-purpose range
    #[error("private IP address: {0}")]
    PrivateAddress(String),

    /// IPv6 resolution is not supported
    #[error("IPv6 not yet supported: {0}")]
    Ipv6Unsupported(String),

    /// No source produced an ASN for the address
    #[error("unknown ASN for ip '{0}'")]
    UnknownAsn(String),
}

/// Errors reported by an individual data source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Call exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// DNS resolution failed
    #[error("DNS resolution failed: {0}")]
    Dns(String),

    /// The service answered with something that is not an ASN record
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The service answered with nothing usable
    #[error("empty answer")]
    EmptyAnswer,

    /// The local database could not be opened or read
    #[error("database error: {0}")]
    Database(String),

    /// No source of this kind is configured
    #[error("source not configured")]
    NotConfigured,
}

/// Errors from a direct single-source lookup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The address was rejected before any source was queried
    #[error(transparent)]
    Input(#[from] ResolveError),

    /// The source itself failed
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Errors from the override table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideError {
    /// Resolver was built without an override store
    #[error("nil overrides collection")]
    NilCollection,

    /// No override is defined for the ASN
    #[error("ASN not found")]
    AsnNotFound,

    /// Identifier does not match `AS<digits>`
    #[error("malformed ASN identifier: {0}")]
    MalformedAsn(String),

    /// Backing store failure
    #[error("override store error: {0}")]
    Store(String),
}

/// Failure reported by a persistent override store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl From<StoreError> for OverrideError {
    fn from(err: StoreError) -> Self {
        OverrideError::Store(err.0)
    }
}

/// Invalid resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(pub String);
