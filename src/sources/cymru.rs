//! ASN descriptions from Team Cymru's WHOIS-over-DNS service
//!
//! `AS<n>.asn.cymru.com` carries a TXT record such as
//! `15169 | US | arin | 2000-03-30 | GOOGLE - Google LLC, US`.

use super::AsnDescriptionSource;
use crate::error::SourceError;
use async_trait::async_trait;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::TokioResolver;
use std::sync::Arc;
use std::time::Duration;

/// Client for ASN description lookups
#[derive(Clone)]
pub struct CymruClient {
    resolver: Arc<TokioResolver>,
}

impl CymruClient {
    /// Create a client querying Google's public resolver
    ///
    /// A zero `timeout` keeps the resolver's own default.
    pub fn new(timeout: Duration) -> Self {
        let mut builder = TokioResolver::builder_with_config(
            ResolverConfig::google(),
            TokioConnectionProvider::default(),
        );
        if !timeout.is_zero() {
            builder.options_mut().timeout = timeout;
        }
        Self {
            resolver: Arc::new(builder.build()),
        }
    }

    /// Create a client around an existing resolver
    pub fn with_resolver(resolver: Arc<TokioResolver>) -> Self {
        Self { resolver }
    }

    /// Look up the description of an ASN
    pub async fn lookup(&self, asn: &str) -> Result<String, SourceError> {
        if asn.is_empty() {
            return Err(SourceError::InvalidResponse("empty asn parameter".to_string()));
        }

        let lookup = self
            .resolver
            .txt_lookup(description_query(asn))
            .await
            .map_err(|e| SourceError::Dns(e.to_string()))?;

        let record = lookup.iter().next().ok_or(SourceError::EmptyAnswer)?;

        let txt_data = record
            .iter()
            .map(|data| String::from_utf8_lossy(data))
            .collect::<Vec<_>>()
            .join("");

        parse_description(&txt_data).ok_or(SourceError::EmptyAnswer)
    }
}

impl std::fmt::Debug for CymruClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CymruClient").finish_non_exhaustive()
    }
}

#[async_trait]
impl AsnDescriptionSource for CymruClient {
    async fn lookup_description(&self, asn: &str) -> Result<String, SourceError> {
        self.lookup(asn).await
    }
}

/// Fully qualified TXT query name for an ASN
pub fn description_query(asn: &str) -> String {
    format!("{asn}.asn.cymru.com.")
}

/// Extract the organization name from a TXT payload
///
/// Everything up to and including the last `|` is registry metadata.
pub fn parse_description(txt: &str) -> Option<String> {
    let name = match txt.rfind('|') {
        Some(pos) => &txt[pos + 1..],
        None => txt,
    }
    .trim();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
