//! Remote ASN lookups against ipinfo.io's plain-text `org` endpoint
//!
//! The service answers with a single line, `"<ASN> <organization>"`, and
//! reports errors as prose rather than status codes, so any answer whose
//! first token is not an ASN is treated as a failure.

use super::RemoteAsnSource;
use crate::asn::{is_asn, AsnRecord};
use crate::error::SourceError;
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;

/// Default service base URL
pub const DEFAULT_IPINFO_BASE_URL: &str = "http://ipinfo.io";

/// Client for the remote IP organization service
#[derive(Debug, Clone)]
pub struct IpInfoClient {
    client: reqwest::Client,
    base_url: String,
}

impl IpInfoClient {
    /// Create a client for the default endpoint
    ///
    /// A zero `timeout` leaves requests unbounded.
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        Self::with_base_url(DEFAULT_IPINFO_BASE_URL, timeout)
    }

    /// Create a client for a custom endpoint
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let mut builder = reqwest::Client::builder();
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SourceError::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// URL queried for an address
    pub fn url_for(&self, ip: IpAddr) -> String {
        format!("{}/{ip}/org", self.base_url)
    }

    /// Query the service for the ASN of an address
    pub async fn lookup(&self, ip: IpAddr) -> Result<AsnRecord, SourceError> {
        let url = self.url_for(ip);
        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout
            } else {
                SourceError::Http(format!("failed to GET '{url}': {e}"))
            }
        })?;

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Http(format!("failed to read response: {e}")))?;

        parse_org_line(&body)
    }
}

#[async_trait]
impl RemoteAsnSource for IpInfoClient {
    async fn lookup_remote(&self, ip: IpAddr) -> Result<AsnRecord, SourceError> {
        self.lookup(ip).await
    }
}

/// Parse a `"<ASN> <organization>"` answer
pub fn parse_org_line(body: &str) -> Result<AsnRecord, SourceError> {
    let line = body.trim();
    if line.is_empty() {
        return Err(SourceError::EmptyAnswer);
    }

    let (asn, org) = match line.split_once(' ') {
        Some((asn, org)) => (asn, org.trim()),
        None => (line, ""),
    };

    if !is_asn(asn) {
        return Err(SourceError::InvalidResponse(line.to_string()));
    }

    Ok(AsnRecord::new(asn, org))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_org_line() {
        let record = parse_org_line("AS15169 Google LLC\n").unwrap();
        assert_eq!(record, AsnRecord::new("AS15169", "Google LLC"));
    }

    #[test]
    fn test_parse_org_line_bare_asn() {
        let record = parse_org_line("AS3356").unwrap();
        assert_eq!(record, AsnRecord::new("AS3356", ""));
        assert!(!record.is_complete());
    }

    #[test]
    fn test_parse_org_line_prose_error() {
        let result = parse_org_line("Please provide a valid IP address");
        assert!(matches!(result, Err(SourceError::InvalidResponse(_))));

        let result = parse_org_line("undefined");
        assert!(matches!(result, Err(SourceError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_org_line_empty() {
        assert_eq!(parse_org_line("  \n"), Err(SourceError::EmptyAnswer));
    }

    #[test]
    fn test_url_for() {
        let client = IpInfoClient::with_base_url("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        let ip: IpAddr = "8.8.8.8".parse().unwrap();
        assert_eq!(client.url_for(ip), "http://localhost:8080/8.8.8.8/org");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_error() {
        // Port 9 on loopback should refuse the connection
        let client = IpInfoClient::with_base_url("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let ip: IpAddr = "8.8.8.8".parse().unwrap();
        assert!(client.lookup(ip).await.is_err());
    }

    #[tokio::test]
    async fn test_public_lookup() {
        let client = IpInfoClient::new(Duration::from_secs(5)).unwrap();
        let ip: IpAddr = "8.8.8.8".parse().unwrap();

        match client.lookup(ip).await {
            Ok(record) => assert_eq!(record.asn, "AS15169"),
            Err(e) => eprintln!("ipinfo lookup failed (expected without network): {e}"),
        }
    }
}
