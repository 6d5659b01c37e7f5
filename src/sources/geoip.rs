//! Offline ASN lookups from a MaxMind GeoLite2-ASN database

use super::LocalAsnSource;
use crate::asn::AsnRecord;
use crate::error::SourceError;
use async_trait::async_trait;
use maxminddb::{geoip2, Reader};
use std::net::IpAddr;
use std::path::Path;

/// An opened GeoLite2-ASN database
pub struct GeoIpDatabase {
    reader: Reader<Vec<u8>>,
}

impl GeoIpDatabase {
    /// Open a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let reader = Reader::open_readfile(path)
            .map_err(|e| SourceError::Database(format!("{}: {e}", path.display())))?;
        Ok(Self { reader })
    }

    /// Look up the ASN of an address
    ///
    /// Returns `None` when the database has no network for the address.
    pub fn lookup(&self, ip: IpAddr) -> Option<AsnRecord> {
        let record: geoip2::Asn = self.reader.lookup(ip).ok()?;
        let number = record.autonomous_system_number?;
        let org = record.autonomous_system_organization.unwrap_or_default();
        Some(AsnRecord::new(format!("AS{number}"), org.trim()))
    }

    /// Database type from the file metadata, e.g. `GeoLite2-ASN`
    pub fn database_type(&self) -> &str {
        &self.reader.metadata.database_type
    }
}

impl std::fmt::Debug for GeoIpDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoIpDatabase")
            .field("database_type", &self.database_type())
            .finish()
    }
}

#[async_trait]
impl LocalAsnSource for GeoIpDatabase {
    async fn lookup_local(&self, ip: IpAddr) -> Option<AsnRecord> {
        self.lookup(ip)
    }
}
