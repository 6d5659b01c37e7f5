//! ASN identifiers and resolved records

use serde::{Deserialize, Serialize};

/// Whether `s` has the form `AS<digits>`
pub fn is_asn(s: &str) -> bool {
    s.strip_prefix("AS")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// An ASN together with its organization description
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AsnRecord {
    /// ASN identifier, `AS<digits>`; empty when a source had none
    pub asn: String,
    /// Organization description, possibly empty
    pub description: String,
}

impl AsnRecord {
    /// Create a record from an ASN and a description
    pub fn new(asn: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            asn: asn.into(),
            description: description.into(),
        }
    }

    /// A well-formed ASN and a description are both present
    pub fn is_complete(&self) -> bool {
        self.has_asn() && !self.description.is_empty()
    }

    /// The ASN is present and has the form `AS<digits>`
    pub fn has_asn(&self) -> bool {
        is_asn(&self.asn)
    }
}
