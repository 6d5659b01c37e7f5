//! Address classification
//!
//! Parses textual IP literals and flags addresses from the IANA
//! special-purpose registries whose "Global" flag is false.

use crate::error::ResolveError;
use ipnet::{Ipv4Net, Ipv6Net};
use once_cell::sync::Lazy;
use std::net::IpAddr;

/// IANA IPv4 Special-Purpose Address Registry entries that are not global
///
/// <http://www.iana.org/assignments/iana-ipv4-special-registry/>
const NON_GLOBAL_IPV4_CIDRS: &[&str] = &[
    "127.0.0.0/8",        // Loopback, RFC1122
    "192.168.0.0/16",     // Private-Use, RFC1918
    "10.0.0.0/8",         // Private-Use, RFC1918
    "172.16.0.0/12",      // Private-Use, RFC1918
    "0.0.0.0/8",          // This host on this network, RFC1122
    "100.64.0.0/10",      // Shared Address Space, RFC6598
    "169.254.0.0/16",     // Link Local, RFC3927
    "192.0.0.0/24",       // IETF Protocol Assignments, RFC6890
    "192.0.2.0/24",       // TEST-NET-1, RFC5737
    "198.18.0.0/15",      // Benchmarking, RFC2544
    "198.51.100.0/24",    // TEST-NET-2, RFC5737
    "203.0.113.0/24",     // TEST-NET-3, RFC5737
    "240.0.0.0/4",        // Reserved, RFC1112
    "255.255.255.255/32", // Limited Broadcast, RFC919
];

/// IANA IPv6 Special-Purpose Address Registry entries that are not global
///
/// <http://www.iana.org/assignments/iana-ipv6-special-registry/>
const NON_GLOBAL_IPV6_CIDRS: &[&str] = &[
    "::1/128",       // Loopback, RFC4291
    "fc00::/7",      // Unique-Local, RFC4193
    "::ffff:0:0/96", // IPv4-mapped, RFC4291
    "fe80::/10",     // Link-Scoped Unicast, RFC4291
    "::/128",        // Unspecified, RFC4291
    "2001::/23",     // IETF Protocol Assignments, RFC2928
    "2001:db8::/32", // Documentation, RFC3849
    "2001:2::/48",   // Benchmarking, RFC5180
    "2001::/32",     // TEREDO, RFC4380
    "100::/64",      // Discard-Only, RFC6666
];

static NON_GLOBAL_IPV4: Lazy<Vec<Ipv4Net>> = Lazy::new(|| {
    NON_GLOBAL_IPV4_CIDRS
        .iter()
        .map(|cidr| cidr.parse().expect("static IPv4 CIDR table is valid"))
        .collect()
});

static NON_GLOBAL_IPV6: Lazy<Vec<Ipv6Net>> = Lazy::new(|| {
    NON_GLOBAL_IPV6_CIDRS
        .iter()
        .map(|cidr| cidr.parse().expect("static IPv6 CIDR table is valid"))
        .collect()
});

/// A parsed and classified address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedAddr {
    /// Parsed address; IPv4-mapped IPv6 literals are unwrapped to IPv4
    pub addr: IpAddr,
    /// Whether the address is IPv4
    pub is_ipv4: bool,
    /// Whether the address is not globally routable
    pub is_local: bool,
}

impl ClassifiedAddr {
    /// Canonical textual form, used as the cache key
    pub fn normalized(&self) -> String {
        self.addr.to_string()
    }
}

/// Parse and classify a textual IP address
///
/// Hostnames are never resolved; anything that is not an IP literal fails
/// with [`ResolveError::MalformedAddress`].
pub fn classify(text: &str) -> Result<ClassifiedAddr, ResolveError> {
    let parsed: IpAddr = text
        .trim()
        .parse()
        .map_err(|_| ResolveError::MalformedAddress(text.to_string()))?;

    let addr = match parsed {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => parsed,
        },
        IpAddr::V4(_) => parsed,
    };

    Ok(ClassifiedAddr {
        addr,
        is_ipv4: addr.is_ipv4(),
        is_local: is_local_ip(&addr),
    })
}

/// Whether an address is not forwardable across networks
pub fn is_local_ip(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => NON_GLOBAL_IPV4.iter().any(|net| net.contains(v4)),
        IpAddr::V6(v6) => NON_GLOBAL_IPV6.iter().any(|net| net.contains(v6)),
    }
}
