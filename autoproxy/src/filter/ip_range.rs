//! CIDR range filter for IPv4 and IPv6

use crate::error::FormatError;
use crate::uri::RequestUri;
use ipnet::IpNet;
use std::net::{IpAddr, ToSocketAddrs};
use std::str::FromStr;

/// Matches URIs whose host is, or resolves to, an address inside a range.
///
/// The range is stored as its network address, so `127.0.0.1/8` behaves
/// exactly like `127.0.0.0/8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpRangeFilter {
    network: IpNet,
}

impl IpRangeFilter {
    /// Build a filter from `<address>/<prefix length>`
    pub fn new(range: &str) -> Result<Self, FormatError> {
        let network = IpNet::from_str(range.trim()).map_err(|_| FormatError::InvalidIpRange {
            range: range.to_string(),
        })?;
        Ok(Self {
            network: network.trunc(),
        })
    }

    /// Check that `candidate` is a well-formed `address/prefix` string
    /// without resolving anything
    pub fn is_valid(candidate: &str) -> bool {
        candidate.contains('/') && IpNet::from_str(candidate).is_ok()
    }

    pub fn network(&self) -> IpNet {
        self.network
    }

    pub fn base_address(&self) -> IpAddr {
        self.network.network()
    }

    pub fn prefix_len(&self) -> u8 {
        self.network.prefix_len()
    }

    /// Compare the high `prefix_len` bits of `addr` with the range.
    /// Addresses of the other family never match.
    pub fn contains(&self, addr: IpAddr) -> bool {
        self.network.contains(&addr)
    }

    pub fn accept(&self, uri: &RequestUri) -> bool {
        resolve_host(uri).into_iter().any(|addr| self.contains(addr))
    }
}

/// Literal host address, or the result of a DNS lookup for host names.
/// Lookup failures yield no addresses.
fn resolve_host(uri: &RequestUri) -> Vec<IpAddr> {
    if let Some(addr) = uri.ip_addr() {
        return vec![addr];
    }
    let Some(host) = uri.host() else {
        return Vec::new();
    };
    match (host, 0).to_socket_addrs() {
        Ok(addrs) => addrs.map(|sa| sa.ip()).collect(),
        Err(e) => {
            tracing::debug!("Could not resolve {} for IP range check: {}", host, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_is_valid_ipv4() {
        for valid in ["127.0.0.1/8", "127.0.0.1/32", "255.255.255.255/32", "0.0.0.0/0"] {
            assert!(IpRangeFilter::is_valid(valid), "should accept {}", valid);
        }
        for invalid in [
            "127.0.0.1",
            "localhost",
            "http://www.sick.de",
            "test.sick.de",
            "400.400.400.400",
            "400.400.400.400/8",
            "127.0.0.1/33",
            "127.0.0.*",
            "127.0.0.*/8",
            "www.test.com/8",
            "127.0.0.1/33.html",
            "127.0.0.1/abc",
            "",
        ] {
            assert!(!IpRangeFilter::is_valid(invalid), "should reject {}", invalid);
        }
    }

    #[test]
    fn test_is_valid_ipv6() {
        assert!(IpRangeFilter::is_valid("2001:db8::/32"));
        assert!(IpRangeFilter::is_valid("0::0/0"));
        assert!(IpRangeFilter::is_valid("2001:db8::/128"));
        assert!(!IpRangeFilter::is_valid("2001:zb8::/32"));
        assert!(!IpRangeFilter::is_valid("2001:db8::/129"));
        assert!(!IpRangeFilter::is_valid("2001:db8::"));
    }

    #[test]
    fn test_new_rejects_invalid_range() {
        assert_eq!(
            IpRangeFilter::new("127.0.0.1/33"),
            Err(FormatError::InvalidIpRange {
                range: "127.0.0.1/33".to_string()
            })
        );
    }

    #[test]
    fn test_host_bits_are_masked() {
        let filter = IpRangeFilter::new("127.0.0.1/8").unwrap();
        assert_eq!(filter.base_address(), IpAddr::V4(Ipv4Addr::new(127, 0, 0, 0)));
        assert_eq!(filter.prefix_len(), 8);
        assert_eq!(filter.network().to_string(), "127.0.0.0/8");
        assert!(filter.contains(IpAddr::V4(Ipv4Addr::new(127, 200, 3, 4))));
        assert!(!filter.contains(IpAddr::V4(Ipv4Addr::new(128, 0, 0, 1))));
    }

    #[test]
    fn test_ipv4_range_accept() {
        let filter = IpRangeFilter::new("192.168.0.0/24").unwrap();
        assert!(filter.accept(&RequestUri::parse("http://192.168.0.100:81/test.data")));
        assert!(!filter.accept(&RequestUri::parse("http://192.168.1.100:81/test.data")));
    }

    #[test]
    fn test_zero_prefix_accepts_every_ipv4_address() {
        let filter = IpRangeFilter::new("0.0.0.0/0").unwrap();
        assert!(filter.contains(IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4))));
        assert!(filter.contains(IpAddr::V4(Ipv4Addr::new(255, 255, 255, 255))));
        assert!(!filter.contains(IpAddr::V6(Ipv6Addr::LOCALHOST)));
    }

    #[test]
    fn test_ipv6_range_accept() {
        let filter = IpRangeFilter::new("2001:4860:0:2001::/24").unwrap();
        assert!(filter.accept(&RequestUri::parse("http://[2001:4860:0:2001::68]:81/test.data")));
        assert!(!filter.accept(&RequestUri::parse("http://[3001:4860:0:2001::68]:81/test.data")));
    }

    #[test]
    fn test_family_mismatch_does_not_match() {
        let filter = IpRangeFilter::new("::/0").unwrap();
        assert!(!filter.accept(&RequestUri::parse("http://10.0.0.1/")));
    }

    #[test]
    fn test_missing_host_does_not_match() {
        let filter = IpRangeFilter::new("0.0.0.0/0").unwrap();
        assert!(!filter.accept(&RequestUri::parse("")));
    }
}
