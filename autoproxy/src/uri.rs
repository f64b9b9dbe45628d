//! Request URIs as seen by filters and selectors

use std::fmt;
use std::net::IpAddr;
use url::{Host, Url};

/// A request target. Parsing never fails: input that is not an absolute URL
/// (including the empty string) produces a URI without scheme or host, which
/// no filter accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUri {
    raw: String,
    url: Option<Url>,
}

impl RequestUri {
    pub fn parse(input: &str) -> Self {
        Self {
            raw: input.to_string(),
            url: Url::parse(input.trim()).ok(),
        }
    }

    /// Lower-case scheme, if the input was an absolute URL
    pub fn scheme(&self) -> Option<&str> {
        self.url.as_ref().map(Url::scheme)
    }

    /// Host without IPv6 brackets; `None` for empty or missing hosts
    pub fn host(&self) -> Option<&str> {
        let host = self.url.as_ref()?.host_str()?;
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        (!host.is_empty()).then_some(host)
    }

    /// The host as an IP address when it is written as a literal
    pub fn ip_addr(&self) -> Option<IpAddr> {
        match self.url.as_ref()?.host()? {
            Host::Ipv4(addr) => Some(IpAddr::V4(addr)),
            Host::Ipv6(addr) => Some(IpAddr::V6(addr)),
            // Non-special schemes keep dotted quads as opaque domains
            Host::Domain(domain) => domain.parse().ok(),
        }
    }

    pub fn port(&self) -> Option<u16> {
        self.url.as_ref()?.port_or_known_default()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl From<Url> for RequestUri {
    fn from(url: Url) -> Self {
        Self {
            raw: url.to_string(),
            url: Some(url),
        }
    }
}

impl From<&str> for RequestUri {
    fn from(input: &str) -> Self {
        Self::parse(input)
    }
}

impl fmt::Display for RequestUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
