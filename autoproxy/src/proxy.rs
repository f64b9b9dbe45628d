//! Proxy descriptors and proxy address parsing

use crate::error::FormatError;
use std::fmt;
use std::sync::{Arc, LazyLock};
use url::Url;

/// Port used when a proxy string does not name one
pub const DEFAULT_PROXY_PORT: u16 = 80;

/// How a connection should be made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyKind {
    Direct,
    Http,
    Socks,
}

/// A single proxy choice. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Proxy {
    Direct,
    Http { host: String, port: u16 },
    Socks { host: String, port: u16 },
}

impl Proxy {
    pub fn http(host: impl Into<String>, port: u16) -> Self {
        Proxy::Http {
            host: host.into(),
            port,
        }
    }

    pub fn socks(host: impl Into<String>, port: u16) -> Self {
        Proxy::Socks {
            host: host.into(),
            port,
        }
    }

    pub fn kind(&self) -> ProxyKind {
        match self {
            Proxy::Direct => ProxyKind::Direct,
            Proxy::Http { .. } => ProxyKind::Http,
            Proxy::Socks { .. } => ProxyKind::Socks,
        }
    }

    pub fn host(&self) -> Option<&str> {
        match self {
            Proxy::Direct => None,
            Proxy::Http { host, .. } | Proxy::Socks { host, .. } => Some(host),
        }
    }

    pub fn port(&self) -> Option<u16> {
        match self {
            Proxy::Direct => None,
            Proxy::Http { port, .. } | Proxy::Socks { port, .. } => Some(*port),
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Proxy::Direct)
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Proxy::Direct => write!(f, "DIRECT"),
            Proxy::Http { host, port } => write!(f, "HTTP @ {}:{}", host, port),
            Proxy::Socks { host, port } => write!(f, "SOCKS @ {}:{}", host, port),
        }
    }
}

/// Ordered, non-empty list of proxies; the first entry is preferred
pub type ProxyList = Arc<[Proxy]>;

static NO_PROXY_LIST: LazyLock<ProxyList> = LazyLock::new(|| Arc::from([Proxy::Direct]));

/// The shared list holding only [`Proxy::Direct`]
pub fn no_proxy_list() -> ProxyList {
    Arc::clone(&NO_PROXY_LIST)
}

/// Remove surrounding whitespace and IPv6 brackets from a host
pub fn clean_ipv6(host: &str) -> &str {
    let host = host.trim();
    let host = host.strip_prefix('[').unwrap_or(host);
    host.strip_suffix(']').unwrap_or(host)
}

/// Parse `scheme://host:port/` into host and port.
///
/// The scheme and trailing path are optional; a missing scheme means
/// `http`. The port is [`DEFAULT_PROXY_PORT`] unless written out.
pub fn parse_proxy_address(spec: &str) -> Result<(String, u16), FormatError> {
    let spec = spec.trim();
    let invalid = || FormatError::InvalidProxySpec {
        spec: spec.to_string(),
    };
    if spec.is_empty() {
        return Err(invalid());
    }

    let with_scheme = if spec.contains(":/") {
        spec.to_string()
    } else {
        format!("http://{}", spec)
    };

    let url = Url::parse(&with_scheme).map_err(|_| invalid())?;
    let host = url.host_str().map(clean_ipv6).unwrap_or_default();
    if host.is_empty() {
        return Err(invalid());
    }

    let port = match url.port() {
        Some(port) => port,
        // The url crate drops a port equal to the scheme default, so look
        // for it in the original text before falling back.
        None => match url.port_or_known_default() {
            Some(default) if has_explicit_port(&with_scheme, &url, default) => default,
            _ => DEFAULT_PROXY_PORT,
        },
    };
    if port == 0 {
        return Err(FormatError::InvalidPort {
            value: port.to_string(),
        });
    }

    Ok((host.to_string(), port))
}

fn has_explicit_port(text: &str, url: &Url, port: u16) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    text.to_ascii_lowercase()
        .contains(&format!("{}:{}", host.to_ascii_lowercase(), port))
}
