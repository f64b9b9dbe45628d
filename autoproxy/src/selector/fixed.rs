//! Selectors that always return the same proxy

use super::ProxySelector;
use crate::error::FormatError;
use crate::proxy::{parse_proxy_address, Proxy, ProxyList};
use crate::uri::RequestUri;
use std::sync::Arc;

/// Always returns one HTTP proxy, whatever the URI's scheme
#[derive(Debug, Clone)]
pub struct FixedProxySelector {
    proxies: ProxyList,
}

impl FixedProxySelector {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::from_proxy(Proxy::http(host, port))
    }

    pub fn from_proxy(proxy: Proxy) -> Self {
        Self {
            proxies: Arc::from([proxy]),
        }
    }

    pub fn proxy(&self) -> &Proxy {
        &self.proxies[0]
    }
}

impl ProxySelector for FixedProxySelector {
    fn select(&self, _uri: &RequestUri) -> ProxyList {
        Arc::clone(&self.proxies)
    }
}

/// Always returns one SOCKS proxy
#[derive(Debug, Clone)]
pub struct FixedSocksSelector {
    proxies: ProxyList,
}

impl FixedSocksSelector {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            proxies: Arc::from([Proxy::socks(host, port)]),
        }
    }

    pub fn proxy(&self) -> &Proxy {
        &self.proxies[0]
    }
}

impl ProxySelector for FixedSocksSelector {
    fn select(&self, _uri: &RequestUri) -> ProxyList {
        Arc::clone(&self.proxies)
    }
}

/// Build an HTTP selector from `scheme://host:port/`, failing on malformed
/// input
pub fn try_parse_proxy_settings(spec: &str) -> Result<FixedProxySelector, FormatError> {
    let (host, port) = parse_proxy_address(spec)?;
    Ok(FixedProxySelector::new(host, port))
}

/// Lenient form of [`try_parse_proxy_settings`]: empty input gives `None`
/// silently, malformed input gives `None` with a warning.
pub fn parse_proxy_settings(spec: &str) -> Option<FixedProxySelector> {
    if spec.trim().is_empty() {
        return None;
    }
    match try_parse_proxy_settings(spec) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!("Ignoring proxy setting: {}", e);
            None
        }
    }
}
