//! Per-scheme selector dispatch

use super::{NoProxySelector, ProxySelector, SharedSelector};
use crate::proxy::ProxyList;
use crate::uri::RequestUri;
use indexmap::IndexMap;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

/// Chooses a selector by the URI scheme, or the fallback for unknown schemes.
/// Without an explicit fallback, unknown schemes go DIRECT.
#[derive(Debug, Clone)]
pub struct ProtocolDispatchSelector {
    selectors: IndexMap<String, SharedSelector>,
    fallback: Option<SharedSelector>,
}

impl Default for ProtocolDispatchSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolDispatchSelector {
    pub fn new() -> Self {
        Self {
            selectors: IndexMap::new(),
            fallback: None,
        }
    }

    pub fn set_selector(&mut self, scheme: &str, selector: SharedSelector) {
        self.selectors.insert(scheme.to_ascii_lowercase(), selector);
    }

    pub fn get_selector(&self, scheme: &str) -> Option<&SharedSelector> {
        self.selectors.get(&scheme.to_ascii_lowercase())
    }

    pub fn remove_selector(&mut self, scheme: &str) -> Option<SharedSelector> {
        self.selectors.shift_remove(&scheme.to_ascii_lowercase())
    }

    pub fn set_fallback_selector(&mut self, selector: SharedSelector) {
        self.fallback = Some(selector);
    }

    pub fn fallback_selector(&self) -> Option<&SharedSelector> {
        self.fallback.as_ref()
    }

    /// Install a SOCKS selector for the `socks` scheme. It also becomes the
    /// fallback unless one was set already.
    pub fn set_socks_selector(&mut self, selector: SharedSelector) {
        if self.fallback.is_none() {
            self.fallback = Some(Arc::clone(&selector));
        }
        self.set_selector("socks", selector);
    }

    /// Schemes with their own selector, in insertion order
    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.selectors.keys().map(String::as_str)
    }

    /// No scheme selectors and no fallback
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty() && self.fallback.is_none()
    }

    fn selector_for(&self, uri: &RequestUri) -> Option<&SharedSelector> {
        uri.scheme()
            .and_then(|scheme| self.selectors.get(scheme))
            .or(self.fallback.as_ref())
    }
}

impl ProxySelector for ProtocolDispatchSelector {
    fn select(&self, uri: &RequestUri) -> ProxyList {
        match self.selector_for(uri) {
            Some(selector) => selector.select(uri),
            None => NoProxySelector::instance().select(uri),
        }
    }

    fn connect_failed(&self, uri: &RequestUri, addr: SocketAddr, err: &io::Error) {
        if let Some(selector) = self.selector_for(uri) {
            selector.connect_failed(uri, addr, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::Proxy;
    use crate::selector::{FixedProxySelector, FixedSocksSelector};

    const HTTP_PROXY: &str = "http_proxy.unit-test.invalid";
    const SOCKS_PROXY: &str = "socks_proxy.unit-test.invalid";

    fn fixed(host: &str, port: u16) -> SharedSelector {
        Arc::new(FixedProxySelector::new(host, port))
    }

    fn dispatcher() -> ProtocolDispatchSelector {
        let mut ps = ProtocolDispatchSelector::new();
        ps.set_selector("http", fixed(HTTP_PROXY, 8090));
        ps.set_selector("https", fixed("https_proxy.unit-test.invalid", 8091));
        ps.set_selector("ftp", fixed("ftp_proxy.unit-test.invalid", 8092));
        ps
    }

    fn first(ps: &ProtocolDispatchSelector, uri: &str) -> Proxy {
        ps.select(&RequestUri::parse(uri))[0].clone()
    }

    #[test]
    fn test_dispatch_by_scheme() {
        let ps = dispatcher();
        assert_eq!(
            first(&ps, "http://host1.unit-test.invalid/"),
            Proxy::http(HTTP_PROXY, 8090)
        );
        assert_eq!(
            first(&ps, "https://host1.unit-test.invalid/"),
            Proxy::http("https_proxy.unit-test.invalid", 8091)
        );
        assert_eq!(
            first(&ps, "ftp://host1.unit-test.invalid/"),
            Proxy::http("ftp_proxy.unit-test.invalid", 8092)
        );
        assert_eq!(first(&ps, "socket://host1.unit-test.invalid/"), Proxy::Direct);
        assert_eq!(first(&ps, ""), Proxy::Direct);
    }

    #[test]
    fn test_remove() {
        let mut ps = ProtocolDispatchSelector::new();
        let selector = fixed(HTTP_PROXY, 8090);
        ps.set_selector("HTTP", Arc::clone(&selector));
        assert!(Arc::ptr_eq(ps.get_selector("http").unwrap(), &selector));
        assert!(ps.remove_selector("http").is_some());
        assert!(ps.get_selector("http").is_none());
        assert!(ps.is_empty());
    }

    #[test]
    fn test_fallback() {
        let mut ps = ProtocolDispatchSelector::new();
        assert!(ps.fallback_selector().is_none());

        let fallback = fixed(HTTP_PROXY, 8090);
        ps.set_fallback_selector(Arc::clone(&fallback));
        assert!(Arc::ptr_eq(ps.fallback_selector().unwrap(), &fallback));
        assert!(!ps.is_empty());
        assert_eq!(
            first(&ps, "http://host1.unit-test.invalid/"),
            Proxy::http(HTTP_PROXY, 8090)
        );
    }

    #[test]
    fn test_socks_becomes_fallback() {
        let mut ps = dispatcher();
        ps.set_socks_selector(Arc::new(FixedSocksSelector::new(SOCKS_PROXY, 8095)));
        let socks = Proxy::socks(SOCKS_PROXY, 8095);
        assert_eq!(first(&ps, "socks://host1.unit-test.invalid/"), socks);
        assert_eq!(first(&ps, "socket://host1.unit-test.invalid/"), socks);

        let mut ps = ProtocolDispatchSelector::new();
        let fallback = fixed(HTTP_PROXY, 8090);
        ps.set_fallback_selector(Arc::clone(&fallback));
        ps.set_socks_selector(Arc::new(FixedSocksSelector::new(SOCKS_PROXY, 8095)));
        assert!(Arc::ptr_eq(ps.fallback_selector().unwrap(), &fallback));
        assert_eq!(
            first(&ps, "socket://host1.unit-test.invalid/"),
            Proxy::http(HTTP_PROXY, 8090)
        );
    }

    #[test]
    fn test_schemes_keep_insertion_order() {
        let ps = dispatcher();
        assert_eq!(ps.schemes().collect::<Vec<_>>(), vec!["http", "https", "ftp"]);
    }
}
