//! Bypass list handling
//!
//! [`resolve`] is the decision procedure: a URI accepted by the bypass list
//! goes DIRECT, anything else is passed on to the configured selector.

use super::{ProxySelector, SharedSelector};
use crate::filter::Whitelist;
use crate::proxy::{no_proxy_list, ProxyList};
use crate::uri::RequestUri;
use std::io;
use std::net::SocketAddr;

/// DIRECT if any filter in `whitelist` accepts `uri`, otherwise whatever
/// `selector` returns. An empty whitelist always defers to `selector`.
pub fn resolve(uri: &RequestUri, whitelist: &Whitelist, selector: &dyn ProxySelector) -> ProxyList {
    if whitelist.matches(uri) {
        tracing::trace!("{} is on the bypass list", uri);
        return no_proxy_list();
    }
    selector.select(uri)
}

/// Sends URIs on the bypass list DIRECT and the rest to a delegate
#[derive(Debug, Clone)]
pub struct ProxyBypassListSelector {
    whitelist: Whitelist,
    delegate: SharedSelector,
}

impl ProxyBypassListSelector {
    pub fn new(whitelist: Whitelist, delegate: SharedSelector) -> Self {
        Self { whitelist, delegate }
    }

    /// Build from a comma/space separated bypass list
    pub fn parse(list: &str, delegate: SharedSelector) -> Self {
        Self::new(Whitelist::parse(list), delegate)
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    pub fn delegate(&self) -> &SharedSelector {
        &self.delegate
    }
}

impl ProxySelector for ProxyBypassListSelector {
    fn select(&self, uri: &RequestUri) -> ProxyList {
        resolve(uri, &self.whitelist, self.delegate.as_ref())
    }

    fn connect_failed(&self, uri: &RequestUri, addr: SocketAddr, err: &io::Error) {
        self.delegate.connect_failed(uri, addr, err);
    }
}

/// The inverse of [`ProxyBypassListSelector`]: only URIs on the list use the
/// delegate, everything else goes DIRECT
#[derive(Debug, Clone)]
pub struct UseProxyWhiteListSelector {
    whitelist: Whitelist,
    delegate: SharedSelector,
}

impl UseProxyWhiteListSelector {
    pub fn new(whitelist: Whitelist, delegate: SharedSelector) -> Self {
        Self { whitelist, delegate }
    }

    pub fn parse(list: &str, delegate: SharedSelector) -> Self {
        Self::new(Whitelist::parse(list), delegate)
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }
}

impl ProxySelector for UseProxyWhiteListSelector {
    fn select(&self, uri: &RequestUri) -> ProxyList {
        if self.whitelist.matches(uri) {
            self.delegate.select(uri)
        } else {
            no_proxy_list()
        }
    }

    fn connect_failed(&self, uri: &RequestUri, addr: SocketAddr, err: &io::Error) {
        self.delegate.connect_failed(uri, addr, err);
    }
}
