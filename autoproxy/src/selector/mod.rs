//! Proxy selectors
//!
//! A selector maps a request URI to the proxies a client should try, in
//! order. Selectors are built once from discovered settings and are
//! read-only afterwards, so they can be shared freely between threads.

pub mod bypass;
pub mod direct;
pub mod dispatch;
pub mod fixed;

pub use bypass::{resolve, ProxyBypassListSelector, UseProxyWhiteListSelector};
pub use direct::NoProxySelector;
pub use dispatch::ProtocolDispatchSelector;
pub use fixed::{
    parse_proxy_settings, try_parse_proxy_settings, FixedProxySelector, FixedSocksSelector,
};

use crate::proxy::ProxyList;
use crate::uri::RequestUri;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

/// Selection contract consumed by HTTP and SOCKS clients
pub trait ProxySelector: Send + Sync + fmt::Debug {
    /// Proxies to try for `uri`, most preferred first.
    ///
    /// Never empty and never fails; when nothing applies the result is
    /// [`crate::proxy::no_proxy_list`].
    fn select(&self, uri: &RequestUri) -> ProxyList;

    /// Called by clients when connecting through a selected proxy failed
    fn connect_failed(&self, _uri: &RequestUri, _addr: SocketAddr, _err: &io::Error) {}
}

/// A selector shared between the search result and its wrappers
pub type SharedSelector = Arc<dyn ProxySelector>;
