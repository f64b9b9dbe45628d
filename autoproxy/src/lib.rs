//! Proxy discovery and whitelist-based proxy selection
//!
//! Discovery strategies read the user's proxy settings from the desktop,
//! the browser or the environment and turn them into a [`ProxySelector`].
//! A selector maps each request URI to the proxies to try, sending hosts
//! that match a bypass whitelist direct.

pub mod config;
pub mod error;
pub mod filter;
pub mod proxy;
pub mod search;
pub mod selector;
pub mod uri;

// Re-export commonly used types
pub use config::{Config, ConfigLoader, ConfigValidator, ManualConfig};
pub use error::{FormatError, ProxyError, Result, ValidationError};
pub use filter::{
    HostnameFilter, IpRangeFilter, LocalBypassFilter, MatchMode, UriFilter, Whitelist,
};
pub use proxy::{Proxy, ProxyKind, ProxyList};
pub use search::{ProxySearch, SearchStrategy, StrategyKind};
pub use selector::{
    parse_proxy_settings, resolve, FixedProxySelector, FixedSocksSelector, NoProxySelector,
    ProtocolDispatchSelector, ProxyBypassListSelector, ProxySelector, SharedSelector,
    UseProxyWhiteListSelector,
};
pub use uri::RequestUri;
