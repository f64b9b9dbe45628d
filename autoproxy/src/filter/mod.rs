//! URI filters used for proxy bypass decisions

pub mod hostname;
pub mod ip_range;
pub mod local;
pub mod whitelist;

pub use hostname::{HostnameFilter, MatchMode};
pub use ip_range::IpRangeFilter;
pub use local::LocalBypassFilter;
pub use whitelist::{parse_whitelist, Whitelist};

use crate::uri::RequestUri;

/// A predicate over request URIs. Filters are immutable once built and
/// `accept` never fails; malformed or host-less URIs are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriFilter {
    Hostname(HostnameFilter),
    IpRange(IpRangeFilter),
    Local(LocalBypassFilter),
}

impl UriFilter {
    pub fn accept(&self, uri: &RequestUri) -> bool {
        match self {
            UriFilter::Hostname(filter) => filter.accept(uri),
            UriFilter::IpRange(filter) => filter.accept(uri),
            UriFilter::Local(filter) => filter.accept(uri),
        }
    }
}

impl From<HostnameFilter> for UriFilter {
    fn from(filter: HostnameFilter) -> Self {
        UriFilter::Hostname(filter)
    }
}

impl From<IpRangeFilter> for UriFilter {
    fn from(filter: IpRangeFilter) -> Self {
        UriFilter::IpRange(filter)
    }
}

impl From<LocalBypassFilter> for UriFilter {
    fn from(filter: LocalBypassFilter) -> Self {
        UriFilter::Local(filter)
    }
}
