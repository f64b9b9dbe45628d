//! Bypass list parsing
//!
//! A bypass list is a string of tokens separated by commas and/or spaces:
//!
//! - `123.12.32.0/24`: anything with a `/` is an IP range
//! - `mynet.*`: trailing `*` matches hosts beginning with `mynet.`
//! - `*.mynet.com`: leading `*` matches hosts ending with `.mynet.com`
//! - `.mynet.com`, `myhost`: bare tokens also match as host suffixes
//! - `<local>`: simple host names without a domain part

use super::{HostnameFilter, IpRangeFilter, LocalBypassFilter, MatchMode, UriFilter};
use crate::uri::RequestUri;

const LOCAL_TOKEN: &str = "<local>";

/// Split a bypass list into filters, keeping the token order.
///
/// Invalid IP ranges and host patterns with more than one wildcard are
/// logged and skipped; the rest of the list is still used.
pub fn parse_whitelist(list: &str) -> Vec<UriFilter> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .filter_map(parse_token)
        .collect()
}

fn parse_token(token: &str) -> Option<UriFilter> {
    if token.contains('/') {
        return match IpRangeFilter::new(token) {
            Ok(filter) => Some(UriFilter::IpRange(filter)),
            Err(e) => {
                tracing::warn!("Skipping bypass entry: {}", e);
                None
            }
        };
    }
    if token.eq_ignore_ascii_case(LOCAL_TOKEN) {
        return Some(UriFilter::Local(LocalBypassFilter));
    }

    let (mode, pattern) = if let Some(prefix) = token.strip_suffix('*') {
        (MatchMode::BeginsWith, prefix)
    } else if let Some(suffix) = token.strip_prefix('*') {
        (MatchMode::EndsWith, suffix)
    } else {
        (MatchMode::EndsWith, token)
    };
    // Only one wildcard at either end is supported
    if pattern.contains('*') {
        tracing::warn!("Skipping bypass entry with unsupported wildcard: {}", token);
        return None;
    }
    Some(UriFilter::Hostname(HostnameFilter::new(mode, pattern)))
}

/// An ordered set of bypass filters; a URI matches if any filter accepts it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    filters: Vec<UriFilter>,
}

impl Whitelist {
    pub fn parse(list: &str) -> Self {
        Self {
            filters: parse_whitelist(list),
        }
    }

    pub fn from_filters(filters: Vec<UriFilter>) -> Self {
        Self { filters }
    }

    /// Add a filter after the existing ones
    pub fn push(&mut self, filter: UriFilter) {
        self.filters.push(filter);
    }

    pub fn matches(&self, uri: &RequestUri) -> bool {
        self.filters.iter().any(|filter| filter.accept(uri))
    }

    pub fn filters(&self) -> &[UriFilter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }
}

impl From<Vec<UriFilter>> for Whitelist {
    fn from(filters: Vec<UriFilter>) -> Self {
        Self::from_filters(filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn hostname(filter: &UriFilter) -> (MatchMode, &str) {
        match filter {
            UriFilter::Hostname(f) => (f.mode(), f.pattern()),
            other => panic!("expected hostname filter, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_mixed_list() {
        let filters =
            parse_whitelist(".mynet.com, *.my-other-net.org, 123.55.23.222, 123.55.23.0/24");
        assert_eq!(filters.len(), 4);

        assert_eq!(hostname(&filters[0]), (MatchMode::EndsWith, ".mynet.com"));
        assert_eq!(hostname(&filters[1]), (MatchMode::EndsWith, ".my-other-net.org"));
        assert_eq!(hostname(&filters[2]), (MatchMode::EndsWith, "123.55.23.222"));
        match &filters[3] {
            UriFilter::IpRange(range) => {
                assert_eq!(range.base_address(), IpAddr::V4(Ipv4Addr::new(123, 55, 23, 0)));
                assert_eq!(range.prefix_len(), 24);
            }
            other => panic!("expected ip range, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_wildcard_is_prefix_match() {
        let filters = parse_whitelist("mynet.*");
        assert_eq!(filters.len(), 1);
        assert_eq!(hostname(&filters[0]), (MatchMode::BeginsWith, "mynet."));
    }

    #[test]
    fn test_wildcard_matching() {
        let suffix = Whitelist::parse("*.mynet.com");
        assert!(suffix.matches(&RequestUri::parse("http://rossi.mynet.com")));
        assert!(!suffix.matches(&RequestUri::parse("http://rossi.mynet.com.test")));

        let prefix = Whitelist::parse("mynet.*");
        assert!(!prefix.matches(&RequestUri::parse("http://rossi.mynet.com")));
        assert!(prefix.matches(&RequestUri::parse("http://mynet.junit.test")));
    }

    #[test]
    fn test_double_wildcard_token() {
        let filters = parse_whitelist("*.mynet.*, www.*.com, .other.invalid");
        assert_eq!(filters.len(), 1);
        assert_eq!(hostname(&filters[0]), (MatchMode::EndsWith, ".other.invalid"));

        let whitelist = Whitelist::parse("*.mynet.*");
        assert!(whitelist.is_empty());
        assert!(!whitelist.matches(&RequestUri::parse("http://www.mynet.com/")));
    }

    #[test]
    fn test_push_appends() {
        let mut whitelist = Whitelist::parse(".mynet.com");
        whitelist.push(UriFilter::Local(LocalBypassFilter));
        assert_eq!(whitelist.len(), 2);
        assert_eq!(whitelist.filters()[1], UriFilter::Local(LocalBypassFilter));
        assert!(whitelist.matches(&RequestUri::parse("http://intranet/")));
    }

    #[test]
    fn test_url_token_is_not_a_pattern() {
        let whitelist = Whitelist::parse("http://10.*.*.*");
        assert!(whitelist.is_empty());
        assert!(!whitelist.matches(&RequestUri::parse("http://10.0.0.1")));
    }

    #[test]
    fn test_separators() {
        let filters = parse_whitelist("  a.invalid,,b.invalid  c.invalid ,\td.invalid ");
        assert_eq!(filters.len(), 4);
        assert!(parse_whitelist("").is_empty());
        assert!(parse_whitelist(" , ,").is_empty());
    }

    #[test]
    fn test_invalid_range_is_skipped() {
        let filters = parse_whitelist("127.0.0.1/33, .mynet.com, www.test.com/8");
        assert_eq!(filters.len(), 1);
        assert_eq!(hostname(&filters[0]), (MatchMode::EndsWith, ".mynet.com"));
    }

    #[test]
    fn test_local_token() {
        let filters = parse_whitelist("<local>;");
        // Only the Windows strategy translates ';' separators
        assert_eq!(filters.len(), 1);
        assert!(matches!(filters[0], UriFilter::Hostname(_)));

        let filters = parse_whitelist("<local>, .mynet.com");
        assert_eq!(filters[0], UriFilter::Local(LocalBypassFilter));
    }

    #[test]
    fn test_whitelist_matches_any() {
        let whitelist = Whitelist::parse("*.local.invalid, 10.0.0.0/8, <local>");
        assert_eq!(whitelist.len(), 3);
        assert!(whitelist.matches(&RequestUri::parse("http://host.local.invalid/")));
        assert!(whitelist.matches(&RequestUri::parse("http://10.1.2.3:8080/")));
        assert!(whitelist.matches(&RequestUri::parse("http://intranet/")));
        assert!(!whitelist.matches(&RequestUri::parse("http://192.0.2.1/")));
        assert!(!whitelist.matches(&RequestUri::parse("")));
    }

    #[test]
    fn test_empty_whitelist_matches_nothing() {
        let whitelist = Whitelist::default();
        assert!(whitelist.is_empty());
        assert!(!whitelist.matches(&RequestUri::parse("http://localhost/")));
    }
}
