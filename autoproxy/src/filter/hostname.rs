//! Hostname prefix/suffix filter

use crate::uri::RequestUri;

/// Where the pattern must appear in the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    BeginsWith,
    EndsWith,
}

/// Matches a URI host against a lower-cased pattern.
///
/// Matching is on raw characters, not labels: `mynet.com` in
/// [`MatchMode::EndsWith`] also accepts `evilmynet.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostnameFilter {
    mode: MatchMode,
    pattern: String,
}

impl HostnameFilter {
    /// `*` is not a pattern character here; any left in `pattern` is dropped
    pub fn new(mode: MatchMode, pattern: &str) -> Self {
        Self {
            mode,
            pattern: pattern.trim().replace('*', "").to_lowercase(),
        }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn accept(&self, uri: &RequestUri) -> bool {
        let Some(host) = uri.host() else {
            return false;
        };
        let host = host.to_lowercase();
        match self.mode {
            MatchMode::BeginsWith => host.starts_with(&self.pattern),
            MatchMode::EndsWith => host.ends_with(&self.pattern),
        }
    }
}
