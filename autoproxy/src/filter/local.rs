//! Filter for simple host names without a domain part

use crate::uri::RequestUri;

/// Accepts hosts that contain no `.`, such as `localhost` or `intranet`.
///
/// This is the Windows `<local>` bypass entry and the macOS
/// "exclude simple hostnames" option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalBypassFilter;

impl LocalBypassFilter {
    pub fn accept(&self, uri: &RequestUri) -> bool {
        uri.host().is_some_and(|host| !host.contains('.'))
    }
}
