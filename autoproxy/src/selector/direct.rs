//! The DIRECT selector

use super::ProxySelector;
use crate::proxy::{no_proxy_list, ProxyList};
use crate::uri::RequestUri;
use std::sync::{Arc, LazyLock};

static INSTANCE: LazyLock<Arc<NoProxySelector>> =
    LazyLock::new(|| Arc::new(NoProxySelector { _private: () }));

/// Always answers DIRECT. There is one process-wide instance, created on
/// first use.
#[derive(Debug)]
pub struct NoProxySelector {
    _private: (),
}

impl NoProxySelector {
    pub fn instance() -> Arc<NoProxySelector> {
        Arc::clone(&INSTANCE)
    }
}

impl ProxySelector for NoProxySelector {
    fn select(&self, _uri: &RequestUri) -> ProxyList {
        no_proxy_list()
    }
}
