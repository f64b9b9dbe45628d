//! Proxies written out in the `[manual]` section of the configuration

use super::with_bypass_list;
use crate::config::ManualConfig;
use crate::error::Result;
use crate::proxy::parse_proxy_address;
use crate::selector::{
    try_parse_proxy_settings, FixedSocksSelector, ProtocolDispatchSelector, SharedSelector,
};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualStrategy {
    config: ManualConfig,
}

impl ManualStrategy {
    pub fn new(config: ManualConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ManualConfig {
        &self.config
    }

    /// `https` falls back to the `http` proxy. A malformed proxy string is a
    /// configuration error rather than something to skip.
    pub fn proxy_selector(&self) -> Result<Option<SharedSelector>> {
        let mut ps = ProtocolDispatchSelector::new();

        let http = match non_empty(&self.config.http) {
            Some(spec) => Some(Arc::new(try_parse_proxy_settings(spec)?) as SharedSelector),
            None => None,
        };
        if let Some(http) = &http {
            ps.set_selector("http", Arc::clone(http));
        }

        match non_empty(&self.config.https) {
            Some(spec) => ps.set_selector("https", Arc::new(try_parse_proxy_settings(spec)?)),
            None => {
                if let Some(http) = http {
                    ps.set_selector("https", http);
                }
            }
        }

        if let Some(spec) = non_empty(&self.config.ftp) {
            ps.set_selector("ftp", Arc::new(try_parse_proxy_settings(spec)?));
        }

        if let Some(spec) = non_empty(&self.config.socks) {
            let (host, port) = parse_proxy_address(spec)?;
            ps.set_socks_selector(Arc::new(FixedSocksSelector::new(host, port)));
        }

        if ps.is_empty() {
            tracing::debug!("No manual proxies configured");
            return Ok(None);
        }

        Ok(Some(with_bypass_list(
            Arc::new(ps),
            non_empty(&self.config.no_proxy),
        )))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
