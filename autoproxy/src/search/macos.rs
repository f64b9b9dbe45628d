//! macOS proxy settings via `scutil --proxy`

use super::settings::{command_output, Settings};
use super::with_bypass_list;
use crate::error::Result;
use crate::filter::{LocalBypassFilter, UriFilter, Whitelist};
use crate::selector::{
    FixedProxySelector, FixedSocksSelector, ProtocolDispatchSelector, ProxyBypassListSelector,
    SharedSelector,
};
use std::sync::Arc;

const PROTOCOLS: [(&str, &str); 5] = [
    ("HTTP", "http"),
    ("HTTPS", "https"),
    ("FTP", "ftp"),
    ("Gopher", "gopher"),
    ("RTSP", "rtsp"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MacOsStrategy;

impl MacOsStrategy {
    /// `Ok(None)` on other platforms
    pub fn read_settings(&self) -> Result<Option<Settings>> {
        if !cfg!(target_os = "macos") {
            tracing::debug!("Not running on macOS");
            return Ok(None);
        }
        Ok(command_output("scutil", &["--proxy"])?.map(|text| parse_scutil(&text)))
    }

    pub fn proxy_selector(&self) -> Result<Option<SharedSelector>> {
        tracing::trace!("Detecting macOS proxy settings");
        Ok(self.read_settings()?.and_then(|settings| selector_from_settings(&settings)))
    }
}

/// Parse the top-level keys of the `scutil --proxy` dictionary.
///
/// Arrays such as `ExceptionsList` become comma separated lists. Nested
/// dictionaries (per-interface `__SCOPED__` settings) are skipped.
pub fn parse_scutil(text: &str) -> Settings {
    let mut settings = Settings::new();
    let mut depth = 0usize;
    let mut array: Option<(String, Vec<String>)> = None;

    for line in text.lines() {
        let line = line.trim();
        if line == "}" {
            depth = depth.saturating_sub(1);
            if depth == 1 {
                if let Some((key, items)) = array.take() {
                    settings.insert(key, items.join(","));
                }
            }
            continue;
        }

        let opens = line.ends_with('{');
        match line.split_once(" : ").map(|(k, v)| (k.trim(), v.trim())) {
            Some((key, value)) if depth == 1 => {
                if opens && value.starts_with("<array>") {
                    array = Some((key.to_string(), Vec::new()));
                } else if !opens {
                    settings.insert(key, value);
                }
            }
            Some((_, value)) if depth == 2 && !opens => {
                if let Some((_, items)) = array.as_mut() {
                    items.push(value.to_string());
                }
            }
            _ => {}
        }
        if opens {
            depth += 1;
        }
    }
    settings
}

/// A dispatcher over the enabled protocols, wrapped in the exception list.
/// Nothing enabled means DIRECT for every scheme.
pub fn selector_from_settings(settings: &Settings) -> Option<SharedSelector> {
    if settings.flag("ProxyAutoConfigEnable") {
        tracing::warn!(
            "macOS uses proxy auto-config script {:?}, which is not supported",
            settings.value("ProxyAutoConfigURLString").unwrap_or_default()
        );
        return None;
    }
    if settings.flag("ProxyAutoDiscoveryEnable") {
        tracing::warn!("macOS proxy auto-discovery (WPAD) is not supported; using manual settings");
    }

    let mut ps = ProtocolDispatchSelector::new();
    for (prefix, scheme) in PROTOCOLS {
        if let Some((host, port)) = enabled_proxy(settings, prefix) {
            tracing::trace!("macOS uses {}:{} for {}", host, port, scheme);
            ps.set_selector(scheme, Arc::new(FixedProxySelector::new(host, port)));
        }
    }
    if let Some((host, port)) = enabled_proxy(settings, "SOCKS") {
        tracing::trace!("macOS socks proxy is {}:{}", host, port);
        ps.set_socks_selector(Arc::new(FixedSocksSelector::new(host, port)));
    }

    let mut selector = with_bypass_list(Arc::new(ps), settings.value("ExceptionsList"));
    if settings.flag("ExcludeSimpleHostnames") {
        let whitelist = Whitelist::from_filters(vec![UriFilter::Local(LocalBypassFilter)]);
        selector = Arc::new(ProxyBypassListSelector::new(whitelist, selector));
    }
    Some(selector)
}

fn enabled_proxy<'a>(settings: &'a Settings, prefix: &str) -> Option<(&'a str, u16)> {
    if !settings.flag(&format!("{}Enable", prefix)) {
        return None;
    }
    let host = settings.value(&format!("{}Proxy", prefix))?;
    let port = settings.port(&format!("{}Port", prefix))?;
    Some((host, port))
}
