//! KDE proxy settings from `kioslaverc`

use super::env::{self as env_strategy, EnvStrategy};
use super::platform::home_dir;
use super::settings::{parse_ini, read_settings_file, Settings};
use super::{direct, with_bypass_list};
use crate::error::{ProxyError, Result};
use crate::proxy::parse_proxy_address;
use crate::selector::{
    parse_proxy_settings, FixedSocksSelector, ProtocolDispatchSelector, SharedSelector,
    UseProxyWhiteListSelector,
};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

const SOURCE: &str = "kde";
const SECTION: &str = "Proxy Settings";

/// Reads the `[Proxy Settings]` section of `kioslaverc`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KdeStrategy {
    settings_file: Option<PathBuf>,
}

impl KdeStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this file instead of searching the usual locations
    pub fn with_settings_file(path: impl Into<PathBuf>) -> Self {
        Self {
            settings_file: Some(path.into()),
        }
    }

    fn settings_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.settings_file {
            return Some(path.clone());
        }
        candidate_files(|name| env::var(name).ok(), home_dir())
            .into_iter()
            .inspect(|path| tracing::trace!("Searching KDE settings in {:?}", path))
            .find(|path| path.exists())
    }

    /// `Ok(None)` when no settings file exists
    pub fn read_settings(&self) -> Result<Option<Settings>> {
        let Some(path) = self.settings_file() else {
            tracing::debug!("No KDE settings file found");
            return Ok(None);
        };
        let Some(text) = read_settings_file(SOURCE, &path)? else {
            return Ok(None);
        };
        Ok(Some(parse_ini(&text).shift_remove(SECTION).unwrap_or_default()))
    }

    pub fn proxy_selector(&self) -> Result<Option<SharedSelector>> {
        tracing::trace!("Detecting KDE proxy settings");
        let Some(settings) = self.read_settings()? else {
            return Ok(None);
        };
        selector_from_settings(&settings, |name| env::var(name).ok())
    }
}

/// Places KDE keeps `kioslaverc`, most recent layout first
pub fn candidate_files(
    var: impl Fn(&str) -> Option<String>,
    home: Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut files = Vec::new();
    match var("XDG_CONFIG_HOME").filter(|xdg| !xdg.is_empty()) {
        Some(xdg) => files.push(PathBuf::from(xdg).join("kioslaverc")),
        None => {
            if let Some(home) = &home {
                files.push(home.join(".config/kioslaverc"));
            }
        }
    }
    if let Some(home) = home {
        if var("KDE_SESSION_VERSION").as_deref() == Some("4") {
            files.push(home.join(".kde4/share/config/kioslaverc"));
        }
        files.push(home.join(".kde/share/config/kioslaverc"));
    }
    files
}

/// Build a selector from the `ProxyType` mode.
///
/// `var` resolves environment variables for mode 4, where the proxy keys
/// name variables instead of holding addresses.
pub fn selector_from_settings(
    settings: &Settings,
    var: impl Fn(&str) -> Option<String>,
) -> Result<Option<SharedSelector>> {
    let Some(raw) = settings.value("ProxyType") else {
        tracing::debug!("KDE settings have no ProxyType");
        return Ok(None);
    };
    let proxy_type: i32 = raw.parse().map_err(|_| ProxyError::SettingsCorrupt {
        source_name: SOURCE,
        reason: format!("invalid ProxyType {:?}", raw),
    })?;

    let selector = match proxy_type {
        0 => {
            tracing::trace!("KDE uses no proxy");
            Some(direct())
        }
        1 => {
            tracing::trace!("KDE uses manual proxy settings");
            manual_selector(settings)
        }
        2 => {
            tracing::warn!(
                "KDE uses proxy auto-config script {:?}, which is not supported",
                settings.value("Proxy Config Script").unwrap_or_default()
            );
            None
        }
        3 => {
            tracing::warn!("KDE uses WPAD proxy discovery, which is not supported");
            None
        }
        4 => {
            tracing::trace!("KDE reads the proxy from environment variables");
            let strategy = EnvStrategy::with_names(
                settings.value("httpProxy").unwrap_or_default(),
                settings.value("httpsProxy").unwrap_or_default(),
                settings.value("ftpProxy").unwrap_or_default(),
                settings.value("NoProxyFor").unwrap_or_default(),
            );
            env_strategy::selector_from_settings(&strategy.read_settings(var))
        }
        other => {
            tracing::debug!("Unknown KDE ProxyType {}", other);
            None
        }
    };
    Ok(selector)
}

fn manual_selector(settings: &Settings) -> Option<SharedSelector> {
    let mut ps = ProtocolDispatchSelector::new();
    for (key, scheme) in [("httpProxy", "http"), ("httpsProxy", "https"), ("ftpProxy", "ftp")] {
        let Some(value) = settings.value(key) else {
            continue;
        };
        if let Some(selector) = parse_proxy_settings(&join_port(value)) {
            tracing::trace!("KDE {} proxy is {}", scheme, selector.proxy());
            ps.set_selector(scheme, Arc::new(selector));
        }
    }
    if let Some(value) = settings.value("socksProxy") {
        match parse_proxy_address(&join_port(value)) {
            Ok((host, port)) => {
                ps.set_socks_selector(Arc::new(FixedSocksSelector::new(host, port)))
            }
            Err(e) => tracing::warn!("Ignoring KDE SOCKS proxy: {}", e),
        }
    }
    if ps.is_empty() {
        tracing::debug!("KDE manual mode without any proxy");
        return None;
    }

    let ps: SharedSelector = Arc::new(ps);
    let selector: SharedSelector = match settings.value("NoProxyFor") {
        Some(list) if settings.flag("ReversedException") => {
            tracing::trace!("KDE uses the proxy only for {}", list);
            Arc::new(UseProxyWhiteListSelector::parse(list, ps))
        }
        list => with_bypass_list(ps, list),
    };
    Some(selector)
}

/// KDE stores `http://host 8080`; rewrite it as `http://host:8080`
fn join_port(value: &str) -> String {
    match value.rsplit_once(char::is_whitespace) {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{}:{}", host.trim_end().trim_end_matches('/'), port)
        }
        _ => value.to_string(),
    }
}
