//! GNOME proxy settings via `gsettings`

use super::settings::{command_output, Settings};
use super::{direct, with_bypass_list};
use crate::error::Result;
use crate::selector::{
    FixedProxySelector, FixedSocksSelector, ProtocolDispatchSelector, SharedSelector,
};
use std::sync::Arc;

const SCHEMA: &str = "org.gnome.system.proxy";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GnomeStrategy;

impl GnomeStrategy {
    /// `Ok(None)` when `gsettings` is not installed
    pub fn read_settings(&self) -> Result<Option<Settings>> {
        let output = command_output("gsettings", &["list-recursively", SCHEMA])?;
        Ok(output.map(|text| parse_gsettings(&text)))
    }

    pub fn proxy_selector(&self) -> Result<Option<SharedSelector>> {
        tracing::trace!("Detecting GNOME proxy settings");
        Ok(self.read_settings()?.and_then(|settings| selector_from_settings(&settings)))
    }
}

/// Parse `gsettings list-recursively` output.
///
/// Keys are relative to `org.gnome.system.proxy`: `mode`, `ignore-hosts`,
/// `http.host`, `http.port` and so on. Quotes are removed and string arrays
/// become comma separated lists.
pub fn parse_gsettings(text: &str) -> Settings {
    let mut settings = Settings::new();
    for line in text.lines() {
        let mut parts = line.trim().splitn(3, ' ');
        let (Some(schema), Some(key)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Some(child) = schema.strip_prefix(SCHEMA) else {
            continue;
        };
        let key = match child.strip_prefix('.') {
            Some(child) => format!("{}.{}", child, key),
            None => key.to_string(),
        };
        settings.insert(key, clean_value(parts.next().unwrap_or_default()));
    }
    settings
}

fn clean_value(raw: &str) -> String {
    let value = raw.trim();
    let value = value.strip_prefix("@as ").unwrap_or(value);
    match value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        Some(items) => items
            .split(',')
            .map(|item| item.trim().trim_matches('\''))
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(","),
        None => value.trim_matches('\'').to_string(),
    }
}

/// Build a selector from the `mode` key; without it the legacy
/// `http.enabled` flag decides
pub fn selector_from_settings(settings: &Settings) -> Option<SharedSelector> {
    let mode = match settings.value("mode") {
        Some(mode) => mode,
        None if settings.flag("http.enabled") => "manual",
        None if settings.contains_key("http.enabled") => "none",
        None => return None,
    };
    tracing::trace!("GNOME proxy mode is {}", mode);

    let selector = match mode {
        "none" => Some(direct()),
        "manual" => manual_selector(settings),
        "auto" => {
            tracing::warn!(
                "GNOME uses proxy auto-config script {:?}, which is not supported",
                settings.value("autoconfig-url").unwrap_or_default()
            );
            None
        }
        other => {
            tracing::debug!("Unknown GNOME proxy mode {}", other);
            None
        }
    }?;
    Some(with_bypass_list(selector, settings.value("ignore-hosts")))
}

fn manual_selector(settings: &Settings) -> Option<SharedSelector> {
    let mut ps = ProtocolDispatchSelector::new();

    let http = host_port(settings, "http").map(|(host, port)| -> SharedSelector {
        tracing::trace!("GNOME http proxy is {}:{}", host, port);
        Arc::new(FixedProxySelector::new(host, port))
    });
    if let Some(http) = &http {
        ps.set_selector("http", Arc::clone(http));
    }

    match http {
        Some(http) if settings.flag("use-same-proxy") => ps.set_fallback_selector(http),
        _ => {
            if let Some((host, port)) = host_port(settings, "https") {
                tracing::trace!("GNOME secure proxy is {}:{}", host, port);
                let secure: SharedSelector = Arc::new(FixedProxySelector::new(host, port));
                ps.set_selector("https", Arc::clone(&secure));
                ps.set_selector("sftp", secure);
            }
            if let Some((host, port)) = host_port(settings, "ftp") {
                tracing::trace!("GNOME ftp proxy is {}:{}", host, port);
                ps.set_selector("ftp", Arc::new(FixedProxySelector::new(host, port)));
            }
            if let Some((host, port)) = host_port(settings, "socks") {
                tracing::trace!("GNOME socks proxy is {}:{}", host, port);
                ps.set_socks_selector(Arc::new(FixedSocksSelector::new(host, port)));
            }
        }
    }

    if ps.is_empty() {
        tracing::debug!("GNOME manual mode without any proxy");
        return None;
    }
    Some(Arc::new(ps))
}

fn host_port<'a>(settings: &'a Settings, protocol: &str) -> Option<(&'a str, u16)> {
    let host = settings.value(&format!("{}.host", protocol))?;
    let port = settings.port(&format!("{}.port", protocol))?;
    Some((host, port))
}
