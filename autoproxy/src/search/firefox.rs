//! Firefox proxy settings from the default profile's `prefs.js`

use super::platform::{home_dir, Platform};
use super::settings::{parse_ini, read_settings_file, Settings};
use super::{desktop, direct, with_bypass_list};
use crate::error::{ProxyError, Result};
use crate::selector::{
    FixedProxySelector, FixedSocksSelector, ProtocolDispatchSelector, SharedSelector,
};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SOURCE: &str = "firefox";

/// `network.proxy.type` value meaning "use the system settings"
const TYPE_SYSTEM: i32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirefoxStrategy {
    profiles_ini: Option<PathBuf>,
}

impl FirefoxStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this `profiles.ini` instead of the platform default
    pub fn with_profiles_ini(path: impl Into<PathBuf>) -> Self {
        Self {
            profiles_ini: Some(path.into()),
        }
    }

    fn profiles_ini(&self) -> Option<PathBuf> {
        self.profiles_ini
            .clone()
            .or_else(|| default_profiles_ini(Platform::current()))
    }

    /// `Ok(None)` when Firefox or its default profile is not installed
    pub fn read_settings(&self) -> Result<Option<Settings>> {
        let Some(ini_path) = self.profiles_ini() else {
            return Ok(None);
        };
        let Some(ini) = read_settings_file(SOURCE, &ini_path)? else {
            tracing::debug!("No Firefox installation found");
            return Ok(None);
        };
        let Some(profile) = default_profile_dir(&ini_path, &ini) else {
            tracing::debug!("Firefox settings folder not found");
            return Ok(None);
        };
        tracing::debug!("Firefox settings folder is {:?}", profile);

        Ok(read_settings_file(SOURCE, &profile.join("prefs.js"))?.map(|prefs| parse_prefs(&prefs)))
    }

    pub fn proxy_selector(&self) -> Result<Option<SharedSelector>> {
        tracing::trace!("Detecting Firefox settings");
        let Some(settings) = self.read_settings()? else {
            return Ok(None);
        };
        selector_from_settings(&settings, desktop::proxy_selector)
    }
}

pub fn default_profiles_ini(platform: Platform) -> Option<PathBuf> {
    match platform {
        Platform::Windows => env::var_os("APPDATA")
            .map(PathBuf::from)
            .map(|appdata| appdata.join("Mozilla").join("Firefox").join("profiles.ini")),
        Platform::MacOs => {
            home_dir().map(|home| home.join("Library/Application Support/Firefox/profiles.ini"))
        }
        _ => home_dir().map(|home| home.join(".mozilla/firefox/profiles.ini")),
    }
}

/// Profile directory to read: the one the current install uses, else the
/// profile marked default, else the one named `default`, else the first
pub fn default_profile_dir(profiles_ini: &Path, text: &str) -> Option<PathBuf> {
    let base = profiles_ini.parent().unwrap_or_else(|| Path::new(""));
    let sections = parse_ini(text);

    let installed = sections
        .iter()
        .filter(|(name, _)| name.starts_with("Install"))
        .find_map(|(_, install)| install.value("Default"));
    if let Some(path) = installed {
        return Some(base.join(path));
    }

    let profiles: Vec<&Settings> = sections
        .iter()
        .filter(|(name, _)| name.starts_with("Profile"))
        .map(|(_, profile)| profile)
        .collect();
    let profile = profiles
        .iter()
        .find(|profile| profile.flag("Default"))
        .or_else(|| profiles.iter().find(|profile| profile.value("Name") == Some("default")))
        .or_else(|| profiles.first())?;

    let path = profile.value("Path")?;
    if profile.value("IsRelative") == Some("0") {
        Some(PathBuf::from(path))
    } else {
        Some(base.join(path))
    }
}

/// Collect `user_pref("network.proxy.*", value);` lines, keyed without the
/// `network.proxy.` prefix
pub fn parse_prefs(text: &str) -> Settings {
    let mut settings = Settings::new();
    for line in text.lines() {
        let Some(body) = line
            .trim()
            .strip_prefix("user_pref(")
            .and_then(|l| l.strip_suffix(");"))
        else {
            continue;
        };
        let Some((key, value)) = body.split_once(',') else {
            continue;
        };
        let Some(key) = key.trim().trim_matches('"').strip_prefix("network.proxy.") else {
            continue;
        };
        settings.insert(key, value.trim().trim_matches('"'));
    }
    settings
}

/// Build a selector from `network.proxy.type`.
///
/// `system` is consulted when Firefox defers to the desktop settings, which
/// is also the default when the preference is absent.
pub fn selector_from_settings(
    settings: &Settings,
    system: impl FnOnce() -> Result<Option<SharedSelector>>,
) -> Result<Option<SharedSelector>> {
    let proxy_type = match settings.value("type") {
        None => TYPE_SYSTEM,
        Some(raw) => raw.parse::<i32>().map_err(|_| ProxyError::SettingsCorrupt {
            source_name: SOURCE,
            reason: format!("invalid network.proxy.type {:?}", raw),
        })?,
    };

    let selector = match proxy_type {
        TYPE_SYSTEM => {
            tracing::trace!("Firefox uses system settings");
            system()?
        }
        0 | 3 => {
            tracing::trace!("Firefox uses no proxy");
            Some(direct())
        }
        1 => {
            tracing::trace!("Firefox uses manual settings");
            Some(manual_selector(settings))
        }
        2 => {
            tracing::warn!(
                "Firefox uses proxy auto-config script {:?}, which is not supported",
                settings.value("autoconfig_url").unwrap_or_default()
            );
            None
        }
        4 => {
            tracing::warn!("Firefox uses WPAD proxy discovery, which is not supported");
            None
        }
        other => {
            tracing::debug!("Unknown Firefox proxy type {}", other);
            None
        }
    };

    Ok(selector.map(|selector| with_bypass_list(selector, settings.value("no_proxies_on"))))
}

fn manual_selector(settings: &Settings) -> SharedSelector {
    let mut ps = ProtocolDispatchSelector::new();

    let http = host_port(settings, "http").map(|(host, port)| -> SharedSelector {
        tracing::trace!("Firefox http proxy is {}:{}", host, port);
        Arc::new(FixedProxySelector::new(host, port))
    });
    if let Some(http) = &http {
        ps.set_selector("http", Arc::clone(http));
    }

    match http {
        Some(http) if settings.flag("share_proxy_settings") => ps.set_fallback_selector(http),
        _ => {
            if let Some((host, port)) = host_port(settings, "ftp") {
                tracing::trace!("Firefox ftp proxy is {}:{}", host, port);
                ps.set_selector("ftp", Arc::new(FixedProxySelector::new(host, port)));
            }
            if let Some((host, port)) = host_port(settings, "ssl") {
                tracing::trace!("Firefox secure proxy is {}:{}", host, port);
                let secure: SharedSelector = Arc::new(FixedProxySelector::new(host, port));
                ps.set_selector("https", Arc::clone(&secure));
                ps.set_selector("sftp", secure);
            }
            if let Some((host, port)) = host_port(settings, "socks") {
                tracing::trace!("Firefox socks proxy is {}:{}", host, port);
                ps.set_socks_selector(Arc::new(FixedSocksSelector::new(host, port)));
            }
        }
    }
    Arc::new(ps)
}

fn host_port<'a>(settings: &'a Settings, key: &str) -> Option<(&'a str, u16)> {
    let host = settings.value(key)?;
    let port = settings.port(&format!("{}_port", key))?;
    Some((host, port))
}
