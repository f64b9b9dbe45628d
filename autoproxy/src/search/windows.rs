//! Windows Internet Settings, shared by the Windows and Internet Explorer
//! strategies

use super::settings::{command_output, Settings};
use super::with_bypass_list;
use crate::error::Result;
use crate::filter::{LocalBypassFilter, UriFilter, Whitelist};
use crate::proxy::parse_proxy_address;
use crate::selector::{
    parse_proxy_settings, FixedSocksSelector, ProtocolDispatchSelector, ProxyBypassListSelector,
    SharedSelector,
};
use std::sync::Arc;

pub const INTERNET_SETTINGS_KEY: &str =
    r"HKCU\Software\Microsoft\Windows\CurrentVersion\Internet Settings";

const LOCAL_BYPASS: &str = "<local>";

/// Reads the current user's proxy configuration from the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowsStrategy;

impl WindowsStrategy {
    /// `Ok(None)` on other platforms
    pub fn read_settings(&self) -> Result<Option<Settings>> {
        if !cfg!(target_os = "windows") {
            tracing::debug!("Not running on Windows");
            return Ok(None);
        }
        let output = command_output("reg", &["query", INTERNET_SETTINGS_KEY])?;
        Ok(output.map(|text| parse_reg_query(&text)))
    }

    pub fn proxy_selector(&self) -> Result<Option<SharedSelector>> {
        tracing::trace!("Detecting Windows proxy settings");
        Ok(self.read_settings()?.and_then(|settings| selector_from_settings(&settings)))
    }
}

/// Parse `reg query` output into value name/data pairs.
///
/// `REG_DWORD` data is converted from hex to decimal.
pub fn parse_reg_query(text: &str) -> Settings {
    let mut settings = Settings::new();
    for line in text.lines() {
        let mut parts = line.split_whitespace();
        let (Some(name), Some(kind)) = (parts.next(), parts.next()) else {
            continue;
        };
        if !kind.starts_with("REG_") {
            continue;
        }
        let data = parts.collect::<Vec<_>>().join(" ");
        let data = match kind {
            "REG_DWORD" => data
                .strip_prefix("0x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .map(|n| n.to_string())
                .unwrap_or(data),
            _ => data,
        };
        settings.insert(name, data);
    }
    settings
}

/// Build a selector from `ProxyEnable`, `ProxyServer` and `ProxyOverride`.
///
/// Auto-config scripts cannot be evaluated, so `AutoConfigURL` yields no
/// selector. `AutoDetect` is reported and otherwise ignored.
pub fn selector_from_settings(settings: &Settings) -> Option<SharedSelector> {
    if let Some(url) = settings.value("AutoConfigURL") {
        tracing::warn!("Windows uses proxy auto-config script {:?}, which is not supported", url);
        return None;
    }
    if settings.flag("AutoDetect") {
        tracing::warn!(
            "Windows proxy auto-detection (WPAD) is not supported; using manual settings"
        );
    }
    if !settings.flag("ProxyEnable") {
        tracing::debug!("Windows proxy is disabled");
        return None;
    }
    let Some(server) = settings.value("ProxyServer") else {
        tracing::debug!("Windows proxy is enabled but no server is set");
        return None;
    };
    tracing::trace!(
        "Windows uses manual settings: {} with bypass list: {}",
        server,
        settings.value("ProxyOverride").unwrap_or_default()
    );

    let ps: SharedSelector = Arc::new(dispatch_for_proxy_server(server));
    let selector: SharedSelector = match settings.value("ProxyOverride") {
        Some(list) if list == LOCAL_BYPASS => {
            let whitelist = Whitelist::from_filters(vec![UriFilter::Local(LocalBypassFilter)]);
            Arc::new(ProxyBypassListSelector::new(whitelist, ps))
        }
        Some(list) => with_bypass_list(ps, Some(&list.replace(';', ","))),
        None => ps,
    };
    Some(selector)
}

/// `host:port` applies to every scheme; `http=host:port;socks=host:port`
/// names one proxy per scheme
fn dispatch_for_proxy_server(server: &str) -> ProtocolDispatchSelector {
    let mut ps = ProtocolDispatchSelector::new();
    if !server.contains('=') {
        if let Some(selector) = parse_proxy_settings(server) {
            ps.set_fallback_selector(Arc::new(selector));
        }
        return ps;
    }

    for entry in server.split(';') {
        let Some((scheme, address)) = entry.split_once('=') else {
            continue;
        };
        let scheme = scheme.trim().to_ascii_lowercase();
        match scheme.as_str() {
            "socks" => match parse_proxy_address(address) {
                Ok((host, port)) => {
                    ps.set_socks_selector(Arc::new(FixedSocksSelector::new(host, port)))
                }
                Err(e) => tracing::warn!("Ignoring Windows SOCKS proxy: {}", e),
            },
            "http" | "https" | "ftp" | "gopher" => {
                if let Some(selector) = parse_proxy_settings(address) {
                    ps.set_selector(&scheme, Arc::new(selector));
                }
            }
            other => tracing::debug!("Ignoring Windows proxy for unknown scheme {}", other),
        }
    }
    ps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::Proxy;
    use crate::uri::RequestUri;

    fn reg_output(values: &str) -> String {
        format!(
            "\r\nHKEY_CURRENT_USER\\Software\\Microsoft\\Windows\\CurrentVersion\\Internet Settings\r\n\
             \x20   CertificateRevocation    REG_DWORD    0x1\r\n\
             \x20   User Agent    REG_SZ    Mozilla/4.0 (compatible; MSIE 8.0; Win32)\r\n\
             {}\r\n\
             HKEY_CURRENT_USER\\Software\\Microsoft\\Windows\\CurrentVersion\\Internet Settings\\Cache\r\n",
            values
        )
    }

    fn first(selector: &SharedSelector, uri: &str) -> Proxy {
        selector.select(&RequestUri::parse(uri))[0].clone()
    }

    #[test]
    fn test_parse_reg_query() {
        let settings = parse_reg_query(&reg_output(
            "    ProxyEnable    REG_DWORD    0x1\r\n    ProxyServer    REG_SZ    http_proxy.unit-test.invalid:8090",
        ));
        assert_eq!(settings.get("ProxyEnable"), Some("1"));
        assert_eq!(settings.get("ProxyServer"), Some("http_proxy.unit-test.invalid:8090"));
        assert_eq!(settings.get("CertificateRevocation"), Some("1"));
        assert!(
            !settings.contains_key("HKEY_CURRENT_USER\\Software\\Microsoft\\Windows\\CurrentVersion\\Internet")
        );
    }

    #[test]
    fn test_single_proxy_for_all_schemes() {
        let settings = parse_reg_query(&reg_output(
            "    ProxyEnable    REG_DWORD    0x1\r\n    ProxyServer    REG_SZ    http_proxy.unit-test.invalid:8090",
        ));
        let ps = selector_from_settings(&settings).unwrap();
        let http = Proxy::http("http_proxy.unit-test.invalid", 8090);
        assert_eq!(first(&ps, "http://host1.unit-test.invalid/"), http);
        assert_eq!(first(&ps, "https://host1.unit-test.invalid/"), http);
        assert_eq!(first(&ps, "ftp://host1.unit-test.invalid/"), http);
    }

    #[test]
    fn test_per_protocol_proxies() {
        let settings = parse_reg_query(&reg_output(
            "    ProxyEnable    REG_DWORD    0x1\r\n    ProxyServer    REG_SZ    \
             http=http_proxy.unit-test.invalid:8090;https=https_proxy.unit-test.invalid:8091;\
             ftp=ftp_proxy.unit-test.invalid:8092;socks=socks_proxy.unit-test.invalid:8095",
        ));
        let ps = selector_from_settings(&settings).unwrap();
        assert_eq!(
            first(&ps, "http://host1.unit-test.invalid/"),
            Proxy::http("http_proxy.unit-test.invalid", 8090)
        );
        assert_eq!(
            first(&ps, "https://host1.unit-test.invalid/"),
            Proxy::http("https_proxy.unit-test.invalid", 8091)
        );
        assert_eq!(
            first(&ps, "ftp://host1.unit-test.invalid/"),
            Proxy::http("ftp_proxy.unit-test.invalid", 8092)
        );
        assert_eq!(
            first(&ps, "socks://host1.unit-test.invalid/"),
            Proxy::socks("socks_proxy.unit-test.invalid", 8095)
        );
    }

    #[test]
    fn test_override_list() {
        let settings = parse_reg_query(&reg_output(
            "    ProxyEnable    REG_DWORD    0x1\r\n    ProxyServer    REG_SZ    http_proxy.unit-test.invalid:8090\r\n    \
             ProxyOverride    REG_SZ    no_proxy.unit-test.invalid;<local>",
        ));
        let ps = selector_from_settings(&settings).unwrap();
        assert_eq!(first(&ps, "http://no_proxy.unit-test.invalid/"), Proxy::Direct);
        assert_eq!(first(&ps, "http://myhost"), Proxy::Direct);
        assert_eq!(
            first(&ps, "http://host1.unit-test.invalid/"),
            Proxy::http("http_proxy.unit-test.invalid", 8090)
        );
    }

    #[test]
    fn test_local_only_override() {
        let settings = parse_reg_query(&reg_output(
            "    ProxyEnable    REG_DWORD    0x1\r\n    ProxyServer    REG_SZ    http_proxy.unit-test.invalid:8090\r\n    \
             ProxyOverride    REG_SZ    <local>",
        ));
        let ps = selector_from_settings(&settings).unwrap();
        assert_eq!(first(&ps, "http://myhost"), Proxy::Direct);
        assert_eq!(
            first(&ps, "http://host1.unit-test.invalid/"),
            Proxy::http("http_proxy.unit-test.invalid", 8090)
        );
    }

    #[test]
    fn test_disabled_proxy_is_not_applicable() {
        let settings = parse_reg_query(&reg_output(
            "    ProxyEnable    REG_DWORD    0x0\r\n    ProxyServer    REG_SZ    http_proxy.unit-test.invalid:8090",
        ));
        assert!(selector_from_settings(&settings).is_none());
    }

    #[test]
    fn test_auto_config_is_unsupported() {
        let settings = parse_reg_query(&reg_output(
            "    ProxyEnable    REG_DWORD    0x1\r\n    ProxyServer    REG_SZ    http_proxy.unit-test.invalid:8090\r\n    \
             AutoConfigURL    REG_SZ    http://wpad.invalid/proxy.pac",
        ));
        assert!(selector_from_settings(&settings).is_none());
    }
}
