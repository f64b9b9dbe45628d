//! Proxy settings from environment variables

use super::settings::Settings;
use super::with_bypass_list;
use crate::selector::{parse_proxy_settings, ProtocolDispatchSelector, SharedSelector};
use std::env;
use std::sync::Arc;

/// Reads `http_proxy`, `https_proxy`, `ftp_proxy` and `no_proxy`.
///
/// Each variable is looked up as written and then in upper case.
/// The variable names can be replaced, which KDE uses to point at
/// variables of its own choosing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvStrategy {
    http_var: String,
    https_var: String,
    ftp_var: String,
    no_proxy_var: String,
}

impl Default for EnvStrategy {
    fn default() -> Self {
        Self::with_names("http_proxy", "https_proxy", "ftp_proxy", "no_proxy")
    }
}

impl EnvStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_names(http: &str, https: &str, ftp: &str, no_proxy: &str) -> Self {
        Self {
            http_var: http.trim().to_string(),
            https_var: https.trim().to_string(),
            ftp_var: ftp.trim().to_string(),
            no_proxy_var: no_proxy.trim().to_string(),
        }
    }

    /// Collect the variables as `http`, `https`, `ftp` and `no_proxy`
    pub fn read_settings(&self, var: impl Fn(&str) -> Option<String>) -> Settings {
        let mut settings = Settings::new();
        for (key, name) in [
            ("http", &self.http_var),
            ("https", &self.https_var),
            ("ftp", &self.ftp_var),
            ("no_proxy", &self.no_proxy_var),
        ] {
            if name.is_empty() {
                continue;
            }
            if let Some(value) = var(name).or_else(|| var(&name.to_uppercase())) {
                settings.insert(key, value);
            }
        }
        settings
    }

    pub fn proxy_selector(&self) -> Option<SharedSelector> {
        tracing::trace!("Inspecting environment variables");
        selector_from_settings(&self.read_settings(|name| env::var(name).ok()))
    }
}

/// An HTTP proxy is required. HTTPS falls back to it, FTP is optional and
/// `no_proxy` becomes a bypass list.
pub fn selector_from_settings(settings: &Settings) -> Option<SharedSelector> {
    let http: SharedSelector = Arc::new(settings.value("http").and_then(parse_proxy_settings)?);
    tracing::trace!("HTTP proxy is {}", settings.value("http").unwrap_or_default());

    let mut ps = ProtocolDispatchSelector::new();
    ps.set_selector("http", Arc::clone(&http));

    let https: SharedSelector = match settings.value("https").and_then(parse_proxy_settings) {
        Some(selector) => Arc::new(selector),
        None => Arc::clone(&http),
    };
    ps.set_selector("https", https);

    if let Some(ftp) = settings.value("ftp").and_then(parse_proxy_settings) {
        tracing::trace!("FTP proxy is {}", ftp.proxy());
        ps.set_selector("ftp", Arc::new(ftp));
    }

    Some(with_bypass_list(Arc::new(ps), settings.value("no_proxy")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::Proxy;
    use crate::uri::RequestUri;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn first(selector: &SharedSelector, uri: &str) -> Proxy {
        selector.select(&RequestUri::parse(uri))[0].clone()
    }

    #[test]
    fn test_no_http_proxy_means_not_applicable() {
        let strategy = EnvStrategy::new();
        let env = env_of(&[("https_proxy", "https_proxy.unit-test.invalid:8091")]);
        let settings = strategy.read_settings(env);
        assert!(selector_from_settings(&settings).is_none());
    }

    #[test]
    fn test_per_protocol_variables() {
        let strategy = EnvStrategy::new();
        let settings = strategy.read_settings(env_of(&[
            ("http_proxy", "http://http_proxy.unit-test.invalid:8090/"),
            ("https_proxy", "http://https_proxy.unit-test.invalid:8091/"),
            ("ftp_proxy", "http://ftp_proxy.unit-test.invalid:8092/"),
        ]));
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
        assert_eq!(first(&ps, "socks://host1.unit-test.invalid/"), Proxy::Direct);
    }

    #[test]
    fn test_https_falls_back_to_http() {
        let env = env_of(&[("HTTP_PROXY", "http_proxy.unit-test.invalid:8090")]);
        let settings = EnvStrategy::new().read_settings(env);
        let ps = selector_from_settings(&settings).unwrap();
        assert_eq!(
            first(&ps, "https://host1.unit-test.invalid/"),
            Proxy::http("http_proxy.unit-test.invalid", 8090)
        );
    }

    #[test]
    fn test_lower_case_wins() {
        let settings = EnvStrategy::new().read_settings(env_of(&[
            ("http_proxy", "lower.invalid:1"),
            ("HTTP_PROXY", "upper.invalid:2"),
        ]));
        assert_eq!(settings.get("http"), Some("lower.invalid:1"));
    }

    #[test]
    fn test_no_proxy_wraps_result() {
        let settings = EnvStrategy::new().read_settings(env_of(&[
            ("http_proxy", "http_proxy.unit-test.invalid:8090"),
            ("no_proxy", "no_proxy.unit-test.invalid, localhost"),
        ]));
        let ps = selector_from_settings(&settings).unwrap();
        assert_eq!(first(&ps, "http://no_proxy.unit-test.invalid/"), Proxy::Direct);
        assert_eq!(
            first(&ps, "http://host1.unit-test.invalid/"),
            Proxy::http("http_proxy.unit-test.invalid", 8090)
        );
    }

    #[test]
    fn test_custom_variable_names() {
        let strategy = EnvStrategy::with_names("MY_HTTP", "", "", "MY_NO_PROXY");
        let settings = strategy.read_settings(env_of(&[
            ("MY_HTTP", "custom.invalid:3128"),
            ("http_proxy", "ignored.invalid:1"),
        ]));
        assert_eq!(settings.get("http"), Some("custom.invalid:3128"));
        assert_eq!(settings.len(), 1);
    }
}
