//! Configuration schema types

use crate::search::StrategyKind;
use serde::{Deserialize, Serialize};

/// Complete search configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    pub manual: Option<ManualConfig>,
}

/// Which strategies to try, and hosts that always go direct
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchConfig {
    pub strategies: Option<Vec<StrategyKind>>,
    /// Whitelist applied on top of whatever selector is found
    pub bypass: Option<String>,
}

/// Proxies for the `manual` strategy, each written as `[scheme://]host[:port]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ManualConfig {
    pub http: Option<String>,
    /// Defaults to the http proxy
    pub https: Option<String>,
    pub ftp: Option<String>,
    pub socks: Option<String>,
    pub no_proxy: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[search]
strategies = ["manual", "kde", "env"]
bypass = "localhost, 127.0.0.0/8"

[manual]
http = "proxy.example.com:8080"
socks = "socks.example.com:1080"
no_proxy = ".example.com"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.search.strategies,
            Some(vec![StrategyKind::Manual, StrategyKind::Kde, StrategyKind::Env])
        );
        assert_eq!(config.search.bypass.as_deref(), Some("localhost, 127.0.0.0/8"));
        let manual = config.manual.unwrap();
        assert_eq!(manual.http.as_deref(), Some("proxy.example.com:8080"));
        assert_eq!(manual.https, None);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let result: std::result::Result<Config, _> =
            toml::from_str("[search]\nstrategies = [\"pac\"]\n");
        assert!(result.is_err());
    }
}
