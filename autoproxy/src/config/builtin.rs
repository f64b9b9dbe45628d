//! Built-in default configuration embedded in the binary
//!
//! The lowest-priority configuration layer. Parsed once on first access.

use super::schema::Config;
use std::sync::LazyLock;

const BUILTIN_TOML: &str = include_str!("../builtin-search.toml");

static BUILTIN_CONFIG: LazyLock<Config> = LazyLock::new(load_builtin_config);

pub fn get_builtin() -> &'static Config {
    &BUILTIN_CONFIG
}

fn load_builtin_config() -> Config {
    toml::from_str(BUILTIN_TOML).unwrap_or_else(|err| {
        tracing::error!("Built-in configuration is invalid: {}", err);
        Config::default()
    })
}
