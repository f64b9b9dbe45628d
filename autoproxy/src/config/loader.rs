//! Configuration file loading and merging

use super::builtin::get_builtin;
use super::schema::Config;
use crate::error::{ProxyError, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a configuration file
pub const CONFIG_ENV: &str = "AUTOPROXY_CONFIG";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        // Priority order:
        // 1. $AUTOPROXY_CONFIG
        // 2. $XDG_CONFIG_HOME/autoproxy/config.toml
        // 3. ~/.config/autoproxy/config.toml

        if let Ok(path) = env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }

        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("autoproxy/config.toml");
        }

        if let Ok(home) = env::var("HOME") {
            return PathBuf::from(home).join(".config/autoproxy/config.toml");
        }

        PathBuf::from("config.toml")
    }

    /// Load config from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ProxyError::ConfigLoad {
            path: path.to_path_buf(),
            io: e,
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Merge user config on top of built-in config.
    /// Anything the user sets replaces the built-in value.
    pub fn merge_configs(builtin: Config, user: Config) -> Config {
        let mut merged = builtin;

        if user.search.strategies.is_some() {
            merged.search.strategies = user.search.strategies;
        }
        if user.search.bypass.is_some() {
            merged.search.bypass = user.search.bypass;
        }
        if user.manual.is_some() {
            merged.manual = user.manual;
        }

        merged
    }

    /// Load config with built-in as lowest-priority fallback
    /// Priority: User config > Built-in config
    pub fn load_with_builtins() -> Result<Config> {
        let builtin = get_builtin().clone();
        let path = Self::default_config_path();

        if path.exists() {
            tracing::debug!("Loading config from {:?}", path);
            let user = Self::load_from_file(&path)?;
            Ok(Self::merge_configs(builtin, user))
        } else {
            tracing::debug!("User config not found at {:?}, using built-in defaults", path);
            Ok(builtin)
        }
    }

    /// Load config from optional path or default with built-in merge
    /// Priority: Explicit path > User config > Built-in config
    pub fn load_or_default(path: Option<PathBuf>) -> Result<Config> {
        if let Some(p) = path {
            let user = Self::load_from_file(&p)?;
            Ok(Self::merge_configs(get_builtin().clone(), user))
        } else {
            Self::load_with_builtins()
        }
    }
}
