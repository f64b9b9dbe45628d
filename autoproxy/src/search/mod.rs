//! Proxy discovery.
//!
//! Every source of proxy settings is a [`SearchStrategy`]. A strategy reads
//! its raw settings (a file, a command's output, environment variables)
//! and turns them into a selector in a separate step that touches nothing
//! outside its arguments. [`ProxySearch`] runs strategies in order and keeps
//! the first selector found.

pub mod desktop;
pub mod env;
pub mod firefox;
pub mod gnome;
pub mod kde;
pub mod macos;
pub mod manual;
pub mod platform;
pub mod settings;
pub mod windows;

pub use env::EnvStrategy;
pub use firefox::FirefoxStrategy;
pub use gnome::GnomeStrategy;
pub use kde::KdeStrategy;
pub use macos::MacOsStrategy;
pub use manual::ManualStrategy;
pub use platform::{Browser, Desktop, Platform};
pub use settings::Settings;
pub use windows::WindowsStrategy;

use crate::config::{Config, ManualConfig};
use crate::error::{Result, ValidationError};
use crate::filter::Whitelist;
use crate::selector::{NoProxySelector, ProxyBypassListSelector, SharedSelector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Wrap `selector` in a bypass list unless the list is blank
pub(crate) fn with_bypass_list(selector: SharedSelector, list: Option<&str>) -> SharedSelector {
    match list.map(str::trim).filter(|list| !list.is_empty()) {
        Some(list) => {
            tracing::trace!("Bypass list is {:?}", list);
            Arc::new(ProxyBypassListSelector::parse(list, selector))
        }
        None => selector,
    }
}

pub(crate) fn direct() -> SharedSelector {
    NoProxySelector::instance()
}

/// Strategy names as written in configuration and on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Desktop,
    Browser,
    Firefox,
    Ie,
    Windows,
    Kde,
    Gnome,
    Macos,
    Env,
    Manual,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 10] = [
        StrategyKind::Desktop,
        StrategyKind::Browser,
        StrategyKind::Firefox,
        StrategyKind::Ie,
        StrategyKind::Windows,
        StrategyKind::Kde,
        StrategyKind::Gnome,
        StrategyKind::Macos,
        StrategyKind::Env,
        StrategyKind::Manual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Desktop => "desktop",
            StrategyKind::Browser => "browser",
            StrategyKind::Firefox => "firefox",
            StrategyKind::Ie => "ie",
            StrategyKind::Windows => "windows",
            StrategyKind::Kde => "kde",
            StrategyKind::Gnome => "gnome",
            StrategyKind::Macos => "macos",
            StrategyKind::Env => "env",
            StrategyKind::Manual => "manual",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| ValidationError::UnknownStrategy {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Whatever the current desktop environment is configured with
    Desktop,
    /// The platform's default browser
    Browser,
    Firefox(FirefoxStrategy),
    /// Internet Explorer settings, which live in the Windows registry
    Ie(WindowsStrategy),
    Windows(WindowsStrategy),
    Kde(KdeStrategy),
    Gnome(GnomeStrategy),
    Macos(MacOsStrategy),
    Env(EnvStrategy),
    Manual(ManualStrategy),
}

impl SearchStrategy {
    /// `manual` needs the `[manual]` configuration table
    pub fn from_kind(kind: StrategyKind, manual: Option<&ManualConfig>) -> Result<Self> {
        Ok(match kind {
            StrategyKind::Desktop => SearchStrategy::Desktop,
            StrategyKind::Browser => SearchStrategy::Browser,
            StrategyKind::Firefox => SearchStrategy::Firefox(FirefoxStrategy::new()),
            StrategyKind::Ie => SearchStrategy::Ie(WindowsStrategy),
            StrategyKind::Windows => SearchStrategy::Windows(WindowsStrategy),
            StrategyKind::Kde => SearchStrategy::Kde(KdeStrategy::new()),
            StrategyKind::Gnome => SearchStrategy::Gnome(GnomeStrategy),
            StrategyKind::Macos => SearchStrategy::Macos(MacOsStrategy),
            StrategyKind::Env => SearchStrategy::Env(EnvStrategy::new()),
            StrategyKind::Manual => {
                let config = manual.ok_or(ValidationError::MissingManualSettings)?;
                SearchStrategy::Manual(ManualStrategy::new(config.clone()))
            }
        })
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            SearchStrategy::Desktop => StrategyKind::Desktop,
            SearchStrategy::Browser => StrategyKind::Browser,
            SearchStrategy::Firefox(_) => StrategyKind::Firefox,
            SearchStrategy::Ie(_) => StrategyKind::Ie,
            SearchStrategy::Windows(_) => StrategyKind::Windows,
            SearchStrategy::Kde(_) => StrategyKind::Kde,
            SearchStrategy::Gnome(_) => StrategyKind::Gnome,
            SearchStrategy::Macos(_) => StrategyKind::Macos,
            SearchStrategy::Env(_) => StrategyKind::Env,
            SearchStrategy::Manual(_) => StrategyKind::Manual,
        }
    }

    /// `Ok(None)` when the strategy does not apply or finds no proxy.
    /// Discovery errors mean the settings exist but could not be read.
    pub fn proxy_selector(&self) -> Result<Option<SharedSelector>> {
        match self {
            SearchStrategy::Desktop => desktop::proxy_selector(),
            SearchStrategy::Browser => match Browser::default_for(Platform::current()) {
                Browser::InternetExplorer => WindowsStrategy.proxy_selector(),
                Browser::Firefox => FirefoxStrategy::new().proxy_selector(),
            },
            SearchStrategy::Firefox(strategy) => strategy.proxy_selector(),
            SearchStrategy::Ie(strategy) | SearchStrategy::Windows(strategy) => {
                strategy.proxy_selector()
            }
            SearchStrategy::Kde(strategy) => strategy.proxy_selector(),
            SearchStrategy::Gnome(strategy) => strategy.proxy_selector(),
            SearchStrategy::Macos(strategy) => strategy.proxy_selector(),
            SearchStrategy::Env(strategy) => Ok(strategy.proxy_selector()),
            SearchStrategy::Manual(strategy) => strategy.proxy_selector(),
        }
    }
}

/// Strategies tried in order, plus a bypass list applied to whichever
/// selector is found
#[derive(Debug, Clone, Default)]
pub struct ProxySearch {
    strategies: Vec<SearchStrategy>,
    bypass: Whitelist,
}

impl ProxySearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Browser, then desktop, then environment variables. The browser is
    /// left out when there is no graphical session.
    pub fn default_search() -> Self {
        let mut search = Self::new();
        if platform::is_headless(Platform::current(), |name| std::env::var(name).ok()) {
            tracing::debug!("No graphical session, skipping browser settings");
        } else {
            search.add_strategy(SearchStrategy::Browser);
        }
        search.add_strategy(SearchStrategy::Desktop);
        search.add_strategy(SearchStrategy::Env(EnvStrategy::new()));
        search
    }

    /// Build the search described by `config`.
    ///
    /// Without a strategy list this is [`ProxySearch::default_search`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut search = match &config.search.strategies {
            None => Self::default_search(),
            Some(kinds) => {
                let headless =
                    platform::is_headless(Platform::current(), |name| std::env::var(name).ok());
                let mut search = Self::new();
                for &kind in kinds {
                    if kind == StrategyKind::Browser && headless {
                        tracing::debug!("No graphical session, skipping browser settings");
                        continue;
                    }
                    search.add_strategy(SearchStrategy::from_kind(kind, config.manual.as_ref())?);
                }
                search
            }
        };
        if let Some(bypass) = &config.search.bypass {
            search.set_bypass(Whitelist::parse(bypass));
        }
        Ok(search)
    }

    pub fn add_strategy(&mut self, strategy: SearchStrategy) {
        self.strategies.push(strategy);
    }

    pub fn set_bypass(&mut self, bypass: Whitelist) {
        self.bypass = bypass;
    }

    pub fn strategies(&self) -> &[SearchStrategy] {
        &self.strategies
    }

    pub fn bypass(&self) -> &Whitelist {
        &self.bypass
    }

    /// First selector any strategy produces.
    ///
    /// Strategies whose settings cannot be read are logged and skipped;
    /// any other error ends the search.
    pub fn proxy_selector(&self) -> Result<Option<SharedSelector>> {
        for strategy in &self.strategies {
            let kind = strategy.kind();
            tracing::trace!("Trying {} strategy", kind);
            match strategy.proxy_selector() {
                Ok(Some(selector)) => {
                    tracing::debug!("Using proxy settings from {} strategy", kind);
                    return Ok(Some(self.apply_bypass(selector)));
                }
                Ok(None) => tracing::trace!("No proxy settings from {} strategy", kind),
                Err(err) if err.is_discovery() => {
                    tracing::error!("Skipping {} strategy: {}", kind, err);
                }
                Err(err) => return Err(err),
            }
        }
        tracing::debug!("No proxy settings found");
        Ok(None)
    }

    fn apply_bypass(&self, selector: SharedSelector) -> SharedSelector {
        if self.bypass.is_empty() {
            return selector;
        }
        Arc::new(ProxyBypassListSelector::new(self.bypass.clone(), selector))
    }
}
