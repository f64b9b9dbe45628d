//! Configuration validation

use super::schema::{Config, ManualConfig};
use crate::error::{Result, ValidationError};
use crate::filter::IpRangeFilter;
use crate::search::StrategyKind;
use crate::selector::try_parse_proxy_settings;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate entire configuration
    pub fn validate(config: &Config) -> Result<()> {
        Self::validate_strategies(config)?;
        if let Some(manual) = &config.manual {
            Self::validate_manual(manual)?;
        }
        if let Some(bypass) = &config.search.bypass {
            Self::validate_bypass_list("search.bypass", bypass)?;
        }
        Ok(())
    }

    /// The manual strategy needs a `[manual]` table
    fn validate_strategies(config: &Config) -> Result<()> {
        let wants_manual = config
            .search
            .strategies
            .iter()
            .flatten()
            .any(|kind| *kind == StrategyKind::Manual);
        if wants_manual && config.manual.is_none() {
            return Err(ValidationError::MissingManualSettings.into());
        }
        Ok(())
    }

    fn validate_manual(manual: &ManualConfig) -> Result<()> {
        for (key, value) in [
            ("manual.http", &manual.http),
            ("manual.https", &manual.https),
            ("manual.ftp", &manual.ftp),
            ("manual.socks", &manual.socks),
        ] {
            let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            if try_parse_proxy_settings(value).is_err() {
                return Err(ValidationError::InvalidProxy {
                    key: key.to_string(),
                    value: value.to_string(),
                }
                .into());
            }
        }
        if let Some(no_proxy) = &manual.no_proxy {
            Self::validate_bypass_list("manual.no_proxy", no_proxy)?;
        }
        Ok(())
    }

    /// Range entries must be well formed. The whitelist parser would only
    /// skip them, which hides typos in a file the user wrote.
    pub fn validate_bypass_list(name: &str, list: &str) -> Result<()> {
        let invalid = list
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| token.contains('/'))
            .find(|token| !IpRangeFilter::is_valid(token));
        match invalid {
            Some(entry) => Err(ValidationError::InvalidBypassEntry {
                entry: entry.to_string(),
                list: name.to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }
}
