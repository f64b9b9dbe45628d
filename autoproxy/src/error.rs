//! Error types for proxy discovery and selection

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProxyError>;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid format: {0}")]
    Format(#[from] FormatError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to read {source_name} settings from {path}: {io}")]
    SettingsRead {
        source_name: &'static str,
        path: PathBuf,
        #[source]
        io: std::io::Error,
    },

    #[error("{source_name} settings are corrupt: {reason}")]
    SettingsCorrupt {
        source_name: &'static str,
        reason: String,
    },

    #[error("Failed to run {command}: {io}")]
    CommandFailed {
        command: String,
        #[source]
        io: std::io::Error,
    },

    #[error("Failed to load config from {path}: {io}")]
    ConfigLoad {
        path: PathBuf,
        #[source]
        io: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProxyError {
    /// True when a settings source exists but could not be read or understood.
    ///
    /// A missing platform or desktop is never an error; strategies report it
    /// as `Ok(None)`.
    pub fn is_discovery(&self) -> bool {
        matches!(
            self,
            ProxyError::SettingsRead { .. }
                | ProxyError::SettingsCorrupt { .. }
                | ProxyError::CommandFailed { .. }
        )
    }
}

/// Malformed whitelist token or proxy string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Invalid IP range: {range}")]
    InvalidIpRange { range: String },

    #[error("Invalid proxy specification: {spec}")]
    InvalidProxySpec { spec: String },

    #[error("Invalid port: {value}")]
    InvalidPort { value: String },
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Unknown search strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("Invalid proxy for {key}: {value}")]
    InvalidProxy { key: String, value: String },

    #[error("Invalid bypass entry {entry} in {list}")]
    InvalidBypassEntry { entry: String, list: String },

    #[error("Strategy 'manual' requires a [manual] section")]
    MissingManualSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_classification() {
        let err = ProxyError::SettingsCorrupt {
            source_name: "kde",
            reason: "bad ProxyType".to_string(),
        };
        assert!(err.is_discovery());

        let err = ProxyError::from(FormatError::InvalidPort {
            value: "abc".to_string(),
        });
        assert!(!err.is_discovery());
        assert_eq!(err.to_string(), "Invalid format: Invalid port: abc");
    }
}
