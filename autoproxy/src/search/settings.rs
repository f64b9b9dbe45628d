//! Raw settings as read from a platform source

use crate::error::{ProxyError, Result};
use indexmap::IndexMap;
use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;

/// Key/value settings in the order they were read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: IndexMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value; later values win
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Raw value, untrimmed
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Trimmed value, `None` when missing or blank
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// A usable port number; zero and garbage count as unset
    pub fn port(&self, key: &str) -> Option<u16> {
        self.value(key)
            .and_then(|v| v.parse::<u16>().ok())
            .filter(|port| *port > 0)
    }

    /// `true`/`1` in any case
    pub fn flag(&self, key: &str) -> bool {
        self.value(key)
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut settings = Settings::new();
        for (key, value) in iter {
            settings.insert(key, value);
        }
        settings
    }
}

/// Parse an INI file into its sections.
///
/// Keys before the first section header land in the section named `""`.
/// KDE flag suffixes such as `[$e]` are dropped from keys.
pub fn parse_ini(text: &str) -> IndexMap<String, Settings> {
    let mut sections: IndexMap<String, Settings> = IndexMap::new();
    let mut current = String::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            current = name.trim().to_string();
            sections.entry(current.clone()).or_default();
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let key = match key.find("[$") {
            Some(idx) => key[..idx].trim_end(),
            None => key,
        };
        if key.is_empty() {
            continue;
        }
        sections
            .entry(current.clone())
            .or_default()
            .insert(key, value.trim());
    }

    sections
}

/// Read a settings file. A missing file is `Ok(None)`.
pub(crate) fn read_settings_file(source_name: &'static str, path: &Path) -> Result<Option<String>> {
    tracing::trace!("Reading {} settings from {:?}", source_name, path);
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("No {} settings at {:?}", source_name, path);
            Ok(None)
        }
        Err(e) => {
            tracing::error!("Cannot read {} settings from {:?}: {}", source_name, path, e);
            Err(ProxyError::SettingsRead {
                source_name,
                path: path.to_path_buf(),
                io: e,
            })
        }
    }
}

/// Capture stdout of a settings tool. A tool that is not installed is
/// `Ok(None)`; a tool that fails is a discovery error.
pub(crate) fn command_output(program: &str, args: &[&str]) -> Result<Option<String>> {
    let command = format!("{} {}", program, args.join(" "));
    tracing::trace!("Running {}", command);

    let output = match Command::new(program).args(args).output() {
        Ok(output) => output,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("{} is not installed", program);
            return Ok(None);
        }
        Err(e) => return Err(ProxyError::CommandFailed { command, io: e }),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::error!("{} failed with {}: {}", command, output.status, stderr.trim());
        return Err(ProxyError::CommandFailed {
            io: io::Error::other(format!("exited with {}", output.status)),
            command,
        });
    }

    Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
}
