//! Platform, desktop and browser detection

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    Solaris,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(any(target_os = "solaris", target_os = "illumos")) {
            Platform::Solaris
        } else {
            Platform::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Desktop {
    Windows,
    Kde,
    Gnome,
    MacOs,
    Other,
}

impl Desktop {
    pub fn current() -> Self {
        Self::detect(Platform::current(), |name| env::var(name).ok())
    }

    /// Desktop for `platform`, looking at session variables through `var`
    pub fn detect(platform: Platform, var: impl Fn(&str) -> Option<String>) -> Self {
        match platform {
            Platform::Windows => return Desktop::Windows,
            Platform::MacOs => return Desktop::MacOs,
            Platform::Linux | Platform::Solaris | Platform::Other => {}
        }

        let current = var("XDG_CURRENT_DESKTOP").unwrap_or_default().to_lowercase();
        if var("KDE_SESSION_VERSION").is_some() || current.contains("kde") {
            tracing::trace!("Detected KDE desktop");
            return Desktop::Kde;
        }
        if var("GNOME_DESKTOP_SESSION_ID").is_some() || current.contains("gnome") {
            tracing::trace!("Detected GNOME desktop");
            return Desktop::Gnome;
        }
        tracing::trace!("Detected unknown desktop");
        Desktop::Other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    InternetExplorer,
    Firefox,
}

impl Browser {
    pub fn default_for(platform: Platform) -> Self {
        match platform {
            Platform::Windows => Browser::InternetExplorer,
            _ => Browser::Firefox,
        }
    }
}

/// Home directory of the current user
pub fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

/// No graphical session to read browser settings for
pub fn is_headless(platform: Platform, var: impl Fn(&str) -> Option<String>) -> bool {
    match platform {
        Platform::Windows | Platform::MacOs => false,
        _ => var("DISPLAY").is_none() && var("WAYLAND_DISPLAY").is_none(),
    }
}
