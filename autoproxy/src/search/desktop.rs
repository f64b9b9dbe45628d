//! Picks the one desktop strategy that applies to this session

use super::gnome::GnomeStrategy;
use super::kde::KdeStrategy;
use super::macos::MacOsStrategy;
use super::platform::Desktop;
use super::windows::WindowsStrategy;
use super::SearchStrategy;
use crate::error::Result;
use crate::selector::SharedSelector;

/// Windows first, then KDE, GNOME and macOS. Other desktops have no strategy.
pub fn strategy_for(desktop: Desktop) -> Option<SearchStrategy> {
    match desktop {
        Desktop::Windows => Some(SearchStrategy::Windows(WindowsStrategy)),
        Desktop::Kde => Some(SearchStrategy::Kde(KdeStrategy::new())),
        Desktop::Gnome => Some(SearchStrategy::Gnome(GnomeStrategy)),
        Desktop::MacOs => Some(SearchStrategy::Macos(MacOsStrategy)),
        Desktop::Other => None,
    }
}

/// Run the strategy for the current desktop. Exactly one strategy is asked;
/// `Ok(None)` when the desktop is unknown or has no proxy configured.
pub fn proxy_selector() -> Result<Option<SharedSelector>> {
    let desktop = Desktop::current();
    tracing::debug!("Detected desktop {:?}", desktop);
    match strategy_for(desktop) {
        Some(strategy) => strategy.proxy_selector(),
        None => {
            tracing::debug!("No proxy settings available for this desktop");
            Ok(None)
        }
    }
}
