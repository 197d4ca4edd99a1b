//! Locating the wallet notification window.
//!
//! The popup is opened by the extension some time after a UI action, among
//! an unordered, changing set of windows. The locator re-snapshots the
//! registry on every pass and never caches handles across passes.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::driver::{WindowDriver, WindowHandle};
use crate::error::{HarnessError, Result};

/// How a window title is recognized as the wallet notification.
///
/// The shipped default is an exact match on `"MetaMask Notification"`. Exact
/// matching is brittle against extension UI changes; if the wallet renames
/// its notification window the matcher must be updated. `Contains` exists
/// for forks and rebrands where a stable substring is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleMatcher {
    Exact(String),
    Contains(String),
}

impl TitleMatcher {
    pub fn metamask() -> Self {
        Self::Exact("MetaMask Notification".to_string())
    }

    pub fn matches(&self, title: &str) -> bool {
        match self {
            Self::Exact(expected) => title == expected,
            Self::Contains(fragment) => title.contains(fragment),
        }
    }
}

impl std::fmt::Display for TitleMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(s) => write!(f, "title == {s:?}"),
            Self::Contains(s) => write!(f, "title contains {s:?}"),
        }
    }
}

/// Scans the window registry for the wallet notification window.
#[derive(Debug, Clone)]
pub struct PopupLocator {
    matcher: TitleMatcher,
    timeout: Duration,
    poll_interval: Duration,
}

impl PopupLocator {
    pub fn new(matcher: TitleMatcher, timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            matcher,
            timeout,
            poll_interval,
        }
    }

    /// Finds the notification window, leaving it switched-to on success.
    ///
    /// Each pass enumerates windows fresh, switches into every candidate and
    /// tests its title. When a pass finds no match, focus is restored to the
    /// window that was active when the search began, so automation is not
    /// left stuck in an unrelated tab while waiting. Fails with
    /// [`HarnessError::PopupNotFound`] when the bounded wait elapses.
    pub async fn find<D: WindowDriver + ?Sized>(&self, driver: &D) -> Result<WindowHandle> {
        let origin = driver.active_window().await?;
        let deadline = Instant::now() + self.timeout;

        loop {
            for candidate in driver.windows().await? {
                // A candidate can close between enumeration and switch;
                // that just means it was not the popup.
                if driver.switch_to(&candidate).await.is_err() {
                    continue;
                }
                let title = match driver.title(&candidate).await {
                    Ok(title) => title,
                    Err(_) => continue,
                };
                trace!(window = %candidate, %title, "popup candidate");
                if self.matcher.matches(&title) {
                    debug!(window = %candidate, "notification window located");
                    return Ok(candidate);
                }
            }

            driver.switch_to(&origin).await?;

            if Instant::now() >= deadline {
                return Err(HarnessError::PopupNotFound {
                    ms: self.timeout.as_millis() as u64,
                    matcher: self.matcher.to_string(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
