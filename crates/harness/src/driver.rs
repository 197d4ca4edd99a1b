//! Window registry and page primitives.
//!
//! The orchestration layer never talks to a browser library directly; it
//! goes through [`WindowDriver`], a trait-based seam that mirrors the small
//! set of operations the harness needs. The production implementation is
//! [`crate::cdp::CdpDriver`]; tests use the scripted double in
//! [`crate::testing`].

use async_trait::async_trait;

use crate::error::Result;

/// Opaque identifier for one browser window/tab.
///
/// Handles are observations, not ownership: the browser creates and destroys
/// windows on its own schedule (the wallet popup in particular), so a handle
/// is only trusted for the lookup it was enumerated for and never cached
/// across polls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub String);

impl WindowHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Abstracts the browser operations the harness orchestrates.
///
/// Registry contract: [`windows`](Self::windows) returns a snapshot in the
/// browser's window-creation order; the order is not stable across calls if
/// windows close in between. [`switch_to`](Self::switch_to) fails with
/// [`HarnessError::WindowClosed`](crate::error::HarnessError::WindowClosed)
/// when the handle is gone.
///
/// Element primitives are deliberately non-waiting: bounded polling lives in
/// the components ([`crate::popup`], [`crate::confirm`], [`crate::signal`]),
/// where it can be tested against a scripted driver.
#[async_trait]
pub trait WindowDriver: Send + Sync {
    /// Snapshot of currently open windows.
    async fn windows(&self) -> Result<Vec<WindowHandle>>;

    /// The window automation is currently targeting.
    async fn active_window(&self) -> Result<WindowHandle>;

    /// Makes `window` the active automation target.
    async fn switch_to(&self, window: &WindowHandle) -> Result<()>;

    /// Document title of `window`.
    async fn title(&self, window: &WindowHandle) -> Result<String>;

    /// Navigates `window` to `url`.
    async fn goto(&self, window: &WindowHandle, url: &str) -> Result<()>;

    /// Types `value` into the element with id `element_id` in `window`.
    async fn fill(&self, window: &WindowHandle, element_id: &str, value: &str) -> Result<()>;

    /// Clicks the element with id `element_id` in `window`.
    async fn click(&self, window: &WindowHandle, element_id: &str) -> Result<()>;

    /// Whether a button whose visible text contains `text` exists in
    /// `window`. The wallet UI is third-party; buttons are matched by text,
    /// not by id.
    async fn button_exists(&self, window: &WindowHandle, text: &str) -> Result<bool>;

    /// Clicks the first button whose visible text contains `text`.
    async fn click_button(&self, window: &WindowHandle, text: &str) -> Result<()>;
}
