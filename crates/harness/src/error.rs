use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// The window behind a handle no longer exists (closed between
    /// enumeration and use). Handles are ephemeral; callers re-enumerate.
    #[error("window no longer exists: {handle}")]
    WindowClosed { handle: String },

    #[error("element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("javascript evaluation failed: {0}")]
    JsEval(String),

    /// The wallet notification window never appeared within the bounded
    /// wait. Recoverable: the caller may retry the whole round.
    #[error("wallet popup not found after {ms}ms (matcher: {matcher})")]
    PopupNotFound { ms: u64, matcher: String },

    /// The confirm control never rendered inside the notification window.
    /// Usually a wallet UI regression; surfaced as a scenario failure.
    #[error("confirm control '{label}' not found after {ms}ms")]
    ControlNotFound { label: String, ms: u64 },

    #[error("timeout after {ms}ms waiting for: {condition}")]
    Timeout { ms: u64, condition: String },

    /// Post-condition check against the backing store failed.
    #[error("assertion mismatch for '{name}': {detail}")]
    AssertionMismatch { name: String, detail: String },

    #[error("storage client error: {0}")]
    Storage(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl HarnessError {
    /// Whether the failure is one the caller can reasonably retry
    /// (as opposed to a UI regression or a broken post-condition).
    pub fn is_retryable(&self) -> bool {
        matches!(self, HarnessError::PopupNotFound { .. })
    }
}
