//! Waiting for the page's UI-visible completion signal.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::driver::{WindowDriver, WindowHandle};
use crate::error::{HarnessError, Result};
use crate::op::CompletionSignal;

/// Polls the page title until it equals the expected completion signal.
///
/// The title is a coarse, UI-only signal: it marks the page's belief that
/// the operation finished, not durable backend state. Verification against
/// the backing store is a separate step ([`crate::verify`]).
#[derive(Debug, Clone)]
pub struct CompletionWaiter {
    timeout: Duration,
    poll_interval: Duration,
}

impl CompletionWaiter {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    pub async fn wait<D: WindowDriver + ?Sized>(
        &self,
        driver: &D,
        window: &WindowHandle,
        expected: &CompletionSignal,
    ) -> Result<()> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let title = driver.title(window).await?;
            if title == expected.title() {
                debug!(window = %window, title = %title, "completion signal observed");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(HarnessError::Timeout {
                    ms: self.timeout.as_millis() as u64,
                    condition: format!("page title == {:?}", expected.title()),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
