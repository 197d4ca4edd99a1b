//! Activating the confirm control inside the notification window.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::driver::{WindowDriver, WindowHandle};
use crate::error::{HarnessError, Result};

/// Clicks the wallet's confirm control and restores focus.
///
/// The control belongs to a third-party UI and has no stable id, so it is
/// identified by visible text content. The wait for it to render is bounded;
/// if it never appears the round fails with
/// [`HarnessError::ControlNotFound`] and the caller decides whether to retry
/// the whole confirmation round.
#[derive(Debug, Clone)]
pub struct ConfirmationActor {
    label: String,
    timeout: Duration,
    poll_interval: Duration,
}

impl ConfirmationActor {
    pub fn new(label: impl Into<String>, timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            label: label.into(),
            timeout,
            poll_interval,
        }
    }

    /// Confirms the pending transaction hosted by `popup`, then switches
    /// back to the window that was active before the call.
    pub async fn confirm<D: WindowDriver + ?Sized>(
        &self,
        driver: &D,
        popup: &WindowHandle,
    ) -> Result<()> {
        let origin = driver.active_window().await?;
        driver.switch_to(popup).await?;

        let deadline = Instant::now() + self.timeout;
        loop {
            if driver.button_exists(popup, &self.label).await? {
                break;
            }
            if Instant::now() >= deadline {
                return Err(HarnessError::ControlNotFound {
                    label: self.label.clone(),
                    ms: self.timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        driver.click_button(popup, &self.label).await?;
        debug!(window = %popup, label = %self.label, "transaction confirmed");
        driver.switch_to(&origin).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DriverAction, ScriptedDriver};

    fn actor(ms: u64) -> ConfirmationActor {
        ConfirmationActor::new("Confirm", Duration::from_millis(ms), Duration::from_millis(5))
    }

    #[tokio::test]
    async fn clicks_control_and_restores_focus() {
        let driver = ScriptedDriver::new("main", "Filestorage");
        driver.add_window("mm", "MetaMask Notification");
        driver.set_button("mm", "Confirm", 0);

        actor(100)
            .confirm(&driver, &WindowHandle::new("mm"))
            .await
            .unwrap();

        assert_eq!(
            driver.active_window().await.unwrap(),
            WindowHandle::new("main")
        );
        let clicks = driver
            .actions()
            .into_iter()
            .filter(|a| matches!(a, DriverAction::ClickButton { .. }))
            .count();
        assert_eq!(clicks, 1);
    }

    #[tokio::test]
    async fn waits_for_control_to_render() {
        let driver = ScriptedDriver::new("main", "Filestorage");
        driver.add_window("mm", "MetaMask Notification");
        // Control appears only on the fourth presence probe.
        driver.set_button("mm", "Confirm", 3);

        actor(200)
            .confirm(&driver, &WindowHandle::new("mm"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_control_is_surfaced() {
        let driver = ScriptedDriver::new("main", "Filestorage");
        driver.add_window("mm", "MetaMask Notification");

        let err = actor(40)
            .confirm(&driver, &WindowHandle::new("mm"))
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::ControlNotFound { .. }));
        assert!(!driver
            .actions()
            .iter()
            .any(|a| matches!(a, DriverAction::ClickButton { .. })));
    }
}
