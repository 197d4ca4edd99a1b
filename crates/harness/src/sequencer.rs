//! Driving the fixed sequence of wallet confirmation rounds.

use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::confirm::ConfirmationActor;
use crate::driver::WindowDriver;
use crate::error::HarnessError;
use crate::op::ConfirmationPlan;
use crate::popup::PopupLocator;

/// A confirmation round that failed, tagged with its 1-based position.
#[derive(Debug, Error)]
#[error("confirmation round {round} failed")]
pub struct ConfirmationError {
    pub round: u32,
    #[source]
    pub source: HarnessError,
}

/// Runs locate-and-confirm once per round of a [`ConfirmationPlan`].
///
/// Rounds are strictly sequential: the wallet processes one transaction
/// request at a time and shows no new notification until the prior one is
/// dismissed. Each round starts with a settling delay because transactions
/// are submitted asynchronously after the UI click and the popup may not
/// exist yet. The delay is a fixed worst-case wait rather than a real
/// dependency signal, a latency/robustness trade-off that is acceptable in
/// a test harness and would not be in production code.
pub struct TransactionSequencer {
    locator: PopupLocator,
    actor: ConfirmationActor,
    settle_delay: Duration,
}

impl TransactionSequencer {
    pub fn new(locator: PopupLocator, actor: ConfirmationActor, settle_delay: Duration) -> Self {
        Self {
            locator,
            actor,
            settle_delay,
        }
    }

    pub async fn drive<D: WindowDriver + ?Sized>(
        &self,
        driver: &D,
        plan: &ConfirmationPlan,
    ) -> Result<(), ConfirmationError> {
        for round in 1..=plan.rounds() {
            info!(op = %plan.kind(), round, total = plan.rounds(), "confirmation round");
            tokio::time::sleep(self.settle_delay).await;

            // The locator leaves focus on the popup; remember where the
            // round started so automation ends each round back on the page.
            let origin = driver
                .active_window()
                .await
                .map_err(|source| ConfirmationError { round, source })?;
            let popup = self
                .locator
                .find(driver)
                .await
                .map_err(|source| ConfirmationError { round, source })?;
            self.actor
                .confirm(driver, &popup)
                .await
                .map_err(|source| ConfirmationError { round, source })?;
            driver
                .switch_to(&origin)
                .await
                .map_err(|source| ConfirmationError { round, source })?;
        }
        Ok(())
    }
}
