//! End-to-end scenario runner.
//!
//! One scenario takes an [`OperationRequest`] through
//! `Triggering -> Confirming(1..N) -> AwaitingSignal -> Verifying`; the
//! failure, if any, records which stage raised. Cleanup runs best-effort
//! and treats absence as success so it can run unconditionally after every
//! scenario.

use thiserror::Error;
use tracing::{info, warn};

use crate::config::HarnessConfig;
use crate::confirm::ConfirmationActor;
use crate::driver::WindowDriver;
use crate::error::{HarnessError, Result};
use crate::op::{OperationKind, OperationRequest};
use crate::page::StoragePage;
use crate::popup::PopupLocator;
use crate::sequencer::TransactionSequencer;
use crate::signal::CompletionWaiter;
use crate::storage::{StorageClient, strip_hex_prefix};
use crate::verify::{assert_absent, assert_present};

/// Stage of the scenario state machine at which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Triggering,
    Confirming { round: u32 },
    AwaitingSignal,
    Verifying,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Triggering => f.write_str("triggering the operation"),
            Self::Confirming { round } => write!(f, "driving confirmation round {round}"),
            Self::AwaitingSignal => f.write_str("awaiting the completion signal"),
            Self::Verifying => f.write_str("verifying stored state"),
        }
    }
}

/// Scenario outcome for the failed case: the stage plus the error it raised.
#[derive(Debug, Error)]
#[error("scenario failed while {stage}: {source}")]
pub struct ScenarioFailure {
    pub stage: Stage,
    #[source]
    pub source: HarnessError,
}

impl ScenarioFailure {
    fn at(stage: Stage) -> impl FnOnce(HarnessError) -> Self {
        move |source| Self { stage, source }
    }
}

/// Orchestrates one operation against the page, the wallet, and the store.
pub struct Scenario<'a, D: WindowDriver + ?Sized, S: StorageClient + ?Sized> {
    driver: &'a D,
    storage: &'a S,
    config: &'a HarnessConfig,
    page: StoragePage,
}

impl<'a, D: WindowDriver + ?Sized, S: StorageClient + ?Sized> Scenario<'a, D, S> {
    pub fn new(
        driver: &'a D,
        storage: &'a S,
        config: &'a HarnessConfig,
        page: StoragePage,
    ) -> Self {
        Self {
            driver,
            storage,
            config,
            page,
        }
    }

    pub fn page(&self) -> &StoragePage {
        &self.page
    }

    /// Runs the request end to end.
    pub async fn run(&self, request: &OperationRequest) -> std::result::Result<(), ScenarioFailure> {
        info!(op = %request.kind, path = %request.path, "scenario start");

        self.page
            .trigger(self.driver, request)
            .await
            .map_err(ScenarioFailure::at(Stage::Triggering))?;

        let sequencer = TransactionSequencer::new(
            PopupLocator::new(
                self.config.popup_matcher.clone(),
                self.config.popup_timeout,
                self.config.poll_interval,
            ),
            ConfirmationActor::new(
                self.config.confirm_label.clone(),
                self.config.control_timeout,
                self.config.poll_interval,
            ),
            self.config.settle_delay,
        );
        sequencer
            .drive(self.driver, &request.plan())
            .await
            .map_err(|e| ScenarioFailure {
                stage: Stage::Confirming { round: e.round },
                source: e.source,
            })?;

        CompletionWaiter::new(self.config.signal_timeout, self.config.poll_interval)
            .wait(
                self.driver,
                self.page.window(),
                &request.kind.completion_signal(),
            )
            .await
            .map_err(ScenarioFailure::at(Stage::AwaitingSignal))?;

        self.verify(request)
            .await
            .map_err(ScenarioFailure::at(Stage::Verifying))?;

        info!(op = %request.kind, path = %request.path, "scenario passed");
        Ok(())
    }

    /// Checks the operation's effect on the authoritative store.
    async fn verify(&self, request: &OperationRequest) -> Result<()> {
        let name = entry_name(&request.path);
        match request.kind {
            OperationKind::Upload => {
                let listing = self.listing(&request.actor).await?;
                assert_present(
                    &listing,
                    name,
                    |e| e.uploading_progress == 100,
                    "uploading_progress == 100",
                )
            }
            OperationKind::DeleteFile | OperationKind::DeleteDirectory => {
                let listing = self.listing(&request.actor).await?;
                assert_absent(&listing, name)
            }
            OperationKind::CreateDirectory => {
                let listing = self.listing(&request.actor).await?;
                assert_present(&listing, name, |e| !e.is_file, "is_file == false")
            }
            OperationKind::Download => self.verify_download(request, name).await,
        }
    }

    /// The downloaded bytes must equal the request payload exactly. The
    /// browser writes the file asynchronously after the title flips, so one
    /// settling delay precedes the read.
    async fn verify_download(&self, request: &OperationRequest, name: &str) -> Result<()> {
        let payload = request.payload.as_deref().ok_or_else(|| {
            HarnessError::Config("download verification requires a request payload".to_string())
        })?;

        tokio::time::sleep(self.config.settle_delay).await;
        let path = self.config.download_dir.join(name);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|_| HarnessError::AssertionMismatch {
                name: name.to_string(),
                detail: format!("downloaded file missing at {}", path.display()),
            })?;
        if bytes != payload {
            let offset = bytes
                .iter()
                .zip(payload)
                .position(|(got, want)| got != want)
                .unwrap_or_else(|| bytes.len().min(payload.len()));
            return Err(HarnessError::AssertionMismatch {
                name: name.to_string(),
                detail: format!(
                    "downloaded bytes differ at offset {offset} (expected {} bytes, got {})",
                    payload.len(),
                    bytes.len()
                ),
            });
        }
        Ok(())
    }

    /// Removes the request's residue from the store if it is still there.
    ///
    /// Absence is not an error, so teardown can run twice on a clean
    /// namespace. Failures while deleting are reported but expected to be
    /// rare; the caller typically logs and moves on.
    pub async fn cleanup(&self, request: &OperationRequest) -> Result<()> {
        let name = entry_name(&request.path);
        let listing = self.listing(&request.actor).await?;
        let Some(entry) = listing.iter().find(|e| e.name == name) else {
            return Ok(());
        };

        warn!(op = %request.kind, %name, "cleaning up residual entry");
        let owner = &request.actor;
        if entry.is_file {
            self.storage
                .delete_file(owner, name, &self.config.credential)
                .await
        } else {
            self.storage
                .delete_directory(owner, name, &self.config.credential)
                .await
        }
    }

    async fn listing(&self, actor: &str) -> Result<Vec<crate::storage::DirectoryEntry>> {
        self.storage.list_directory(strip_hex_prefix(actor)).await
    }
}

/// Listing name of a request target: the last segment of its path.
fn entry_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_name_takes_last_segment() {
        assert_eq!(entry_name("testFile"), "testFile");
        assert_eq!(entry_name("abc123/testFile"), "testFile");
    }

    #[test]
    fn stage_labels_are_readable() {
        assert_eq!(
            Stage::Confirming { round: 2 }.to_string(),
            "driving confirmation round 2"
        );
        assert_eq!(Stage::Verifying.to_string(), "verifying stored state");
    }
}
