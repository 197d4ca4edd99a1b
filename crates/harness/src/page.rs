//! Driving the file-storage page under test.
//!
//! The page is an external collaborator; the harness only knows the element
//! ids of its controls and triggers operations through them. Completion is
//! signaled solely via the document title ([`crate::signal`]).

use tracing::info;

use crate::driver::{WindowDriver, WindowHandle};
use crate::error::Result;
use crate::op::{OperationKind, OperationRequest};

/// Element ids of the page's controls.
///
/// Defaults match the reference page; they are data so a restyled page can
/// be targeted without code changes.
#[derive(Debug, Clone)]
pub struct PageSelectors {
    pub endpoint: String,
    pub account: String,
    pub path: String,
    pub download: String,
    pub upload: String,
    pub delete_file: String,
    pub create_directory: String,
    pub delete_directory: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            endpoint: "SCHAIN_ENDPOINT".to_string(),
            account: "account".to_string(),
            path: "storagePath".to_string(),
            download: "downloadFile".to_string(),
            upload: "uploadFile".to_string(),
            delete_file: "deleteFile".to_string(),
            create_directory: "createDirectory".to_string(),
            delete_directory: "deleteDirectory".to_string(),
        }
    }
}

impl PageSelectors {
    fn trigger_for(&self, kind: OperationKind) -> &str {
        match kind {
            OperationKind::Download => &self.download,
            OperationKind::Upload => &self.upload,
            OperationKind::DeleteFile => &self.delete_file,
            OperationKind::CreateDirectory => &self.create_directory,
            OperationKind::DeleteDirectory => &self.delete_directory,
        }
    }
}

/// The storage web page hosted in one window.
pub struct StoragePage {
    window: WindowHandle,
    selectors: PageSelectors,
    endpoint: String,
}

impl StoragePage {
    pub fn new(window: WindowHandle, selectors: PageSelectors, endpoint: impl Into<String>) -> Self {
        Self {
            window,
            selectors,
            endpoint: endpoint.into(),
        }
    }

    pub fn window(&self) -> &WindowHandle {
        &self.window
    }

    pub async fn open<D: WindowDriver + ?Sized>(&self, driver: &D, url: &str) -> Result<()> {
        driver.goto(&self.window, url).await
    }

    /// Fills the operation's inputs and clicks its trigger.
    ///
    /// Download addresses a storage path on a configured endpoint; the
    /// wallet-gated operations address a path within the actor's namespace.
    pub async fn trigger<D: WindowDriver + ?Sized>(
        &self,
        driver: &D,
        request: &OperationRequest,
    ) -> Result<()> {
        request.validate()?;
        info!(op = %request.kind, path = %request.path, "triggering operation");

        match request.kind {
            OperationKind::Download => {
                driver
                    .fill(&self.window, &self.selectors.endpoint, &self.endpoint)
                    .await?;
            }
            _ => {
                driver
                    .fill(&self.window, &self.selectors.account, &request.actor)
                    .await?;
            }
        }
        driver
            .fill(&self.window, &self.selectors.path, &request.path)
            .await?;
        driver
            .click(&self.window, self.selectors.trigger_for(request.kind))
            .await
    }
}
