//! fs-e2e: end-to-end harness for wallet-gated file-storage pages.
//!
//! Drives a browser against a decentralized file-storage web page: triggers
//! an operation through the UI, authorizes the resulting transactions in the
//! wallet extension's notification window, waits for the page's completion
//! signal, and verifies the effect against the backing store's directory
//! listing.
//!
//! The orchestration core is browser-agnostic behind
//! [`driver::WindowDriver`]; [`cdp`] provides the Chromium implementation
//! and [`testing`] provides scripted doubles.
//!
//! # Example
//!
//! ```ignore
//! use fs_e2e::{
//!     cdp, HarnessConfig, OperationKind, OperationRequest, PageSelectors, Scenario,
//!     StoragePage,
//! };
//!
//! # async fn run(storage: &impl fs_e2e::StorageClient) -> anyhow::Result<()> {
//! let config = HarnessConfig::from_env()?;
//! let (driver, events) = cdp::launch(&config).await?;
//! let window = driver.open_page(&config.page_url).await?;
//!
//! let page = StoragePage::new(window, PageSelectors::default(), &config.endpoint);
//! let scenario = Scenario::new(&driver, storage, &config, page);
//!
//! let request = OperationRequest::new(OperationKind::Upload, "testFile", &config.address);
//! let outcome = scenario.run(&request).await;
//! scenario.cleanup(&request).await?;
//! outcome?;
//!
//! driver.close().await?;
//! events.abort();
//! # Ok(())
//! # }
//! ```

pub mod cdp;
pub mod config;
pub mod confirm;
pub mod driver;
pub mod error;
pub mod logging;
pub mod op;
pub mod page;
pub mod popup;
pub mod scenario;
pub mod sequencer;
pub mod signal;
pub mod storage;
pub mod testing;
pub mod verify;

pub use config::HarnessConfig;
pub use confirm::ConfirmationActor;
pub use driver::{WindowDriver, WindowHandle};
pub use error::{HarnessError, Result};
pub use op::{CompletionSignal, ConfirmationPlan, OperationKind, OperationRequest};
pub use page::{PageSelectors, StoragePage};
pub use popup::{PopupLocator, TitleMatcher};
pub use scenario::{Scenario, ScenarioFailure, Stage};
pub use sequencer::TransactionSequencer;
pub use signal::CompletionWaiter;
pub use storage::{DirectoryEntry, StorageClient, strip_hex_prefix};
