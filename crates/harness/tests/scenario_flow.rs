//! End-to-end scenario flows over scripted doubles.
//!
//! These tests run the whole state machine (trigger, confirmation rounds,
//! completion signal, store verification, cleanup) against the scripted
//! window driver and the in-memory storage client, asserting the protocol
//! properties: round counts per operation kind, post-conditions on the
//! listing, idempotent teardown, and stage-tagged failures.

use std::path::Path;
use std::time::Duration;

use fs_e2e::testing::{DriverAction, MemoryStorage, ScriptedDriver};
use fs_e2e::{
    HarnessConfig, HarnessError, OperationKind, OperationRequest, PageSelectors, Scenario, Stage,
    StorageClient, StoragePage, WindowDriver, WindowHandle,
};

const ADDRESS: &str = "0xabc123";

fn test_config(download_dir: &Path) -> HarnessConfig {
    fs_e2e::logging::init_logging(true);
    HarnessConfig {
        endpoint: "http://node.test:8545".to_string(),
        address: ADDRESS.to_string(),
        credential: "test-key".to_string(),
        page_url: "http://127.0.0.1:8080".to_string(),
        download_dir: download_dir.to_path_buf(),
        settle_delay: Duration::from_millis(1),
        popup_timeout: Duration::from_millis(50),
        control_timeout: Duration::from_millis(50),
        signal_timeout: Duration::from_millis(80),
        poll_interval: Duration::from_millis(5),
        ..HarnessConfig::default()
    }
}

fn storage_page() -> StoragePage {
    StoragePage::new(
        WindowHandle::new("main"),
        PageSelectors::default(),
        "http://node.test:8545",
    )
}

/// Driver with the page window open and a wallet popup ready to confirm.
fn driver_with_popup() -> ScriptedDriver {
    let driver = ScriptedDriver::new("main", "Filestorage");
    driver.add_window("mm", "MetaMask Notification");
    driver.set_button("mm", "Confirm", 0);
    driver
}

#[tokio::test]
async fn upload_scenario_drives_three_rounds_and_verifies_progress() {
    let downloads = tempfile::tempdir().unwrap();
    let config = test_config(downloads.path());
    let driver = driver_with_popup();
    driver.set_title_after_confirms("main", "Uploaded", 3);

    let storage = MemoryStorage::new();
    storage.seed_file(ADDRESS, "testFile", 100);

    let scenario = Scenario::new(&driver, &storage, &config, storage_page());
    scenario
        .page()
        .open(&driver, &config.page_url)
        .await
        .unwrap();
    let request = OperationRequest::new(OperationKind::Upload, "testFile", ADDRESS);

    scenario.run(&request).await.unwrap();

    assert_eq!(driver.confirm_clicks(), 3);
    // The scenario started by navigating the page window to the app.
    assert!(driver.actions().iter().any(|a| matches!(
        a,
        DriverAction::Goto { url, .. } if url == &config.page_url
    )));
    // The trigger touched account and path, then the upload control.
    assert!(driver.actions().iter().any(|a| matches!(
        a,
        DriverAction::Click { element_id, .. } if element_id == "uploadFile"
    )));
    // Automation ends back on the page window.
    assert_eq!(
        driver.active_window().await.unwrap(),
        WindowHandle::new("main")
    );
}

#[tokio::test]
async fn upload_fails_verification_when_transfer_is_partial() {
    let downloads = tempfile::tempdir().unwrap();
    let config = test_config(downloads.path());
    let driver = driver_with_popup();
    driver.set_title_after_confirms("main", "Uploaded", 3);

    let storage = MemoryStorage::new();
    storage.seed_file(ADDRESS, "testFile", 40);

    let scenario = Scenario::new(&driver, &storage, &config, storage_page());
    let request = OperationRequest::new(OperationKind::Upload, "testFile", ADDRESS);

    let failure = scenario.run(&request).await.unwrap_err();
    assert_eq!(failure.stage, Stage::Verifying);
    assert!(matches!(
        failure.source,
        HarnessError::AssertionMismatch { .. }
    ));
}

#[tokio::test]
async fn delete_scenario_drives_one_round_and_verifies_absence() {
    let downloads = tempfile::tempdir().unwrap();
    let config = test_config(downloads.path());
    let driver = driver_with_popup();
    driver.set_title_after_confirms("main", "Deleted", 1);

    // Backend view after mining: the file is gone.
    let storage = MemoryStorage::new();

    let scenario = Scenario::new(&driver, &storage, &config, storage_page());
    let request = OperationRequest::new(OperationKind::DeleteFile, "testFile", ADDRESS);

    scenario.run(&request).await.unwrap();
    assert_eq!(driver.confirm_clicks(), 1);
}

#[tokio::test]
async fn delete_verification_does_not_tolerate_a_stale_listing() {
    let downloads = tempfile::tempdir().unwrap();
    let config = test_config(downloads.path());
    let driver = driver_with_popup();
    driver.set_title_after_confirms("main", "Deleted", 1);

    // The listing query raced the backend and still shows the entry. The
    // verifier does not retry by contract, so the scenario fails.
    let storage = MemoryStorage::new();
    storage.seed_file(ADDRESS, "testFile", 100);

    let scenario = Scenario::new(&driver, &storage, &config, storage_page());
    let request = OperationRequest::new(OperationKind::DeleteFile, "testFile", ADDRESS);

    let failure = scenario.run(&request).await.unwrap_err();
    assert_eq!(failure.stage, Stage::Verifying);
}

#[tokio::test]
async fn directory_create_and_delete_round_trip() {
    let downloads = tempfile::tempdir().unwrap();
    let config = test_config(downloads.path());

    // Create: one wallet round, listing shows a non-file entry.
    let driver = driver_with_popup();
    driver.set_title_after_confirms("main", "Directory created", 1);
    let storage = MemoryStorage::new();
    storage.seed_directory(ADDRESS, "testDirectory");

    let scenario = Scenario::new(&driver, &storage, &config, storage_page());
    let create = OperationRequest::new(OperationKind::CreateDirectory, "testDirectory", ADDRESS);
    scenario.run(&create).await.unwrap();
    assert_eq!(driver.confirm_clicks(), 1);

    // Delete: one wallet round, entry disappears from the listing.
    let driver = driver_with_popup();
    driver.set_title_after_confirms("main", "Directory deleted", 1);
    let storage = MemoryStorage::new();

    let scenario = Scenario::new(&driver, &storage, &config, storage_page());
    let delete = OperationRequest::new(OperationKind::DeleteDirectory, "testDirectory", ADDRESS);
    scenario.run(&delete).await.unwrap();
    assert_eq!(driver.confirm_clicks(), 1);
}

#[tokio::test]
async fn missing_popup_fails_the_scenario_without_confirming() {
    let downloads = tempfile::tempdir().unwrap();
    let config = test_config(downloads.path());
    // No notification window ever opens.
    let driver = ScriptedDriver::new("main", "Filestorage");
    let storage = MemoryStorage::new();

    let scenario = Scenario::new(&driver, &storage, &config, storage_page());
    let request = OperationRequest::new(OperationKind::DeleteFile, "testFile", ADDRESS);

    let failure = scenario.run(&request).await.unwrap_err();
    assert_eq!(failure.stage, Stage::Confirming { round: 1 });
    assert!(matches!(failure.source, HarnessError::PopupNotFound { .. }));
    // It must not silently proceed as if confirmed.
    assert_eq!(driver.confirm_clicks(), 0);
}

#[tokio::test]
async fn absent_completion_signal_times_out_as_a_scenario_failure() {
    let downloads = tempfile::tempdir().unwrap();
    let config = test_config(downloads.path());
    // Confirmation works, but the page title never flips.
    let driver = driver_with_popup();
    let storage = MemoryStorage::new();

    let scenario = Scenario::new(&driver, &storage, &config, storage_page());
    let request = OperationRequest::new(OperationKind::DeleteFile, "testFile", ADDRESS);

    let failure = scenario.run(&request).await.unwrap_err();
    assert_eq!(failure.stage, Stage::AwaitingSignal);
    assert!(matches!(failure.source, HarnessError::Timeout { .. }));
}

#[tokio::test]
async fn download_round_trip_compares_bytes_exactly() {
    let downloads = tempfile::tempdir().unwrap();
    let config = test_config(downloads.path());
    let payload = b"round-trip payload".to_vec();

    let driver = ScriptedDriver::new("main", "Filestorage");
    driver.set_title_on_click("downloadFile", "main", "Downloaded");
    // The browser wrote the file into the download directory.
    std::fs::write(downloads.path().join("testFile"), &payload).unwrap();

    let storage = MemoryStorage::new();
    let scenario = Scenario::new(&driver, &storage, &config, storage_page());
    let request = OperationRequest::new(OperationKind::Download, "abc123/testFile", ADDRESS)
        .with_payload(payload);

    scenario.run(&request).await.unwrap();
    // No transaction, no wallet rounds.
    assert_eq!(driver.confirm_clicks(), 0);
}

#[tokio::test]
async fn download_with_corrupted_bytes_fails_verification() {
    let downloads = tempfile::tempdir().unwrap();
    let config = test_config(downloads.path());

    let driver = ScriptedDriver::new("main", "Filestorage");
    driver.set_title_on_click("downloadFile", "main", "Downloaded");
    // Same length as the payload, corrupted from offset 6 onwards.
    std::fs::write(downloads.path().join("testFile"), b"round-XXXX payload").unwrap();

    let storage = MemoryStorage::new();
    let scenario = Scenario::new(&driver, &storage, &config, storage_page());
    let request = OperationRequest::new(OperationKind::Download, "abc123/testFile", ADDRESS)
        .with_payload(b"round-trip payload".to_vec());

    let failure = scenario.run(&request).await.unwrap_err();
    assert_eq!(failure.stage, Stage::Verifying);
    match failure.source {
        HarnessError::AssertionMismatch { detail, .. } => {
            assert!(detail.contains("offset 6"), "unexpected detail: {detail}");
        }
        other => panic!("expected an assertion mismatch, got {other}"),
    }
}

#[tokio::test]
async fn cleanup_is_idempotent_on_a_clean_namespace() {
    let downloads = tempfile::tempdir().unwrap();
    let config = test_config(downloads.path());
    let driver = ScriptedDriver::new("main", "Filestorage");

    let storage = MemoryStorage::new();
    storage.seed_file(ADDRESS, "testFile", 100);

    let scenario = Scenario::new(&driver, &storage, &config, storage_page());
    let request = OperationRequest::new(OperationKind::Upload, "testFile", ADDRESS);

    // First pass removes the residue, second pass finds nothing to do.
    scenario.cleanup(&request).await.unwrap();
    assert!(storage.list_directory(ADDRESS).await.unwrap().is_empty());
    scenario.cleanup(&request).await.unwrap();
}

#[tokio::test]
async fn cleanup_removes_directories_with_the_directory_call() {
    let downloads = tempfile::tempdir().unwrap();
    let config = test_config(downloads.path());
    let driver = ScriptedDriver::new("main", "Filestorage");

    let storage = MemoryStorage::new();
    storage.seed_directory(ADDRESS, "testDirectory");

    let scenario = Scenario::new(&driver, &storage, &config, storage_page());
    let request = OperationRequest::new(OperationKind::DeleteDirectory, "testDirectory", ADDRESS);

    scenario.cleanup(&request).await.unwrap();
    assert!(storage.list_directory(ADDRESS).await.unwrap().is_empty());
    scenario.cleanup(&request).await.unwrap();
}
