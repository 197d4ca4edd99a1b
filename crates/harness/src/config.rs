//! Harness configuration.
//!
//! Endpoint, actor and credential come from the environment (optionally via
//! a `.env` file); every wait is a named tunable. The delay defaults are the
//! empirically "long enough" constants the reference flows were driven
//! with, not protocol minimums.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{HarnessError, Result};
use crate::popup::TitleMatcher;

const ENV_ENDPOINT: &str = "FS_ENDPOINT";
const ENV_ADDRESS: &str = "FS_ADDRESS";
const ENV_CREDENTIAL: &str = "FS_PRIVATE_KEY";
const ENV_PAGE_URL: &str = "FS_PAGE_URL";
const ENV_WALLET_EXTENSION: &str = "FS_WALLET_EXTENSION_DIR";
const ENV_DOWNLOAD_DIR: &str = "FS_DOWNLOAD_DIR";

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Chain RPC endpoint the page and storage client talk to.
    pub endpoint: String,
    /// On-chain address operations act as.
    pub address: String,
    /// Signing credential for direct storage-client calls (setup/cleanup).
    pub credential: String,
    /// URL of the storage page under test.
    pub page_url: String,
    /// Unpacked wallet extension to load into the browser, if any.
    pub wallet_extension_dir: Option<PathBuf>,
    /// Where the browser writes downloaded files.
    pub download_dir: PathBuf,
    /// How the wallet notification window is recognized.
    pub popup_matcher: TitleMatcher,
    /// Visible text of the wallet's confirm control.
    pub confirm_label: String,
    /// Worst-case wait before each confirmation round.
    pub settle_delay: Duration,
    /// Bounded wait for the notification window to appear.
    pub popup_timeout: Duration,
    /// Bounded wait for the confirm control to render.
    pub control_timeout: Duration,
    /// Bounded wait for the completion title.
    pub signal_timeout: Duration,
    /// Interval between polls in every bounded wait.
    pub poll_interval: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            address: String::new(),
            credential: String::new(),
            page_url: String::new(),
            wallet_extension_dir: None,
            download_dir: std::env::temp_dir().join("fs-e2e-downloads"),
            popup_matcher: TitleMatcher::metamask(),
            confirm_label: "Confirm".to_string(),
            settle_delay: Duration::from_secs(10),
            popup_timeout: Duration::from_secs(30),
            control_timeout: Duration::from_secs(10),
            signal_timeout: Duration::from_secs(100),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl HarnessConfig {
    /// Loads the required settings from the environment, reading a `.env`
    /// file first if one is present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self {
            endpoint: required(ENV_ENDPOINT)?,
            address: required(ENV_ADDRESS)?,
            credential: required(ENV_CREDENTIAL)?,
            page_url: required(ENV_PAGE_URL)?,
            ..Self::default()
        };
        if let Ok(dir) = std::env::var(ENV_WALLET_EXTENSION) {
            config.wallet_extension_dir = Some(PathBuf::from(dir));
        }
        if let Ok(dir) = std::env::var(ENV_DOWNLOAD_DIR) {
            config.download_dir = PathBuf::from(dir);
        }
        Ok(config)
    }
}

fn required(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(HarnessError::Config(format!(
            "environment variable {name} is not set"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_reference_tunables() {
        let config = HarnessConfig::default();
        assert_eq!(config.settle_delay, Duration::from_secs(10));
        assert_eq!(config.control_timeout, Duration::from_secs(10));
        assert_eq!(config.signal_timeout, Duration::from_secs(100));
        assert_eq!(config.confirm_label, "Confirm");
        assert_eq!(config.popup_matcher, TitleMatcher::metamask());
    }

    #[test]
    fn missing_required_var_is_a_config_error() {
        // Use a name no test environment defines.
        let err = required("FS_E2E_DOES_NOT_EXIST").unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));
    }
}
