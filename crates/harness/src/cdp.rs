//! Chromium-backed [`WindowDriver`] over the DevTools protocol.
//!
//! This is the plumbing edge of the harness: launching a headful browser
//! with the wallet extension loaded, enumerating targets as the window
//! registry, and translating the page primitives into CDP calls. Everything
//! above this module is browser-agnostic.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::HarnessConfig;
use crate::driver::{WindowDriver, WindowHandle};
use crate::error::{HarnessError, Result};

/// Launches Chromium for a harness run.
///
/// The wallet extension cannot run headless, so the browser is headful.
/// Returns the driver plus the event-handler task; abort the task after
/// closing the browser.
pub async fn launch(config: &HarnessConfig) -> Result<(CdpDriver, JoinHandle<()>)> {
    let mut builder = BrowserConfig::builder()
        .with_head()
        .arg("--test-type")
        .arg("--no-sandbox")
        .arg("--start-maximized");
    if let Some(dir) = &config.wallet_extension_dir {
        builder = builder
            .arg(format!("--load-extension={}", dir.display()))
            .arg(format!("--disable-extensions-except={}", dir.display()));
    }
    let browser_config = builder.build().map_err(HarnessError::BrowserLaunch)?;

    let (browser, mut handler) = Browser::launch(browser_config).await?;
    let events = tokio::spawn(async move { while handler.next().await.is_some() {} });

    tokio::fs::create_dir_all(&config.download_dir).await?;
    debug!(downloads = %config.download_dir.display(), "browser launched");

    Ok((CdpDriver::new(browser), events))
}

/// [`WindowDriver`] over a live Chromium instance.
///
/// Targets are the window registry: every lookup re-queries the browser, so
/// a handle is only valid for the call it was resolved for.
pub struct CdpDriver {
    browser: Browser,
    /// Handle automation last switched to; CDP has no global focus notion,
    /// so the driver tracks it explicitly.
    active: Mutex<Option<WindowHandle>>,
}

impl CdpDriver {
    pub fn new(browser: Browser) -> Self {
        Self {
            browser,
            active: Mutex::new(None),
        }
    }

    /// Opens the page under test in a new window and makes it active.
    pub async fn open_page(&self, url: &str) -> Result<WindowHandle> {
        let page = self.browser.new_page(url).await?;
        let handle = WindowHandle::new(page.target_id().inner().clone());
        *self.active.lock().unwrap() = Some(handle.clone());
        Ok(handle)
    }

    /// Routes downloads for `window` into `dir` so round-trip scenarios can
    /// read the bytes back.
    pub async fn allow_downloads(&self, window: &WindowHandle, dir: &Path) -> Result<()> {
        let page = self.page(window).await?;
        let params = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::Allow)
            .download_path(dir.display().to_string())
            .build()
            .map_err(HarnessError::BrowserLaunch)?;
        page.execute(params).await?;
        Ok(())
    }

    pub async fn close(self) -> Result<()> {
        let mut browser = self.browser;
        browser.close().await?;
        browser.wait().await?;
        Ok(())
    }

    async fn page(&self, window: &WindowHandle) -> Result<Page> {
        let pages = self.browser.pages().await?;
        pages
            .into_iter()
            .find(|p| p.target_id().inner() == window.as_str())
            .ok_or_else(|| HarnessError::WindowClosed {
                handle: window.to_string(),
            })
    }

    async fn find_in(&self, window: &WindowHandle, selector: &str) -> Result<chromiumoxide::element::Element> {
        let page = self.page(window).await?;
        page.find_element(selector)
            .await
            .map_err(|_| HarnessError::ElementNotFound {
                selector: selector.to_string(),
            })
    }
}

/// JS probe for a button whose visible text contains `text`.
fn button_probe(text: &str, click: bool) -> String {
    let needle = text.replace('\\', "\\\\").replace('\'', "\\'");
    let action = if click { "{ found.click(); true }" } else { "true" };
    format!(
        "(() => {{ \
            const found = [...document.querySelectorAll('button')]\
                .find(b => (b.textContent || '').includes('{needle}')); \
            return found ? {action} : false; \
        }})()"
    )
}

#[async_trait]
impl WindowDriver for CdpDriver {
    async fn windows(&self) -> Result<Vec<WindowHandle>> {
        let pages = self.browser.pages().await?;
        Ok(pages
            .iter()
            .map(|p| WindowHandle::new(p.target_id().inner().clone()))
            .collect())
    }

    async fn active_window(&self) -> Result<WindowHandle> {
        self.active
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| HarnessError::Config("no active window; call open_page first".into()))
    }

    async fn switch_to(&self, window: &WindowHandle) -> Result<()> {
        let page = self.page(window).await?;
        page.bring_to_front().await?;
        *self.active.lock().unwrap() = Some(window.clone());
        Ok(())
    }

    async fn title(&self, window: &WindowHandle) -> Result<String> {
        let page = self.page(window).await?;
        Ok(page.get_title().await?.unwrap_or_default())
    }

    async fn goto(&self, window: &WindowHandle, url: &str) -> Result<()> {
        let page = self.page(window).await?;
        page.goto(url).await?;
        Ok(())
    }

    async fn fill(&self, window: &WindowHandle, element_id: &str, value: &str) -> Result<()> {
        let element = self.find_in(window, &format!("#{element_id}")).await?;
        element.click().await?;
        element.type_str(value).await?;
        Ok(())
    }

    async fn click(&self, window: &WindowHandle, element_id: &str) -> Result<()> {
        let element = self.find_in(window, &format!("#{element_id}")).await?;
        element.click().await?;
        Ok(())
    }

    async fn button_exists(&self, window: &WindowHandle, text: &str) -> Result<bool> {
        let page = self.page(window).await?;
        page.evaluate(button_probe(text, false))
            .await?
            .into_value::<bool>()
            .map_err(|e| HarnessError::JsEval(e.to_string()))
    }

    async fn click_button(&self, window: &WindowHandle, text: &str) -> Result<()> {
        let page = self.page(window).await?;
        let clicked = page
            .evaluate(button_probe(text, true))
            .await?
            .into_value::<bool>()
            .map_err(|e| HarnessError::JsEval(e.to_string()))?;
        if !clicked {
            return Err(HarnessError::ElementNotFound {
                selector: format!("button containing {text:?}"),
            });
        }
        Ok(())
    }
}
