//! Testing infrastructure for the harness.
//!
//! Provides scripted doubles so scenario logic can be exercised without a
//! browser or a storage network:
//! - [`ScriptedDriver`]: a [`WindowDriver`] whose windows, titles and
//!   controls are scripted up front; every interaction is recorded as a
//!   [`DriverAction`] for assertions.
//! - [`MemoryStorage`]: a [`StorageClient`] over an in-memory namespace map.
//!
//! Scripting mirrors the asynchrony of the real system: windows can appear
//! after N registry snapshots, controls after N presence probes, and titles
//! can flip after N reads, after N confirm clicks, or on a trigger click.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::driver::{WindowDriver, WindowHandle};
use crate::error::{HarnessError, Result};
use crate::storage::{DirectoryEntry, StorageClient, strip_hex_prefix};

/// Action recorded by [`ScriptedDriver`] for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverAction {
    SwitchTo { window: String },
    Goto { window: String, url: String },
    Fill { window: String, element_id: String, value: String },
    Click { window: String, element_id: String },
    ClickButton { window: String, text: String },
}

#[derive(Debug, Clone)]
struct PendingWindow {
    after_list_calls: usize,
    id: String,
    title: String,
}

#[derive(Debug, Clone)]
struct TitleAfterReads {
    remaining: usize,
    title: String,
}

#[derive(Debug, Clone)]
struct TitleAfterConfirms {
    after_clicks: usize,
    window: String,
    title: String,
}

#[derive(Debug, Clone)]
struct TitleOnClick {
    element_id: String,
    window: String,
    title: String,
}

#[derive(Default)]
struct ScriptedState {
    windows: Vec<String>,
    closed: Vec<String>,
    active: String,
    titles: HashMap<String, String>,
    pending: Vec<PendingWindow>,
    list_calls: usize,
    /// (window, label) -> presence probes remaining before the button
    /// reports as rendered.
    buttons: HashMap<(String, String), usize>,
    title_after_reads: HashMap<String, TitleAfterReads>,
    title_after_confirms: Vec<TitleAfterConfirms>,
    title_on_click: Vec<TitleOnClick>,
    confirm_clicks: usize,
    actions: Vec<DriverAction>,
}

/// Scripted [`WindowDriver`] double.
pub struct ScriptedDriver {
    state: Mutex<ScriptedState>,
}

impl ScriptedDriver {
    /// Creates a driver with one open window, which is also the active one.
    pub fn new(main_id: &str, main_title: &str) -> Self {
        let mut state = ScriptedState {
            active: main_id.to_string(),
            ..Default::default()
        };
        state.windows.push(main_id.to_string());
        state.titles.insert(main_id.to_string(), main_title.to_string());
        Self {
            state: Mutex::new(state),
        }
    }

    /// Adds an already-open window.
    pub fn add_window(&self, id: &str, title: &str) {
        let mut state = self.state.lock().unwrap();
        state.windows.push(id.to_string());
        state.titles.insert(id.to_string(), title.to_string());
    }

    /// Makes a window appear once [`WindowDriver::windows`] has been called
    /// `after_list_calls` times.
    pub fn schedule_window(&self, after_list_calls: usize, id: &str, title: &str) {
        self.state.lock().unwrap().pending.push(PendingWindow {
            after_list_calls,
            id: id.to_string(),
            title: title.to_string(),
        });
    }

    /// Closes a window; subsequent switches/interactions fail.
    pub fn close_window(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        state.windows.retain(|w| w != id);
        state.closed.push(id.to_string());
    }

    /// Scripts a button with visible text `label` in `id`, reporting as
    /// rendered after `after_polls` presence probes (0 = immediately).
    pub fn set_button(&self, id: &str, label: &str, after_polls: usize) {
        self.state
            .lock()
            .unwrap()
            .buttons
            .insert((id.to_string(), label.to_string()), after_polls);
    }

    pub fn set_title(&self, id: &str, title: &str) {
        self.state
            .lock()
            .unwrap()
            .titles
            .insert(id.to_string(), title.to_string());
    }

    /// Flips the title of `id` to `title` after `reads` further title reads.
    pub fn set_title_after_reads(&self, id: &str, title: &str, reads: usize) {
        self.state.lock().unwrap().title_after_reads.insert(
            id.to_string(),
            TitleAfterReads {
                remaining: reads,
                title: title.to_string(),
            },
        );
    }

    /// Flips the title of `window` once `after_clicks` confirm-button clicks
    /// have happened, emulating the page observing the mined transaction.
    pub fn set_title_after_confirms(&self, window: &str, title: &str, after_clicks: usize) {
        self.state
            .lock()
            .unwrap()
            .title_after_confirms
            .push(TitleAfterConfirms {
                after_clicks,
                window: window.to_string(),
                title: title.to_string(),
            });
    }

    /// Flips the title of `window` when the element `element_id` is clicked,
    /// for flows with no wallet round.
    pub fn set_title_on_click(&self, element_id: &str, window: &str, title: &str) {
        self.state.lock().unwrap().title_on_click.push(TitleOnClick {
            element_id: element_id.to_string(),
            window: window.to_string(),
            title: title.to_string(),
        });
    }

    /// Everything the harness did, in order.
    pub fn actions(&self) -> Vec<DriverAction> {
        self.state.lock().unwrap().actions.clone()
    }

    /// Number of confirm-button clicks driven so far.
    pub fn confirm_clicks(&self) -> usize {
        self.state.lock().unwrap().confirm_clicks
    }

    fn known(state: &ScriptedState, window: &WindowHandle) -> Result<()> {
        if state.windows.iter().any(|w| w == window.as_str()) {
            Ok(())
        } else {
            Err(HarnessError::WindowClosed {
                handle: window.to_string(),
            })
        }
    }
}

#[async_trait]
impl WindowDriver for ScriptedDriver {
    async fn windows(&self) -> Result<Vec<WindowHandle>> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        let due: Vec<PendingWindow> = {
            let calls = state.list_calls;
            let (due, waiting) = state
                .pending
                .drain(..)
                .partition(|p| p.after_list_calls <= calls);
            state.pending = waiting;
            due
        };
        for p in due {
            state.windows.push(p.id.clone());
            state.titles.insert(p.id, p.title);
        }
        Ok(state.windows.iter().map(WindowHandle::new).collect())
    }

    async fn active_window(&self) -> Result<WindowHandle> {
        Ok(WindowHandle::new(self.state.lock().unwrap().active.clone()))
    }

    async fn switch_to(&self, window: &WindowHandle) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::known(&state, window)?;
        state.active = window.as_str().to_string();
        state.actions.push(DriverAction::SwitchTo {
            window: window.to_string(),
        });
        Ok(())
    }

    async fn title(&self, window: &WindowHandle) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        Self::known(&state, window)?;
        if let Some(rule) = state.title_after_reads.get_mut(window.as_str()) {
            if rule.remaining == 0 {
                let title = rule.title.clone();
                state.title_after_reads.remove(window.as_str());
                state.titles.insert(window.as_str().to_string(), title);
            } else {
                rule.remaining -= 1;
            }
        }
        Ok(state
            .titles
            .get(window.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn goto(&self, window: &WindowHandle, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::known(&state, window)?;
        state.actions.push(DriverAction::Goto {
            window: window.to_string(),
            url: url.to_string(),
        });
        Ok(())
    }

    async fn fill(&self, window: &WindowHandle, element_id: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::known(&state, window)?;
        state.actions.push(DriverAction::Fill {
            window: window.to_string(),
            element_id: element_id.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    async fn click(&self, window: &WindowHandle, element_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::known(&state, window)?;
        state.actions.push(DriverAction::Click {
            window: window.to_string(),
            element_id: element_id.to_string(),
        });
        let rules: Vec<TitleOnClick> = state
            .title_on_click
            .iter()
            .filter(|r| r.element_id == element_id)
            .cloned()
            .collect();
        for rule in rules {
            state.titles.insert(rule.window, rule.title);
        }
        Ok(())
    }

    async fn button_exists(&self, window: &WindowHandle, text: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        Self::known(&state, window)?;
        let key = (window.as_str().to_string(), text.to_string());
        match state.buttons.get_mut(&key) {
            None => Ok(false),
            Some(0) => Ok(true),
            Some(remaining) => {
                *remaining -= 1;
                Ok(false)
            }
        }
    }

    async fn click_button(&self, window: &WindowHandle, text: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::known(&state, window)?;
        state.actions.push(DriverAction::ClickButton {
            window: window.to_string(),
            text: text.to_string(),
        });
        state.confirm_clicks += 1;
        let clicks = state.confirm_clicks;
        let rules: Vec<TitleAfterConfirms> = state
            .title_after_confirms
            .iter()
            .filter(|r| r.after_clicks == clicks)
            .cloned()
            .collect();
        for rule in rules {
            state.titles.insert(rule.window, rule.title);
        }
        Ok(())
    }
}

#[derive(Default)]
struct MemoryState {
    listings: HashMap<String, Vec<DirectoryEntry>>,
    bytes: HashMap<(String, String), Vec<u8>>,
}

/// In-memory [`StorageClient`] double.
///
/// Namespaces are keyed by owner address without the `0x` prefix, so calls
/// with and without the prefix address the same namespace, as on the real
/// network.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a fully uploaded file, as the backend would show it once the
    /// transaction is mined.
    pub fn seed_file(&self, owner: &str, name: &str, uploading_progress: u8) {
        let mut state = self.state.lock().unwrap();
        state
            .listings
            .entry(strip_hex_prefix(owner).to_string())
            .or_default()
            .push(DirectoryEntry::file(name, uploading_progress));
    }

    pub fn seed_directory(&self, owner: &str, name: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .listings
            .entry(strip_hex_prefix(owner).to_string())
            .or_default()
            .push(DirectoryEntry::directory(name));
    }

    /// Bytes last uploaded as `name` under `owner`, if the file exists.
    pub fn file_bytes(&self, owner: &str, name: &str) -> Option<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .bytes
            .get(&(strip_hex_prefix(owner).to_string(), name.to_string()))
            .cloned()
    }
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn upload_file(
        &self,
        owner: &str,
        name: &str,
        bytes: &[u8],
        _credential: &str,
    ) -> Result<String> {
        let owner = strip_hex_prefix(owner).to_string();
        let mut state = self.state.lock().unwrap();
        state
            .listings
            .entry(owner.clone())
            .or_default()
            .push(DirectoryEntry::file(name, 100));
        state
            .bytes
            .insert((owner.clone(), name.to_string()), bytes.to_vec());
        Ok(format!("{owner}/{name}"))
    }

    async fn delete_file(&self, owner: &str, name: &str, _credential: &str) -> Result<()> {
        let owner = strip_hex_prefix(owner);
        let mut state = self.state.lock().unwrap();
        let listing = state
            .listings
            .get_mut(owner)
            .ok_or_else(|| HarnessError::Storage(format!("unknown namespace: {owner}")))?;
        let before = listing.len();
        listing.retain(|e| !(e.name == name && e.is_file));
        if listing.len() == before {
            return Err(HarnessError::Storage(format!("no such file: {name}")));
        }
        state.bytes.remove(&(owner.to_string(), name.to_string()));
        Ok(())
    }

    async fn create_directory(&self, owner: &str, name: &str, _credential: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .listings
            .entry(strip_hex_prefix(owner).to_string())
            .or_default()
            .push(DirectoryEntry::directory(name));
        Ok(())
    }

    async fn delete_directory(&self, owner: &str, name: &str, _credential: &str) -> Result<()> {
        let owner = strip_hex_prefix(owner);
        let mut state = self.state.lock().unwrap();
        let listing = state
            .listings
            .get_mut(owner)
            .ok_or_else(|| HarnessError::Storage(format!("unknown namespace: {owner}")))?;
        let before = listing.len();
        listing.retain(|e| !(e.name == name && !e.is_file));
        if listing.len() == before {
            return Err(HarnessError::Storage(format!("no such directory: {name}")));
        }
        Ok(())
    }

    async fn list_directory(&self, owner: &str) -> Result<Vec<DirectoryEntry>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .listings
            .get(strip_hex_prefix(owner))
            .cloned()
            .unwrap_or_default())
    }
}
