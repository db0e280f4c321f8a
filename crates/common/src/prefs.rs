//! Durable UI preference storage.
//!
//! Page size, current page, and the preferred camera device were browser
//! local-storage keys in the web client; here they live in a `prefs.json`
//! document. Reads are null-safe (missing or corrupt storage yields
//! defaults) and writes are best-effort: a preference that fails to persist
//! is logged and dropped, never surfaced to the caller.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use repairhub_domain::constants::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const PREFS_FILE: &str = "prefs.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_camera_device_id: Option<String>,
}

/// File-backed preference store with an in-memory working copy.
pub struct PreferenceStore {
    path: PathBuf,
    state: Mutex<Preferences>,
}

impl PreferenceStore {
    /// Open the store backed by `prefs.json` inside `dir`, loading whatever
    /// is already persisted. Unreadable storage starts from defaults.
    pub async fn open(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(PREFS_FILE);
        let state = match tokio::fs::read(&path).await {
            Ok(raw) => match serde_json::from_slice(&raw) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!(error = %e, "preference file unreadable, using defaults");
                    Preferences::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Preferences::default(),
            Err(e) => {
                warn!(error = %e, "preference file inaccessible, using defaults");
                Preferences::default()
            }
        };

        Self { path, state: Mutex::new(state) }
    }

    /// Rows per page for list views.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.lock().page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub async fn set_page_size(&self, size: u32) {
        self.lock().page_size = Some(size);
        self.persist().await;
    }

    /// Last visited list page (1-based).
    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.lock().current_page.unwrap_or(DEFAULT_PAGE)
    }

    pub async fn set_current_page(&self, page: u32) {
        self.lock().current_page = Some(page);
        self.persist().await;
    }

    /// Preferred camera device id for photo capture, if one was ever chosen.
    #[must_use]
    pub fn default_camera_device(&self) -> Option<String> {
        self.lock().default_camera_device_id.clone()
    }

    pub async fn set_default_camera_device(&self, device_id: impl Into<String>) {
        self.lock().default_camera_device_id = Some(device_id.into());
        self.persist().await;
    }

    /// Forget the preferred camera, e.g. after the device disappears.
    pub async fn clear_default_camera_device(&self) {
        self.lock().default_camera_device_id = None;
        self.persist().await;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Preferences> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn persist(&self) {
        let body = {
            let state = self.lock();
            match serde_json::to_vec_pretty(&*state) {
                Ok(body) => body,
                Err(e) => {
                    warn!(error = %e, "failed to serialize preferences");
                    return;
                }
            }
        };

        if let Some(parent) = self.path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!(error = %e, "failed to create preference dir");
                return;
            }
        }
        if let Err(e) = tokio::fs::write(&self.path, body).await {
            warn!(error = %e, "failed to persist preferences");
            return;
        }
        debug!(path = %self.path.display(), "preferences persisted");
    }
}
