//! localStorage backend.
//! Persistent across page reloads; the session blob is one small JSON
//! record, well inside the localStorage quota.

use async_trait::async_trait;
use web_sys::Storage;

use voxdoc_core::ports::StoragePort;
use voxdoc_types::{Result, VoxError};

use crate::js_error_text;

pub struct BrowserLocalStorage {
    storage: Storage,
}

impl BrowserLocalStorage {
    /// Fails when localStorage is absent or blocked (private browsing
    /// modes, sandboxed frames); callers fall back to memory.
    pub fn open() -> Result<Self> {
        let window =
            web_sys::window().ok_or_else(|| VoxError::Storage("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| VoxError::Storage(js_error_text(&e)))?
            .ok_or_else(|| VoxError::Storage("localStorage unavailable".to_string()))?;
        Ok(Self { storage })
    }
}

#[async_trait(?Send)]
impl StoragePort for BrowserLocalStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| VoxError::Storage(js_error_text(&e)))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| VoxError::Storage(js_error_text(&e)))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| VoxError::Storage(js_error_text(&e)))
    }

    fn backend_name(&self) -> &str {
        "localstorage"
    }
}
