//! Pick a storage backend from the configured preference.
//!
//! Priority for Auto: localStorage → Memory (fallback).

use std::rc::Rc;

use voxdoc_core::ports::StoragePort;
use voxdoc_types::config::StorageBackendType;

use super::{BrowserLocalStorage, MemoryStorage};

/// Resolve the configured backend. Returns a trait object so callers
/// are backend-agnostic; unavailability degrades to memory.
pub fn detect_storage(preference: StorageBackendType) -> Rc<dyn StoragePort> {
    match preference {
        StorageBackendType::Memory => {
            log::info!("Storage backend: memory");
            Rc::new(MemoryStorage::new())
        }
        StorageBackendType::LocalStorage | StorageBackendType::Auto => {
            match BrowserLocalStorage::open() {
                Ok(storage) => {
                    log::info!("Storage backend: localStorage");
                    Rc::new(storage)
                }
                Err(e) => {
                    log::warn!("localStorage unavailable ({}), falling back to memory", e);
                    Rc::new(MemoryStorage::new())
                }
            }
        }
    }
}
