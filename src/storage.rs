//! Persisted key/value strings.
//!
//! `LocalStore` wraps `window.localStorage`. `MemoryStore` stands in when the browser refuses
//! storage access (private browsing, sandboxed iframes) so the page keeps working for the session.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use web_sys::{Storage, Window};

use crate::dom::js_value_to_string;
use crate::error::StorageError;
use crate::log;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    pub fn open(window: &Window) -> Option<Self> {
        match window.local_storage() {
            Ok(Some(storage)) => Some(Self { storage }),
            Ok(None) => None,
            Err(err) => {
                log::warn("local_storage_denied", &js_value_to_string(&err));
                None
            }
        }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|err| StorageError::Rejected(js_value_to_string(&err)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|err| StorageError::Rejected(js_value_to_string(&err)))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Browser storage when available, otherwise a session-only in-memory store.
pub fn open_store(window: &Window) -> Rc<dyn KeyValueStore> {
    match LocalStore::open(window) {
        Some(store) => Rc::new(store),
        None => {
            log::warn("storage_fallback", "using in-memory store");
            Rc::new(MemoryStore::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_overwrites() {
        let store = MemoryStore::default();
        assert_eq!(store.get("portfolio-theme").unwrap(), None);

        store.set("portfolio-theme", "dark").unwrap();
        store.set("portfolio-theme", "light").unwrap();
        assert_eq!(
            store.get("portfolio-theme").unwrap().as_deref(),
            Some("light")
        );
    }
}
