//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - Storage (LocalStorage on web)

#[cfg(target_arch = "wasm32")]
pub use web_storage::LocalStorage;

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64
}

#[cfg(target_arch = "wasm32")]
mod web_storage {
    use crate::error::StoreError;
    use crate::persistence::KeyValueStore;

    fn backend_error(op: &str, err: wasm_bindgen::JsValue) -> StoreError {
        StoreError::Backend(format!("localStorage {} failed: {:?}", op, err))
    }

    /// Browser `window.localStorage`
    pub struct LocalStorage {
        storage: web_sys::Storage,
    }

    impl LocalStorage {
        /// `None` when there is no window or storage is disabled
        pub fn open() -> Option<Self> {
            let storage = web_sys::window()?.local_storage().ok()??;
            Some(Self { storage })
        }
    }

    impl KeyValueStore for LocalStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.storage
                .get_item(key)
                .map_err(|e| backend_error("get", e))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.storage
                .set_item(key, value)
                .map_err(|e| backend_error("set", e))
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.storage
                .remove_item(key)
                .map_err(|e| backend_error("remove", e))
        }
    }
}
