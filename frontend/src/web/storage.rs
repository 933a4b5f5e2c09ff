//! LocalStorage 封装模块
//!
//! 会话 token 是唯一写入浏览器存储的数据。

use campusdesk::TokenStore;

/// 基于浏览器 LocalStorage 的 token 存储
pub struct BrowserTokenStore {
    key: String,
}

impl BrowserTokenStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl TokenStore for BrowserTokenStore {
    fn get(&self) -> Option<String> {
        Self::storage()?.get_item(&self.key).ok()?
    }

    fn set(&self, token: &str) {
        let stored = Self::storage().and_then(|s| s.set_item(&self.key, token).ok());
        if stored.is_none() {
            log::warn!("[Storage] Could not persist token under {}", self.key);
        }
    }

    fn clear(&self) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(&self.key);
        }
    }
}
