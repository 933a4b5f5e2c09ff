//! Token 持久化抽象
//!
//! 会话 token 是唯一持久化到客户端的状态。浏览器端由 LocalStorage 实现，
//! 测试和原生目标使用内存实现。

use crate::{read_lock, write_lock};
use std::sync::RwLock;

pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);
}

/// 内存中的 token 存储
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        read_lock(&self.token).clone()
    }

    fn set(&self, token: &str) {
        *write_lock(&self.token) = Some(token.to_string());
    }

    fn clear(&self) {
        *write_lock(&self.token) = None;
    }
}
