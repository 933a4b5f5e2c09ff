//! CampusDesk 客户端核心
//!
//! 与平台无关的部分：带鉴权的请求分发、会话状态机、按角色的导航、通用资源 CRUD。
//! 浏览器前端（`frontend/`）只负责渲染和接入浏览器能力。

pub mod api;
pub mod config;
pub mod crud;
pub mod demo;
pub mod error;
pub mod form;
pub mod navigation;
pub mod poll;
pub mod report;
pub mod request;
pub mod session;
pub mod token;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use crud::{ListQuery, ListState, Record, ResourceCrud, record_id};
pub use demo::DemoBackend;
pub use error::{ApiError, ApiResult, SessionError, ValidationError};
pub use form::FormState;
pub use navigation::{NavState, Screen};
pub use poll::UnreadCounter;
pub use request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
#[cfg(not(target_arch = "wasm32"))]
pub use request::ReqwestHttpClient;
pub use session::{Session, SessionStatus, SessionStore};
pub use token::{MemoryTokenStore, TokenStore};

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

// =========================================================
// 锁辅助函数
// =========================================================

// 回调 panic 不应让整个客户端状态不可用，中毒后仍取出内部数据

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
