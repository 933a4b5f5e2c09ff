//! 浏览器能力封装
//!
//! 对浏览器原生 API 的轻量封装：fetch、LocalStorage、定时器、History、下载。

pub mod download;
mod http;
pub mod route;
pub mod router;
mod storage;
mod timer;

pub use http::BrowserHttpClient;
pub use storage::BrowserTokenStore;
pub use timer::Interval;
