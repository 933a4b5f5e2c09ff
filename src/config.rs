use campusdesk_shared::TOKEN_STORAGE_KEY;
use std::time::Duration;

// =========================================================
// 客户端配置 (Client Configuration)
// =========================================================

/// 这些是默认值，构建时可通过同名环境变量覆盖
const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_POLL_SECS: u64 = 30;

/// 客户端配置结构体
///
/// 前端是静态 WASM 包，没有运行时环境变量，因此覆盖值在编译期通过 `option_env!` 读取。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// 后端 API 基地址，例如 `https://campus.example.edu/api`
    pub base_url: String,
    /// 持久化 token 使用的存储键
    pub token_key: String,
    /// 列表默认每页条数
    pub page_size: u32,
    /// 未读消息轮询间隔
    pub unread_poll_interval: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_key: TOKEN_STORAGE_KEY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            unread_poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
        }
    }

    /// 读取编译期覆盖值，读不到就用默认值
    pub fn from_build_env() -> Self {
        let mut config = Self::new(option_env!("CAMPUSDESK_API_URL").unwrap_or(DEFAULT_API_URL));

        if let Some(key) = option_env!("CAMPUSDESK_TOKEN_KEY") {
            config.token_key = key.to_string();
        }
        if let Some(size) = option_env!("CAMPUSDESK_PAGE_SIZE").and_then(|v| v.parse().ok()) {
            config.page_size = size;
        }
        if let Some(secs) = option_env!("CAMPUSDESK_POLL_SECS").and_then(|v| v.parse().ok()) {
            config.unread_poll_interval = Duration::from_secs(secs);
        }
        config
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_build_env()
    }
}
