//! 未读消息计数
//!
//! 导航外壳定时调用 `refresh`；请求失败时保留上一次的值。

use crate::api::ApiClient;
use crate::error::ApiResult;
use crate::{read_lock, write_lock};
use campusdesk_shared::UnreadCountRequest;
use std::sync::{Arc, RwLock};

type CountListener = Arc<dyn Fn(u32) + Send + Sync>;

#[derive(Clone)]
pub struct UnreadCounter {
    api: ApiClient,
    count: Arc<RwLock<u32>>,
    listeners: Arc<RwLock<Vec<CountListener>>>,
}

impl UnreadCounter {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            count: Arc::new(RwLock::new(0)),
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn count(&self) -> u32 {
        *read_lock(&self.count)
    }

    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        write_lock(&self.listeners).push(Arc::new(listener));
    }

    /// 拉取一次未读数
    pub async fn refresh(&self) -> ApiResult<u32> {
        match self.api.send(&UnreadCountRequest).await {
            Ok(unread) => {
                self.set(unread.count);
                Ok(unread.count)
            }
            Err(e) => {
                log::warn!("[Unread] refresh failed, keeping {}: {}", self.count(), e);
                Err(e)
            }
        }
    }

    /// 登出后归零
    pub fn reset(&self) {
        self.set(0);
    }

    fn set(&self, value: u32) {
        {
            let mut count = write_lock(&self.count);
            if *count == value {
                return;
            }
            *count = value;
        }
        let listeners: Vec<CountListener> = read_lock(&self.listeners).clone();
        for listener in listeners {
            listener(value);
        }
    }
}
