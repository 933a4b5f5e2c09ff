//! 定时器封装模块
//!
//! 封装 `setInterval`；`Interval` 被 drop 时自动清除定时器。

use wasm_bindgen::prelude::*;

pub struct Interval {
    handle: i32,
    // 浏览器持有回调期间闭包必须存活
    _closure: Closure<dyn Fn()>,
}

impl Interval {
    /// 创建周期性定时器；拿不到 window 时返回 `None`
    pub fn new<F>(millis: u32, callback: F) -> Option<Self>
    where
        F: Fn() + 'static,
    {
        let closure = Closure::<dyn Fn()>::new(callback);
        let window = web_sys::window()?;

        let handle = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                millis.min(i32::MAX as u32) as i32,
            )
            .inspect_err(|e| log::error!("[Timer] setInterval failed: {:?}", e))
            .ok()?;

        Some(Self {
            handle,
            _closure: closure,
        })
    }

    pub fn cancel(&self) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(self.handle);
        }
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.cancel();
    }
}
