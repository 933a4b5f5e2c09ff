//! 临时通知
//!
//! 请求失败或操作成功时在右上角显示一条消息，3 秒后自动清除。

use leptos::prelude::*;
use std::time::Duration;

#[derive(Clone, Copy)]
pub struct Notifier {
    /// 消息内容, 是否出错
    notice: RwSignal<Option<(String, bool)>>,
}

impl Notifier {
    pub fn provide() -> Self {
        let notifier = Self {
            notice: RwSignal::new(None),
        };
        provide_context(notifier);
        notifier
    }

    pub fn success(&self, message: impl Into<String>) {
        let _ = self.notice.try_set(Some((message.into(), false)));
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("[Notice] {}", message);
        let _ = self.notice.try_set(Some((message, true)));
    }
}

pub fn use_notifier() -> Notifier {
    use_context::<Notifier>().expect("Notifier should be provided")
}

#[component]
pub fn NoticeToast() -> impl IntoView {
    let notifier = use_notifier();
    let notice = notifier.notice;

    Effect::new(move |_| {
        if notice.with(Option::is_some) {
            set_timeout(
                move || {
                    let _ = notice.try_set(None);
                },
                Duration::from_secs(3),
            );
        }
    });

    move || {
        notice.get().map(|(message, is_err)| {
            let class = if is_err {
                "alert alert-error shadow-lg"
            } else {
                "alert alert-success shadow-lg"
            };
            view! {
                <div class="toast toast-top toast-end z-50">
                    <div class=class>
                        <span>{message}</span>
                    </div>
                </div>
            }
        })
    }
}
