use crate::auth::use_auth;
use campusdesk::{NavState, Screen};
use leptos::prelude::*;

/// 概览页：身份信息、未读消息和常用入口
#[component]
pub fn DashboardPanel(nav: RwSignal<NavState>, unread: RwSignal<u32>) -> impl IntoView {
    let auth = use_auth();
    let user = auth.user_signal();

    let greeting = move || {
        user.with(|u| {
            u.as_ref()
                .map(|u| format!("欢迎回来，{}", u.display_name()))
                .unwrap_or_default()
        })
    };
    let role_label = move || user.with(|u| u.as_ref().map(|u| u.role.label()).unwrap_or_default());

    // 除概览本身以外的可用页面
    let shortcuts = move || {
        nav.with(|n| {
            n.tabs()
                .iter()
                .copied()
                .filter(|s| *s != Screen::Dashboard)
                .collect::<Vec<_>>()
        })
    };
    let module_count = move || shortcuts().len();

    view! {
        <div class="space-y-8">
            <div>
                <h2 class="text-2xl font-bold">{greeting}</h2>
                <p class="text-base-content/70">{role_label}</p>
            </div>

            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <div class="stat">
                    <div class="stat-title">"可用模块"</div>
                    <div class="stat-value text-primary">{module_count}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"未读消息"</div>
                    <div class="stat-value text-secondary">{move || unread.get()}</div>
                    <div class="stat-desc">"定时刷新"</div>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"快捷入口"</h3>
                    <div class="grid grid-cols-2 md:grid-cols-4 gap-3">
                        <For
                            each=shortcuts
                            key=|screen| *screen
                            children=move |screen| {
                                view! {
                                    <button
                                        class="btn btn-outline"
                                        on:click=move |_| {
                                            nav.update(|n| {
                                                n.select(screen);
                                            });
                                        }
                                    >
                                        {screen.label()}
                                    </button>
                                }
                            }
                        />
                    </div>
                </div>
            </div>
        </div>
    }
}
