//! 导航外壳
//!
//! 菜单由当前角色查询能力表一次得到；各功能页面内部不再判断角色。
//! 外壳存续期间定时轮询未读消息数。

use crate::auth::{logout, use_auth};
use crate::components::dashboard::DashboardPanel;
use crate::components::notice::{NoticeToast, Notifier};
use crate::components::profile::ProfilePanel;
use crate::components::resource_screen::ResourceScreen;
use crate::web::Interval;
use campusdesk::{NavState, Screen, UnreadCounter};
use leptos::prelude::*;
use leptos::task::spawn_local;

fn screen_view(screen: Option<Screen>, nav: RwSignal<NavState>, unread: RwSignal<u32>) -> AnyView {
    match screen {
        None => view! {
            <div role="alert" class="alert alert-warning">
                <span>"当前身份没有可用的功能模块，请联系管理员。"</span>
            </div>
        }
        .into_any(),
        Some(Screen::Dashboard) => view! { <DashboardPanel nav=nav unread=unread /> }.into_any(),
        Some(Screen::MyProfile) => view! { <ProfilePanel /> }.into_any(),
        Some(screen) => match screen.schema() {
            Some(schema) => view! { <ResourceScreen schema=schema /> }.into_any(),
            None => view! { <p>{screen.label()}</p> }.into_any(),
        },
    }
}

#[component]
pub fn ShellPage() -> impl IntoView {
    let auth = use_auth();
    Notifier::provide();

    // 1. 导航状态随角色变化
    let role = auth.role_signal();
    let nav = RwSignal::new(NavState::for_role(role.get_untracked()));
    Effect::new(move |_| {
        let role = role.get();
        nav.update(|n| n.set_role(role));
    });
    let active = Memo::new(move |_| nav.with(NavState::active));

    // 2. 未读消息轮询
    let unread = RwSignal::new(0u32);
    let counter = UnreadCounter::new(auth.api());
    counter.subscribe(move |n| {
        let _ = unread.try_set(n);
    });
    let counter = StoredValue::new(counter);
    let refresh = move || {
        let counter = counter.get_value();
        spawn_local(async move {
            let _ = counter.refresh().await;
        });
    };
    refresh();

    let millis = auth.config().unread_poll_interval.as_millis().min(u32::MAX as u128) as u32;
    let poller = StoredValue::new_local(Interval::new(millis, refresh));
    on_cleanup(move || poller.dispose());

    let on_logout = move |_| {
        counter.with_value(UnreadCounter::reset);
        logout(&auth);
    };

    let user_name = move || {
        auth.user_signal()
            .with(|u| u.as_ref().map(|u| u.display_name().to_string()).unwrap_or_default())
    };
    let role_label = move || role.get().map(|r| r.label()).unwrap_or_default();
    let can_message = move || nav.with(|n| n.tabs().contains(&Screen::Messages));

    view! {
        <div class="min-h-screen bg-base-200 font-sans">
            <NoticeToast />

            <div class="navbar bg-base-100 shadow-xl px-4">
                <div class="flex-1 gap-2">
                    <span class="text-xl font-bold">"CampusDesk"</span>
                    <span class="badge badge-neutral hidden md:inline-flex">{role_label}</span>
                </div>
                <div class="flex-none gap-2">
                    <Show when=can_message>
                        <button
                            class="btn btn-ghost"
                            on:click=move |_| {
                                nav.update(|n| {
                                    n.select(Screen::Messages);
                                });
                            }
                        >
                            "消息"
                            <Show when=move || { unread.get() > 0 }>
                                <span class="badge badge-secondary">{move || unread.get()}</span>
                            </Show>
                        </button>
                    </Show>
                    <span class="hidden md:inline">{user_name}</span>
                    <button on:click=on_logout class="btn btn-outline btn-error">
                        "退出登录"
                    </button>
                </div>
            </div>

            <div class="flex flex-col md:flex-row gap-6 p-4 md:p-8">
                <ul class="menu bg-base-100 rounded-box shadow w-full md:w-56 shrink-0">
                    <For
                        each=move || nav.with(|n| n.tabs().to_vec())
                        key=|screen| *screen
                        children=move |screen| {
                            view! {
                                <li>
                                    <a
                                        class=move || if active.get() == Some(screen) { "active" } else { "" }
                                        on:click=move |_| {
                                            nav.update(|n| {
                                                n.select(screen);
                                            });
                                        }
                                    >
                                        {screen.label()}
                                    </a>
                                </li>
                            }
                        }
                    />
                </ul>

                <main class="flex-1 min-w-0">
                    {move || screen_view(active.get(), nav, unread)}
                </main>
            </div>
        </div>
    }
}
