use crate::auth::{login, use_auth};
use crate::web::router::Link;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 登录与注册页共用的错误提示
#[component]
pub fn FormAlert(message: ReadSignal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.with(Option::is_some)>
            <div role="alert" class="alert alert-error text-sm py-2">
                <span>{move || message.get().unwrap_or_default()}</span>
            </div>
        </Show>
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let is_loading = move || auth.state.with(|s| s.is_loading());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_is_submitting.set(true);
        set_error_msg.set(None);

        spawn_local(async move {
            // 成功后的跳转由路由服务监听认证状态完成
            if let Err(msg) = login(&auth, email.get_untracked(), password.get_untracked()).await {
                let _ = set_error_msg.try_set(Some(msg));
            }
            let _ = set_is_submitting.try_set(false);
        });
    };

    view! {
        <Show
            when=move || !is_loading()
            fallback=|| view! {
                <div class="flex items-center justify-center min-h-screen">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </div>
            }
        >
            <div class="hero min-h-screen bg-base-200">
                <div class="hero-content flex-col w-full max-w-md">
                    <div class="text-center mb-4">
                        <h1 class="text-3xl font-bold">"CampusDesk"</h1>
                        <p class="text-base-content/70">"高校综合管理平台"</p>
                    </div>

                    <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                        <form class="card-body" on:submit=on_submit>
                            <FormAlert message=error_msg />

                            <div class="form-control">
                                <label class="label" for="email">
                                    <span class="label-text">"邮箱"</span>
                                </label>
                                <input
                                    id="email"
                                    type="email"
                                    placeholder="name@university.edu"
                                    on:input=move |ev| set_email.set(event_target_value(&ev))
                                    prop:value=email
                                    class="input input-bordered"
                                />
                            </div>
                            <div class="form-control">
                                <label class="label" for="password">
                                    <span class="label-text">"密码"</span>
                                </label>
                                <input
                                    id="password"
                                    type="password"
                                    on:input=move |ev| set_password.set(event_target_value(&ev))
                                    prop:value=password
                                    class="input input-bordered"
                                />
                            </div>
                            <div class="form-control mt-6">
                                <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                    {move || if is_submitting.get() {
                                        view! { <span class="loading loading-spinner"></span> "登录中..." }.into_any()
                                    } else {
                                        "登录".into_any()
                                    }}
                                </button>
                            </div>
                            <p class="text-sm text-center mt-2">
                                "还没有账号？" <Link to="/register" class="link link-primary">"注册"</Link>
                            </p>
                        </form>
                    </div>
                </div>
            </div>
        </Show>
    }
}
