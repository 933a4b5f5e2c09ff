use crate::auth::{register, use_auth};
use crate::components::login::FormAlert;
use crate::web::router::Link;
use campusdesk_shared::{RegisterRequest, Role};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 注册表单状态
#[derive(Clone, Copy)]
struct RegisterForm {
    name: RwSignal<String>,
    email: RwSignal<String>,
    password: RwSignal<String>,
    role: RwSignal<Role>,
    student_id: RwSignal<String>,
    department: RwSignal<String>,
}

impl RegisterForm {
    fn new() -> Self {
        Self {
            name: RwSignal::new(String::new()),
            email: RwSignal::new(String::new()),
            password: RwSignal::new(String::new()),
            role: RwSignal::new(Role::Student),
            student_id: RwSignal::new(String::new()),
            department: RwSignal::new(String::new()),
        }
    }

    fn to_request(self) -> RegisterRequest {
        let optional = |s: RwSignal<String>| {
            let v = s.get_untracked().trim().to_string();
            (!v.is_empty()).then_some(v)
        };
        RegisterRequest {
            name: self.name.get_untracked().trim().to_string(),
            email: self.email.get_untracked().trim().to_string(),
            password: self.password.get_untracked(),
            role: self.role.get_untracked(),
            student_id: optional(self.student_id),
            department: optional(self.department),
        }
    }
}

#[component]
fn TextInput(
    id: &'static str,
    label: &'static str,
    #[prop(default = "text")] kind: &'static str,
    value: RwSignal<String>,
) -> impl IntoView {
    view! {
        <div class="form-control">
            <label class="label" for=id>
                <span class="label-text">{label}</span>
            </label>
            <input
                id=id
                type=kind
                on:input=move |ev| value.set(event_target_value(&ev))
                prop:value=move || value.get()
                class="input input-bordered"
            />
        </div>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let form = RegisterForm::new();
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_is_submitting.set(true);
        set_error_msg.set(None);

        let req = form.to_request();
        spawn_local(async move {
            if let Err(msg) = register(&auth, req).await {
                let _ = set_error_msg.try_set(Some(msg));
            }
            let _ = set_is_submitting.try_set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <h1 class="text-3xl font-bold">"创建账号"</h1>
                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <FormAlert message=error_msg />

                        <TextInput id="name" label="姓名" value=form.name />
                        <TextInput id="email" label="邮箱" kind="email" value=form.email />
                        <TextInput id="password" label="密码（至少 6 位）" kind="password" value=form.password />

                        <div class="form-control">
                            <label class="label" for="role">
                                <span class="label-text">"身份"</span>
                            </label>
                            <select
                                id="role"
                                class="select select-bordered"
                                on:change=move |ev| form.role.set(Role::parse(&event_target_value(&ev)))
                            >
                                {Role::SELECTABLE
                                    .iter()
                                    .map(|role| {
                                        let role = *role;
                                        view! {
                                            <option value=role.as_str() selected=move || form.role.get() == role>
                                                {role.label()}
                                            </option>
                                        }
                                    })
                                    .collect_view()}
                            </select>
                        </div>

                        <Show when=move || form.role.get() == Role::Student>
                            <TextInput id="student_id" label="学号" value=form.student_id />
                        </Show>
                        <TextInput id="department" label="院系（可选）" value=form.department />

                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "提交中..." }.into_any()
                                } else {
                                    "注册".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-sm text-center mt-2">
                            "已有账号？" <Link to="/login" class="link link-primary">"登录"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
