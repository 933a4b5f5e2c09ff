//! 路由服务模块 - 核心引擎
//!
//! 所有对 window.history 的操作都集中在此模块。
//! 导航流程："监听 -> 验证 -> 处理 -> 加载"。
//! 会话仍在恢复（Loading）时不做守卫跳转，避免刷新页面时被踢回登录页。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::AppRoute;

fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

fn push_history_state(path: &str) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
    }
}

fn replace_history_state(path: &str) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
    }
}

/// 路由器服务
///
/// 认证状态通过注入的信号获得，与会话实现解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    is_authenticated: Signal<bool>,
    /// 会话是否已结束恢复
    is_ready: Signal<bool>,
}

impl RouterService {
    fn new(is_authenticated: Signal<bool>, is_ready: Signal<bool>) -> Self {
        let (current_route, set_route) = signal(AppRoute::from_path(&current_path()));
        Self {
            current_route,
            set_route,
            is_authenticated,
            is_ready,
        }
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// 导航与守卫
    pub fn navigate(&self, path: &str) {
        self.navigate_to_route(AppRoute::from_path(path), true);
    }

    /// 会话失效后回到登录页（任何页面收到 401 都会走到这里）
    pub fn redirect_to_login(&self) {
        let redirect = AppRoute::auth_failure_redirect();
        if self.current_route.get_untracked() != redirect {
            log::info!("[Router] Session ended. Redirecting to {}.", redirect);
            replace_history_state(redirect.to_path());
            self.set_route.set(redirect);
        }
    }

    fn go(&self, route: AppRoute, use_push: bool) {
        if use_push {
            push_history_state(route.to_path());
        } else {
            replace_history_state(route.to_path());
        }
        self.set_route.set(route);
    }

    fn navigate_to_route(&self, target_route: AppRoute, use_push: bool) {
        let is_auth = self.is_authenticated.get_untracked();
        let is_ready = self.is_ready.get_untracked();

        // --- Step 1: 验证目标路由 ---
        if is_ready && target_route.requires_auth() && !is_auth {
            log::info!("[Router] Access Denied. Redirecting to Login.");
            self.go(AppRoute::auth_failure_redirect(), use_push);
            return;
        }

        if target_route.should_redirect_when_authenticated() && is_auth {
            log::info!("[Router] Already authenticated. Redirecting to Home.");
            self.go(AppRoute::auth_success_redirect(), use_push);
            return;
        }

        // --- Step 2: 加载页面 ---
        self.go(target_route, use_push);
    }

    /// 浏览器后退/前进按钮
    fn init_popstate_listener(&self) {
        let router = *self;
        let closure = Closure::<dyn Fn()>::new(move || {
            router.navigate_to_route(AppRoute::from_path(&current_path()), false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 监听器与应用同生命周期
        closure.forget();
    }

    /// 认证状态变化时自动重定向
    fn setup_auth_redirect(&self) {
        let router = *self;

        Effect::new(move |_| {
            let is_auth = router.is_authenticated.get();
            if !router.is_ready.get() {
                return;
            }
            let route = router.current_route.get_untracked();

            if is_auth && route.should_redirect_when_authenticated() {
                log::info!("[Router] Auth state changed: logged in.");
                router.go(AppRoute::auth_success_redirect(), true);
            } else if !is_auth && route.requires_auth() {
                log::info!("[Router] Auth state changed: logged out.");
                router.go(AppRoute::auth_failure_redirect(), false);
            }
        });
    }
}

fn provide_router(is_authenticated: Signal<bool>, is_ready: Signal<bool>) -> RouterService {
    let router = RouterService::new(is_authenticated, is_ready);
    router.init_popstate_listener();
    router.setup_auth_redirect();
    provide_context(router);
    router
}

pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

#[component]
pub fn Router(
    is_authenticated: Signal<bool>,
    is_ready: Signal<bool>,
    children: Children,
) -> impl IntoView {
    provide_router(is_authenticated, is_ready);
    children()
}

/// 根据当前路由渲染对应的组件
#[component]
pub fn RouterOutlet(matcher: fn(AppRoute) -> AnyView) -> impl IntoView {
    let router = use_router();

    move || matcher(router.current_route().get())
}

/// 站内链接，点击时走路由守卫而不是整页跳转
#[component]
pub fn Link(
    #[prop(into)] to: String,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let target = to.clone();
    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate(&target);
    };

    view! {
        <a href=to class=class on:click=on_click>
            {children()}
        </a>
    }
}
