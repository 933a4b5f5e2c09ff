//! CampusDesk 前端应用
//!
//! Context 驱动的结构：
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `auth`: 会话状态接入响应式系统
//! - `components`: UI 组件层

mod auth;
mod components {
    pub mod dashboard;
    pub mod login;
    pub mod notice;
    pub mod profile;
    pub mod register;
    pub mod resource_form;
    pub mod resource_screen;
    pub mod shell;
}
pub(crate) mod web;

use crate::auth::{AuthContext, init_auth};
use crate::components::login::LoginPage;
use crate::components::register::RegisterPage;
use crate::components::shell::ShellPage;
use crate::web::route::AppRoute;
use crate::web::router::{Link, Router, RouterOutlet, use_router};
use crate::web::{BrowserHttpClient, BrowserTokenStore};

use campusdesk::{ApiClient, ApiResult, ClientConfig, DemoBackend, SessionStore};
use leptos::prelude::*;
use std::sync::Arc;

/// 组装会话：浏览器传输层外包一层演示后端，占位页面的请求在内存中完成
fn build_session(config: ClientConfig) -> ApiResult<SessionStore> {
    let transport = DemoBackend::seeded(&config.base_url).with_fallback(Arc::new(BrowserHttpClient));
    let tokens = Arc::new(BrowserTokenStore::new(config.token_key.clone()));
    let api = ApiClient::new(config, Arc::new(transport), tokens)?;
    Ok(SessionStore::new(api))
}

fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Home => view! { <ShellPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"页面未找到"</p>
                    <Link to="/" class="btn btn-link mt-4">"返回首页"</Link>
                </div>
            </div>
        }
        .into_any(),
    }
}

/// 任何请求收到 401 都回到登录页
#[component]
fn UnauthorizedRedirect() -> impl IntoView {
    let router = use_router();
    let auth = use_context::<AuthContext>();
    if let Some(auth) = auth {
        auth.api().on_unauthorized(move || router.redirect_to_login());
    }
}

#[component]
pub fn App() -> impl IntoView {
    let config = ClientConfig::from_build_env();
    log::info!("[App] API base: {}", config.base_url);

    let store = match build_session(config) {
        Ok(store) => store,
        Err(e) => {
            log::error!("[App] {}", e);
            return view! {
                <div class="flex items-center justify-center min-h-screen bg-base-200">
                    <div role="alert" class="alert alert-error max-w-lg">
                        <span>"客户端配置错误: " {e.to_string()}</span>
                    </div>
                </div>
            }
            .into_any();
        }
    };

    // 1. 创建认证上下文
    let auth_ctx = AuthContext::new(store);
    provide_context(auth_ctx);

    // 2. 用持久化的 token 恢复会话
    init_auth(&auth_ctx);

    // 3. 认证信号注入路由服务
    let is_authenticated = auth_ctx.is_authenticated_signal();
    let is_ready = auth_ctx.is_ready_signal();

    view! {
        <Router is_authenticated=is_authenticated is_ready=is_ready>
            <UnauthorizedRedirect />
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
    .into_any()
}
