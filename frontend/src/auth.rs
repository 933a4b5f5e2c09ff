//! 认证模块
//!
//! 把核心库的 `SessionStore` 接入响应式系统：
//! 会话每次整体替换都推送到信号，路由和导航外壳只读取信号。

use campusdesk::{ApiClient, ClientConfig, Session, SessionStore};
use campusdesk_shared::{RegisterRequest, Role, User};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 认证上下文
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 会话快照（只读）
    pub state: ReadSignal<Session>,
    store: StoredValue<SessionStore>,
}

impl AuthContext {
    pub fn new(store: SessionStore) -> Self {
        let (state, set_state) = signal(store.snapshot());
        store.subscribe(move |session| {
            let _ = set_state.try_set(session.clone());
        });
        Self {
            state,
            store: StoredValue::new(store),
        }
    }

    /// 认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.with(Session::is_authenticated))
    }

    /// 会话恢复是否结束
    pub fn is_ready_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || !state.with(Session::is_loading))
    }

    pub fn role_signal(&self) -> Signal<Option<Role>> {
        let state = self.state;
        Signal::derive(move || state.with(Session::role))
    }

    pub fn user_signal(&self) -> Signal<Option<User>> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.current_user.clone()))
    }

    pub fn store(&self) -> SessionStore {
        self.store.get_value()
    }

    pub fn api(&self) -> ApiClient {
        self.store.with_value(|s| s.api().clone())
    }

    pub fn config(&self) -> ClientConfig {
        self.store.with_value(|s| s.api().config().clone())
    }
}

pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 启动时用持久化的 token 恢复会话
pub fn init_auth(ctx: &AuthContext) {
    let store = ctx.store();
    spawn_local(async move {
        let session = store.hydrate().await;
        log::info!("[Auth] Hydrated: {:?}", session.status);
    });
}

/// 登录；失败时返回展示在表单上的消息
pub async fn login(ctx: &AuthContext, email: String, password: String) -> Result<(), String> {
    ctx.store()
        .login(&email, &password)
        .await
        .map(|user| log::info!("[Auth] Logged in as {}", user.email))
        .map_err(|e| e.message())
}

pub async fn register(ctx: &AuthContext, req: RegisterRequest) -> Result<(), String> {
    ctx.store()
        .register(req)
        .await
        .map(|user| log::info!("[Auth] Registered {}", user.email))
        .map_err(|e| e.message())
}

/// 注销
///
/// 导航由路由服务监听认证状态自动完成。
pub fn logout(ctx: &AuthContext) {
    ctx.store().logout();
}
