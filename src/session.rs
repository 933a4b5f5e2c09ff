//! 会话状态模块
//!
//! `SessionStore` 是会话的唯一所有者。状态机：
//! `Loading -> {Authenticated, Unauthenticated}`，`Authenticated -> Unauthenticated`。
//! 其他组件只能读取快照或订阅变化，不能直接修改。

use crate::api::ApiClient;
use crate::error::{ApiError, SessionError, ValidationError};
use crate::{read_lock, write_lock};
use campusdesk_shared::{AuthResponse, LoginRequest, MeRequest, RegisterRequest, Role, User};
use std::sync::{Arc, RwLock, Weak};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Authenticated,
    Unauthenticated,
}

/// 会话快照，整体替换，不做局部修改
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub status: SessionStatus,
    pub current_user: Option<User>,
}

impl Session {
    pub fn loading() -> Self {
        Self {
            status: SessionStatus::Loading,
            current_user: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            current_user: None,
        }
    }

    pub fn authenticated(user: User) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            current_user: Some(user),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    pub fn role(&self) -> Option<Role> {
        self.current_user.as_ref().map(|u| u.role)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::loading()
    }
}

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

struct SessionInner {
    api: ApiClient,
    state: RwLock<Session>,
    listeners: RwLock<Vec<Listener>>,
}

impl SessionInner {
    /// 整体替换会话；与当前值相同时不通知
    fn replace(&self, next: Session) {
        {
            let mut state = write_lock(&self.state);
            if *state == next {
                return;
            }
            log::info!("[Session] {:?} -> {:?}", state.status, next.status);
            *state = next.clone();
        }

        let listeners: Vec<Listener> = read_lock(&self.listeners).clone();
        for listener in listeners {
            listener(&next);
        }
    }
}

/// 会话存储
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl SessionStore {
    pub fn new(api: ApiClient) -> Self {
        let inner = Arc::new(SessionInner {
            api,
            state: RwLock::new(Session::loading()),
            listeners: RwLock::new(Vec::new()),
        });

        // ApiClient 持有回调，回调只持有弱引用，避免循环引用
        let weak: Weak<SessionInner> = Arc::downgrade(&inner);
        inner.api.on_unauthorized(move || {
            if let Some(inner) = weak.upgrade() {
                inner.replace(Session::unauthenticated());
            }
        });

        Self { inner }
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn snapshot(&self) -> Session {
        read_lock(&self.inner.state).clone()
    }

    pub fn current_user(&self) -> Option<User> {
        read_lock(&self.inner.state).current_user.clone()
    }

    /// 订阅会话变化，回调收到新的完整快照
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        write_lock(&self.inner.listeners).push(Arc::new(listener));
    }

    /// 用持久化的 token 换取当前身份
    pub async fn hydrate(&self) -> Session {
        if self.inner.api.current_token().is_none() {
            self.inner.replace(Session::unauthenticated());
            return self.snapshot();
        }

        self.inner.replace(Session::loading());
        match self.inner.api.send(&MeRequest).await {
            Ok(me) => {
                let user = me.into_user();
                log::info!("[Session] Restored session for {}", user.email);
                self.inner.replace(Session::authenticated(user));
            }
            Err(e) => {
                log::warn!("[Session] Could not restore session: {}", e);
                // 401 时 ApiClient 已经清除了 token
                if !e.is_unauthorized() {
                    self.inner.api.tokens().clear();
                }
                self.inner.replace(Session::unauthenticated());
            }
        }
        self.snapshot()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let req = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        if let Err(e) = validate_login(&req) {
            self.settle_failure();
            return Err(e.into());
        }

        let result = self.inner.api.send(&req).await;
        self.accept(result)
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<User, SessionError> {
        if let Err(e) = validate_registration(&req) {
            self.settle_failure();
            return Err(e.into());
        }

        let result = self.inner.api.send(&req).await;
        self.accept(result)
    }

    /// 同步清除 token 与身份，无需等待后端
    pub fn logout(&self) {
        self.inner.api.tokens().clear();
        self.inner.replace(Session::unauthenticated());
    }

    fn accept(&self, result: Result<AuthResponse, ApiError>) -> Result<User, SessionError> {
        match result {
            Ok(auth) if !auth.token.is_empty() => {
                self.inner.api.tokens().set(&auth.token);
                self.inner.replace(Session::authenticated(auth.user.clone()));
                Ok(auth.user)
            }
            Ok(_) => {
                self.settle_failure();
                Err(ApiError::Decode("后端未返回 token".to_string()).into())
            }
            Err(e) => {
                log::warn!("[Session] Authentication failed: {}", e);
                self.settle_failure();
                Err(e.into())
            }
        }
    }

    /// 失败时从 Loading 落到 Unauthenticated；已登录的会话保持不变
    fn settle_failure(&self) {
        if !self.snapshot().is_authenticated() {
            self.inner.replace(Session::unauthenticated());
        }
    }
}

// =========================================================
// 客户端校验
// =========================================================

fn validate_email(field: &str, email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    if !email.contains('@') {
        return Err(ValidationError::invalid(field, "邮箱格式不正确"));
    }
    Ok(())
}

pub fn validate_login(req: &LoginRequest) -> Result<(), ValidationError> {
    validate_email("email", &req.email)?;
    if req.password.is_empty() {
        return Err(ValidationError::required("password"));
    }
    Ok(())
}

pub fn validate_registration(req: &RegisterRequest) -> Result<(), ValidationError> {
    if req.name.trim().is_empty() {
        return Err(ValidationError::required("name"));
    }
    validate_email("email", &req.email)?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::invalid(
            "password",
            format!("密码至少 {} 位", MIN_PASSWORD_LEN),
        ));
    }
    if req.role == Role::Unknown {
        return Err(ValidationError::required("role"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::client_with;
    use crate::request::HttpMethod;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn user_json(role: &str) -> serde_json::Value {
        json!({"id": "u1", "name": "Ada", "email": "ada@uni.edu", "role": role})
    }

    #[tokio::test]
    async fn login_success_authenticates_and_persists_token() {
        let (api, mock, _) = client_with(None);
        mock.mock_response(
            HttpMethod::Post,
            "http://api.test/auth/login",
            200,
            json!({"token": "jwt-1", "user": user_json("student")}),
        );
        let store = SessionStore::new(api.clone());
        assert!(store.snapshot().is_loading());

        let user = store.login("ada@uni.edu", "secret").await.unwrap();

        assert_eq!(user.role, Role::Student);
        assert!(store.snapshot().is_authenticated());
        assert_eq!(api.current_token().as_deref(), Some("jwt-1"));

        // 之后的请求携带新 token
        api.request(HttpMethod::Get, "/courses", None, &[]).await.unwrap();
        assert_eq!(mock.last().unwrap().header("Authorization"), Some("Bearer jwt-1"));
    }

    #[tokio::test]
    async fn login_tolerates_textual_profile_fields() {
        let (api, mock, _) = client_with(None);
        let mut user = user_json("student");
        user["profile"] = json!({"student_id": "S-1", "year": "3"});
        mock.mock_response(
            HttpMethod::Post,
            "http://api.test/auth/login",
            200,
            json!({"token": "jwt", "user": user}),
        );
        let store = SessionStore::new(api.clone());

        let user = store.login("ada@uni.edu", "secret").await.unwrap();

        assert_eq!(user.profile.and_then(|p| p.year).as_deref(), Some("3"));
        assert!(store.snapshot().is_authenticated());
        assert_eq!(api.current_token().as_deref(), Some("jwt"));
    }

    #[tokio::test]
    async fn login_failure_surfaces_backend_message() {
        let (api, mock, _) = client_with(None);
        mock.mock_response(
            HttpMethod::Post,
            "http://api.test/auth/login",
            401,
            json!({"message": "Invalid email or password"}),
        );
        let store = SessionStore::new(api.clone());

        let err = store.login("ada@uni.edu", "wrong").await.unwrap_err();

        assert_eq!(err.message(), "Invalid email or password");
        assert_eq!(store.snapshot(), Session::unauthenticated());
        assert_eq!(api.current_token(), None);
    }

    #[tokio::test]
    async fn login_rejected_client_side_sends_nothing() {
        let (api, mock, _) = client_with(None);
        let store = SessionStore::new(api);

        let err = store.login("not-an-email", "pw").await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(ValidationError::Invalid { .. })));

        let err = store.login("a@uni.edu", "").await.unwrap_err();
        assert_eq!(err, SessionError::Validation(ValidationError::required("password")));

        assert!(mock.sent().is_empty());
        assert_eq!(store.snapshot().status, SessionStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn empty_token_is_treated_as_failure() {
        let (api, mock, _) = client_with(None);
        mock.mock_response(
            HttpMethod::Post,
            "http://api.test/auth/login",
            200,
            json!({"token": "", "user": user_json("admin")}),
        );
        let store = SessionStore::new(api.clone());

        assert!(store.login("a@uni.edu", "pw").await.is_err());
        assert!(!store.snapshot().is_authenticated());
        assert_eq!(api.current_token(), None);
    }

    #[tokio::test]
    async fn register_uses_registration_endpoint() {
        let (api, mock, _) = client_with(None);
        mock.mock_response(
            HttpMethod::Post,
            "http://api.test/auth/register",
            201,
            json!({"token": "jwt-r", "user": user_json("clinic")}),
        );
        let store = SessionStore::new(api.clone());

        let req = RegisterRequest {
            name: "Nurse Joy".into(),
            email: "joy@uni.edu".into(),
            password: "longenough".into(),
            role: Role::Clinic,
            student_id: None,
            department: None,
        };
        let user = store.register(req).await.unwrap();

        assert_eq!(user.role, Role::Clinic);
        assert_eq!(api.current_token().as_deref(), Some("jwt-r"));
        assert_eq!(mock.last().unwrap().url, "http://api.test/auth/register");
    }

    #[tokio::test]
    async fn register_validates_password_length() {
        let (api, _, _) = client_with(None);
        let store = SessionStore::new(api);
        let req = RegisterRequest {
            name: "A".into(),
            email: "a@uni.edu".into(),
            password: "123".into(),
            role: Role::Student,
            student_id: None,
            department: None,
        };
        let err = store.register(req).await.unwrap_err();
        assert!(err.message().contains("password"));
    }

    #[tokio::test]
    async fn logout_is_synchronous_and_next_request_is_anonymous() {
        let (api, mock, _) = client_with(Some("jwt"));
        mock.mock_response(HttpMethod::Get, "http://api.test/auth/me", 200, user_json("admin"));
        let store = SessionStore::new(api.clone());
        store.hydrate().await;
        assert!(store.snapshot().is_authenticated());

        store.logout();

        assert_eq!(store.snapshot(), Session::unauthenticated());
        assert!(store.current_user().is_none());
        api.request(HttpMethod::Get, "/courses", None, &[]).await.unwrap();
        assert_eq!(mock.last().unwrap().header("Authorization"), None);
    }

    #[tokio::test]
    async fn hydrate_without_token_skips_network() {
        let (api, mock, _) = client_with(None);
        let store = SessionStore::new(api);

        let session = store.hydrate().await;

        assert_eq!(session.status, SessionStatus::Unauthenticated);
        assert!(mock.sent().is_empty());
    }

    #[tokio::test]
    async fn hydrate_with_expired_token_clears_it_once() {
        let (api, mock, tokens) = client_with(Some("old"));
        mock.mock_response(HttpMethod::Get, "http://api.test/auth/me", 401, json!({}));
        let store = SessionStore::new(api.clone());

        let session = store.hydrate().await;

        assert_eq!(session.status, SessionStatus::Unauthenticated);
        assert_eq!(tokens.clear_count(), 1);
        assert_eq!(api.current_token(), None);
    }

    #[tokio::test]
    async fn hydrate_server_error_drops_token() {
        let (api, mock, tokens) = client_with(Some("old"));
        mock.mock_response(HttpMethod::Get, "http://api.test/auth/me", 500, json!({}));
        let store = SessionStore::new(api.clone());

        store.hydrate().await;

        assert_eq!(tokens.clear_count(), 1);
        assert_eq!(store.snapshot().status, SessionStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn forced_401_from_any_screen_ends_session() {
        let (api, mock, _) = client_with(Some("jwt"));
        mock.mock_response(HttpMethod::Get, "http://api.test/auth/me", 200, user_json("admin"));
        mock.mock_response(HttpMethod::Get, "http://api.test/health-records", 401, json!({}));
        let store = SessionStore::new(api.clone());
        store.hydrate().await;

        let notified = Arc::new(AtomicUsize::new(0));
        let counter = notified.clone();
        store.subscribe(move |s| {
            assert!(!s.is_authenticated());
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let _ = api.get_json::<serde_json::Value>("/health-records", &[]).await;

        assert_eq!(store.snapshot(), Session::unauthenticated());
        assert_eq!(notified.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unchanged_snapshot_does_not_notify() {
        let (api, _, _) = client_with(None);
        let store = SessionStore::new(api);
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.logout();
        store.logout();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
