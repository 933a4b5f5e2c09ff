//! 请求分发层
//!
//! 所有对后端的请求都经过 `ApiClient`：
//! - 发送前：若存储中有 token，附加 `Authorization: Bearer <token>`
//! - 收到 401：清除 token，并通知所有订阅者（会话状态、路由）
//! - 其他状态原样返回给调用方

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::token::TokenStore;
use crate::{read_lock, write_lock};
use campusdesk_shared::{
    ApiRequest, BEARER_PREFIX, CONTENT_TYPE_JSON, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE,
};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::{Arc, RwLock};
use url::Url;

type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

struct ApiInner {
    config: ClientConfig,
    transport: Arc<dyn HttpClient>,
    tokens: Arc<dyn TokenStore>,
    unauthorized_hooks: RwLock<Vec<UnauthorizedHook>>,
}

/// 后端 API 客户端
///
/// 克隆开销很小（内部为 `Arc`），可在各页面之间共享。
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiInner>,
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpClient>,
        tokens: Arc<dyn TokenStore>,
    ) -> ApiResult<Self> {
        Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        Ok(Self {
            inner: Arc::new(ApiInner {
                config,
                transport,
                tokens,
                unauthorized_hooks: RwLock::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.inner.tokens
    }

    /// 当前持久化的 token（空字符串视为不存在）
    pub fn current_token(&self) -> Option<String> {
        self.inner.tokens.get().filter(|t| !t.is_empty())
    }

    /// 订阅 401 事件
    pub fn on_unauthorized<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        write_lock(&self.inner.unauthorized_hooks).push(Arc::new(hook));
    }

    /// 拼接完整请求地址
    pub fn url(&self, path: &str, query: &[(String, String)]) -> ApiResult<String> {
        let raw = if path.starts_with('/') {
            format!("{}{}", self.inner.config.base_url, path)
        } else {
            format!("{}/{}", self.inner.config.base_url, path)
        };

        let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url.to_string())
    }

    /// 发送请求
    ///
    /// 只有 401 会被转换为错误；其余状态码原样交给调用方。
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
        query: &[(String, String)],
    ) -> ApiResult<HttpResponse> {
        let url = self.url(path, query)?;
        let mut req = HttpRequest::new(&url, method).with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON);

        if let Some(token) = self.current_token() {
            req = req.with_header(HEADER_AUTHORIZATION, &format!("{}{}", BEARER_PREFIX, token));
        }
        if let Some(body) = body {
            req = req.with_body(body);
        }

        log::debug!("[Api] {} {}", method.as_str(), url);
        let resp = self.inner.transport.send(req).await.inspect_err(|e| {
            log::error!("[Api] {} {} failed: {}", method.as_str(), path, e);
        })?;

        if resp.status == 401 {
            log::warn!(
                "[Api] {} {} returned 401. Clearing session.",
                method.as_str(),
                path
            );
            self.inner.tokens.clear();
            self.notify_unauthorized();
            return Err(ApiError::from_response(401, &resp.body));
        }

        Ok(resp)
    }

    fn notify_unauthorized(&self) {
        // 先复制一份，回调中可能再次订阅
        let hooks: Vec<UnauthorizedHook> = read_lock(&self.inner.unauthorized_hooks).clone();
        for hook in hooks {
            hook();
        }
    }

    fn decode<T: DeserializeOwned>(resp: HttpResponse) -> ApiResult<T> {
        if !resp.ok() {
            return Err(ApiError::from_response(resp.status, &resp.body));
        }
        resp.json()
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> ApiResult<T> {
        let resp = self.request(HttpMethod::Get, path, None, query).await?;
        Self::decode(resp)
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        let body = to_json(body)?;
        let resp = self.request(HttpMethod::Post, path, Some(body), &[]).await?;
        Self::decode(resp)
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        let body = to_json(body)?;
        let resp = self.request(HttpMethod::Put, path, Some(body), &[]).await?;
        Self::decode(resp)
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        let resp = self.request(HttpMethod::Delete, path, None, &[]).await?;
        if !resp.ok() {
            return Err(ApiError::from_response(resp.status, &resp.body));
        }
        Ok(())
    }

    /// 发送强类型请求并获取解析后的响应
    pub async fn send<R: ApiRequest>(&self, req: &R) -> ApiResult<R::Response> {
        let body = if R::METHOD.has_body() {
            Some(to_json(req)?)
        } else {
            None
        };
        let resp = self.request(R::METHOD, R::PATH, body, &[]).await?;
        Self::decode(resp)
    }
}

fn to_json<B: Serialize>(body: &B) -> ApiResult<serde_json::Value> {
    serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::request::MockHttpClient;
    use crate::token::MemoryTokenStore;
    use campusdesk_shared::{LoginRequest, MeRequest, Role};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) const BASE: &str = "http://api.test";

    /// 记录 clear 调用次数的 token 存储
    #[derive(Default)]
    pub(crate) struct CountingTokenStore {
        inner: MemoryTokenStore,
        pub clears: AtomicUsize,
    }

    impl CountingTokenStore {
        pub(crate) fn with_token(token: &str) -> Self {
            Self {
                inner: MemoryTokenStore::with_token(token),
                clears: AtomicUsize::new(0),
            }
        }

        pub(crate) fn clear_count(&self) -> usize {
            self.clears.load(Ordering::SeqCst)
        }
    }

    impl TokenStore for CountingTokenStore {
        fn get(&self) -> Option<String> {
            self.inner.get()
        }
        fn set(&self, token: &str) {
            self.inner.set(token);
        }
        fn clear(&self) {
            self.clears.fetch_add(1, Ordering::SeqCst);
            self.inner.clear();
        }
    }

    pub(crate) fn client_with(
        token: Option<&str>,
    ) -> (ApiClient, Arc<MockHttpClient>, Arc<CountingTokenStore>) {
        let mock = Arc::new(MockHttpClient::new());
        let tokens = Arc::new(match token {
            Some(t) => CountingTokenStore::with_token(t),
            None => CountingTokenStore::default(),
        });
        let api = ApiClient::new(ClientConfig::new(BASE), mock.clone(), tokens.clone()).unwrap();
        (api, mock, tokens)
    }

    #[tokio::test]
    async fn attaches_exact_bearer_token_when_present() {
        let (api, mock, _) = client_with(Some("tok-123.abc"));
        mock.mock_response(HttpMethod::Get, "http://api.test/courses", 200, json!({"items": []}));

        api.request(HttpMethod::Get, "/courses", None, &[]).await.unwrap();
        api.request(HttpMethod::Post, "/courses", Some(json!({"code": "X"})), &[])
            .await
            .unwrap();

        for req in mock.sent() {
            assert_eq!(req.header("Authorization"), Some("Bearer tok-123.abc"));
            assert_eq!(req.header("Content-Type"), Some("application/json"));
        }
    }

    #[tokio::test]
    async fn omits_authorization_without_token() {
        let (api, mock, _) = client_with(None);
        api.request(HttpMethod::Get, "/courses", None, &[]).await.unwrap();
        assert_eq!(mock.last().unwrap().header("Authorization"), None);

        // 空字符串同样视为没有 token
        api.tokens().set("");
        api.request(HttpMethod::Get, "/courses", None, &[]).await.unwrap();
        assert_eq!(mock.last().unwrap().header("Authorization"), None);
    }

    #[tokio::test]
    async fn unauthorized_clears_token_once_and_notifies() {
        let (api, mock, tokens) = client_with(Some("stale"));
        mock.mock_response(
            HttpMethod::Get,
            "http://api.test/students",
            401,
            json!({"message": "jwt expired"}),
        );

        let redirects = Arc::new(AtomicUsize::new(0));
        let counter = redirects.clone();
        api.on_unauthorized(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let err = api.request(HttpMethod::Get, "/students", None, &[]).await.unwrap_err();

        assert_eq!(err, ApiError::Unauthorized { message: "jwt expired".into() });
        assert_eq!(tokens.clear_count(), 1);
        assert_eq!(redirects.load(Ordering::SeqCst), 1);
        assert_eq!(api.current_token(), None);
    }

    #[tokio::test]
    async fn other_error_statuses_pass_through() {
        let (api, mock, tokens) = client_with(Some("t"));
        mock.mock_response(HttpMethod::Delete, "http://api.test/courses/9", 403, json!({"message": "nope"}));

        let resp = api.request(HttpMethod::Delete, "/courses/9", None, &[]).await.unwrap();
        assert_eq!(resp.status, 403);
        assert_eq!(tokens.clear_count(), 0);
        assert_eq!(api.current_token().as_deref(), Some("t"));

        let err = api.delete("/courses/9").await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.message(), "nope");
    }

    #[tokio::test]
    async fn query_parameters_are_encoded() {
        let (api, mock, _) = client_with(None);
        let query = vec![
            ("page".to_string(), "2".to_string()),
            ("search".to_string(), "ada lovelace".to_string()),
        ];
        api.request(HttpMethod::Get, "students", None, &query).await.unwrap();
        assert_eq!(
            mock.last().unwrap().url,
            "http://api.test/students?page=2&search=ada+lovelace"
        );
    }

    #[tokio::test]
    async fn base_path_is_preserved() {
        let api = ApiClient::new(
            ClientConfig::new("http://campus.test/api/"),
            Arc::new(MockHttpClient::new()),
            Arc::new(MemoryTokenStore::new()),
        )
        .unwrap();
        assert_eq!(api.url("/auth/me", &[]).unwrap(), "http://campus.test/api/auth/me");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = ApiClient::new(
            ClientConfig::new("not a url"),
            Arc::new(MockHttpClient::new()),
            Arc::new(MemoryTokenStore::new()),
        );
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn typed_send_skips_body_for_get() {
        let (api, mock, _) = client_with(Some("t"));
        mock.mock_response(
            HttpMethod::Get,
            "http://api.test/auth/me",
            200,
            json!({"user": {"id": "1", "role": "admin"}}),
        );
        mock.mock_response(
            HttpMethod::Post,
            "http://api.test/auth/login",
            200,
            json!({"token": "new", "user": {"id": "1", "role": "admin"}}),
        );

        let me = api.send(&MeRequest).await.unwrap();
        assert_eq!(me.into_user().role, Role::Admin);
        assert_eq!(mock.last().unwrap().body, None);

        let login = LoginRequest {
            email: "a@uni.edu".into(),
            password: "pw".into(),
        };
        let auth = api.send(&login).await.unwrap();
        assert_eq!(auth.token, "new");
        let sent: serde_json::Value = serde_json::from_str(mock.last().unwrap().body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({"email": "a@uni.edu", "password": "pw"}));
    }
}
