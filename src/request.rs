use crate::error::{ApiError, ApiResult};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

pub use campusdesk_shared::HttpMethod;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 通用 HTTP 请求结构
///
/// `url` 为包含查询参数的完整地址。
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body.to_string());
        self
    }

    /// 按名称查找请求头（大小写不敏感）
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 解析 JSON 响应体；空响应体按 `null` 处理
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        let body = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// HTTP 客户端特性 (Trait)
///
/// (?Send) 是因为浏览器 fetch 返回的 future 不是 Send 的；
/// 实现类型本身需要 Send + Sync 以便放入 Leptos 上下文。
#[async_trait::async_trait(?Send)]
pub trait HttpClient: Send + Sync {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse>;
}

// =========================================================
// 实现层: reqwest 客户端 (非 wasm 目标)
// =========================================================

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

#[cfg(not(target_arch = "wasm32"))]
impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn build_request(&self, req: &HttpRequest) -> ApiResult<reqwest::Request> {
        let method = match req.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &req.url);
        for (k, v) in &req.headers {
            builder = builder.header(k, v);
        }
        if let Some(body) = &req.body {
            builder = builder.body(body.clone());
        }

        builder
            .build()
            .map_err(|e| ApiError::Encode(format!("Reqwest Error: {}", e)))
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait::async_trait(?Send)]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let request = self.build_request(&req)?;

        let resp = self
            .client
            .execute(request)
            .await
            .map_err(|e| ApiError::Network(format!("Reqwest Error: {}", e)))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("Reqwest Body Error: {}", e)))?;

        Ok(HttpResponse { status, body })
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
pub use mock::MockHttpClient;

#[cfg(test)]
mod mock {
    use super::*;
    use crate::write_lock;
    use std::sync::RwLock;

    /// 按 "METHOD url(不含查询参数)" 匹配预设响应，并记录所有发出的请求
    pub struct MockHttpClient {
        responses: RwLock<HashMap<String, (u16, String)>>,
        pub requests: RwLock<Vec<HttpRequest>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self {
                responses: RwLock::new(HashMap::new()),
                requests: RwLock::new(Vec::new()),
            }
        }

        pub fn mock_response(&self, method: HttpMethod, url: &str, status: u16, body: serde_json::Value) {
            write_lock(&self.responses).insert(
                format!("{} {}", method.as_str(), url),
                (status, body.to_string()),
            );
        }

        pub fn sent(&self) -> Vec<HttpRequest> {
            crate::read_lock(&self.requests).clone()
        }

        pub fn last(&self) -> Option<HttpRequest> {
            crate::read_lock(&self.requests).last().cloned()
        }
    }

    #[async_trait::async_trait(?Send)]
    impl HttpClient for MockHttpClient {
        async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
            write_lock(&self.requests).push(req.clone());

            let path = req.url.split('?').next().unwrap_or_default();
            let key = format!("{} {}", req.method.as_str(), path);
            let responses = crate::read_lock(&self.responses);
            Ok(match responses.get(&key) {
                Some((status, body)) => HttpResponse::new(*status, body.clone()),
                None => HttpResponse::new(404, r#"{"message":"Not Found"}"#),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = HttpRequest::new("http://x", HttpMethod::Get).with_header("Authorization", "Bearer t");
        assert_eq!(req.header("authorization"), Some("Bearer t"));
        assert_eq!(req.header("X-Missing"), None);
    }

    #[test]
    fn empty_body_decodes_as_null() {
        let resp = HttpResponse::new(204, "");
        let value: Option<u32> = resp.json().unwrap();
        assert_eq!(value, None);
        assert!(resp.ok());
    }

    #[test]
    fn reqwest_request_carries_headers_and_body() {
        let client = ReqwestHttpClient::new();
        let req = HttpRequest::new("http://api.test/students?page=1", HttpMethod::Post)
            .with_header("Authorization", "Bearer abc")
            .with_body(serde_json::json!({"name": "Ada"}));

        let built = client.build_request(&req).unwrap();
        assert_eq!(built.method(), reqwest::Method::POST);
        assert_eq!(built.url().query(), Some("page=1"));
        assert_eq!(built.headers()["authorization"], "Bearer abc");
        let body = built.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"name":"Ada"}"#);
    }
}
