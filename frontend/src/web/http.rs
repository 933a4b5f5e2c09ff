//! 浏览器 HTTP 传输层
//!
//! 基于 `gloo-net` 的 fetch 封装，实现核心库的 `HttpClient`。
//! 鉴权头、401 处理都在 `ApiClient` 中完成，这里只负责收发。

use campusdesk::{ApiError, ApiResult, HttpClient, HttpMethod, HttpRequest, HttpResponse};
use gloo_net::http::{Method, RequestBuilder};

#[derive(Clone, Copy, Default)]
pub struct BrowserHttpClient;

#[async_trait::async_trait(?Send)]
impl HttpClient for BrowserHttpClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let method = match req.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        };

        let mut builder = RequestBuilder::new(&req.url).method(method);
        for (k, v) in &req.headers {
            builder = builder.header(k, v);
        }

        let request = match req.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| ApiError::Encode(format!("请求构建失败: {}", e)))?;

        let resp = request
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("网络错误: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("响应读取失败: {}", e)))?;

        Ok(HttpResponse::new(status, body))
    }
}
