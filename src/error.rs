use serde::Deserialize;
use thiserror::Error;

// =========================================================
// 核心错误类型
// =========================================================

/// 请求分发层的错误
///
/// `Unauthorized` 与 `Status` 保留后端返回的消息文本，供表单直接展示。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// 401: 会话失效或凭据错误
    #[error("未授权: {message}")]
    Unauthorized { message: String },
    /// 其他非 2xx 状态
    #[error("请求失败 ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("网络错误: {0}")]
    Network(String),
    #[error("响应解析失败: {0}")]
    Decode(String),
    #[error("请求构建失败: {0}")]
    Encode(String),
    #[error("无效地址: {0}")]
    InvalidUrl(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// 根据响应状态和响应体构造错误
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = backend_message(body).unwrap_or_else(|| default_status_text(status));
        if status == 401 {
            ApiError::Unauthorized { message }
        } else {
            ApiError::Status { status, message }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// 面向用户的消息：优先使用后端返回的文本
    pub fn message(&self) -> String {
        match self {
            ApiError::Unauthorized { message } | ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// 从响应体中提取后端消息 (`message` / `error` / `msg`)
pub fn backend_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
        msg: Option<String>,
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(trimmed) {
        return parsed
            .message
            .or(parsed.error)
            .or(parsed.msg)
            .filter(|m| !m.trim().is_empty());
    }

    // 纯文本错误页直接透传，HTML 页面忽略
    if trimmed.starts_with('<') || trimmed.starts_with('{') || trimmed.starts_with('[') {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn default_status_text(status: u16) -> String {
    match status {
        400 => "请求参数错误".to_string(),
        401 => "登录已失效，请重新登录".to_string(),
        403 => "没有权限执行此操作".to_string(),
        404 => "资源不存在".to_string(),
        409 => "资源冲突".to_string(),
        500..=599 => "服务器内部错误".to_string(),
        other => format!("HTTP {}", other),
    }
}

// =========================================================
// 表单校验错误
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} 为必填项")]
    Required { field: String },
    #[error("{field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field } | ValidationError::Invalid { field, .. } => field,
        }
    }
}

// =========================================================
// 会话错误
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SessionError {
    /// 登录/注册表单上显示的文本
    pub fn message(&self) -> String {
        match self {
            SessionError::Validation(e) => e.to_string(),
            SessionError::Api(e) => e.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_prefers_message_then_error() {
        assert_eq!(
            backend_message(r#"{"message":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            backend_message(r#"{"error":"Email already used"}"#).as_deref(),
            Some("Email already used")
        );
        assert_eq!(backend_message("Bad gateway").as_deref(), Some("Bad gateway"));
        assert_eq!(backend_message("<html>oops</html>"), None);
        assert_eq!(backend_message(r#"{"message":""}"#), None);
    }

    #[test]
    fn from_response_maps_401_to_unauthorized() {
        let err = ApiError::from_response(401, r#"{"message":"Token expired"}"#);
        assert!(err.is_unauthorized());
        assert_eq!(err.message(), "Token expired");

        let err = ApiError::from_response(500, "");
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.message(), "服务器内部错误");
    }

    #[test]
    fn session_error_message_uses_backend_text() {
        let err = SessionError::from(ApiError::from_response(400, r#"{"msg":"Weak password"}"#));
        assert_eq!(err.message(), "Weak password");
    }
}
