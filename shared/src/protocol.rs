use crate::{Role, User};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether a JSON body is sent with this method.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The URL path, relative to the API base address.
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;
}

// =========================================================
// Auth
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for LoginRequest {
    type Response = AuthResponse;
    const PATH: &'static str = "/auth/login";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl ApiRequest for RegisterRequest {
    type Response = AuthResponse;
    const PATH: &'static str = "/auth/register";
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// Successful login/register payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Who-am-I request used to hydrate a persisted token.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeRequest;

impl ApiRequest for MeRequest {
    type Response = MeResponse;
    const PATH: &'static str = "/auth/me";
    const METHOD: HttpMethod = HttpMethod::Get;
}

/// `/auth/me` answers either `{ "user": {...} }` or the bare user object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeResponse {
    Wrapped { user: User },
    Bare(User),
}

impl MeResponse {
    pub fn into_user(self) -> User {
        match self {
            MeResponse::Wrapped { user } | MeResponse::Bare(user) => user,
        }
    }
}

// =========================================================
// Messaging
// =========================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct UnreadCountRequest;

impl ApiRequest for UnreadCountRequest {
    type Response = UnreadCount;
    const PATH: &'static str = "/messages/unread-count";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UnreadCount {
    #[serde(alias = "unreadCount")]
    pub count: u32,
}

// =========================================================
// Lists
// =========================================================

/// One page of a resource list.
///
/// Accepts `{items, totalPages}`, `{items, total_pages}` or a bare array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 0,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPage<T> {
            Paged {
                items: Vec<T>,
                #[serde(default, alias = "totalPages")]
                total_pages: Option<u32>,
            },
            Bare(Vec<T>),
        }

        Ok(match RawPage::deserialize(deserializer)? {
            RawPage::Paged { items, total_pages } => Page {
                total_pages: total_pages.unwrap_or(1),
                items,
            },
            RawPage::Bare(items) => Page {
                items,
                total_pages: 1,
            },
        })
    }
}
