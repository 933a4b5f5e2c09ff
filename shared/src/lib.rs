use serde::{Deserialize, Deserializer, Serialize};

pub mod protocol;
pub mod resources;
pub mod schema;

pub use protocol::{
    ApiRequest, AuthResponse, HttpMethod, LoginRequest, MeRequest, MeResponse, Page,
    RegisterRequest, UnreadCount, UnreadCountRequest,
};
pub use schema::{FieldKind, FieldSpec, FilterSpec, Resource, ResourceSchema};

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const TOKEN_STORAGE_KEY: &str = "campusdesk_token";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const BEARER_PREFIX: &str = "Bearer ";

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 用户角色
///
/// 后端返回的未知角色字符串会落到 `Unknown`，不会导致反序列化失败。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
    Clinic,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
            Role::Clinic => "clinic",
            Role::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "管理员",
            Role::Student => "学生",
            Role::Clinic => "校医室",
            Role::Unknown => "未知",
        }
    }

    /// 注册表单可选的角色
    pub const SELECTABLE: [Role; 3] = [Role::Admin, Role::Student, Role::Clinic];

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "student" => Role::Student,
            "clinic" => Role::Clinic,
            _ => Role::Unknown,
        }
    }
}

/// 嵌入在用户身份中的个人资料（均为可选字段）
///
/// 后端对这些字段的类型并不统一，数字与字符串都按文本接收。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Profile {
    #[serde(default, deserialize_with = "text_from_any", skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, deserialize_with = "text_from_any", skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "text_from_any", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "text_from_any", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "text_from_any", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

/// 当前登录用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id", deserialize_with = "id_from_any")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl User {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Accepts string or numeric ids and normalizes them to `String`.
pub fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Optional free-form text: strings, numbers and booleans become `String`,
/// `null` and objects/arrays become `None`.
pub fn text_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_role_does_not_fail_deserialization() {
        let user: User = serde_json::from_value(json!({
            "id": 7,
            "name": "Ada",
            "email": "ada@uni.edu",
            "role": "janitor"
        }))
        .unwrap();

        assert_eq!(user.id, "7");
        assert_eq!(user.role, Role::Unknown);
        assert!(user.profile.is_none());
    }

    #[test]
    fn user_accepts_mongo_style_id_and_profile() {
        let user: User = serde_json::from_value(json!({
            "_id": "abc",
            "name": "",
            "email": "s1@uni.edu",
            "role": "student",
            "profile": { "student_id": "S-001", "year": 3 }
        }))
        .unwrap();

        assert_eq!(user.id, "abc");
        assert_eq!(user.display_name(), "s1@uni.edu");
        let profile = user.profile.unwrap();
        assert_eq!(profile.student_id.as_deref(), Some("S-001"));
        assert_eq!(profile.year.as_deref(), Some("3"));
    }

    #[test]
    fn profile_accepts_text_or_numbers() {
        let user: User = serde_json::from_value(json!({
            "id": "u1",
            "email": "s2@uni.edu",
            "role": "student",
            "profile": { "student_id": 20240017, "year": "3", "phone": null, "department": {"id": 1} }
        }))
        .unwrap();

        let profile = user.profile.unwrap();
        assert_eq!(profile.student_id.as_deref(), Some("20240017"));
        assert_eq!(profile.year.as_deref(), Some("3"));
        assert_eq!(profile.phone, None);
        assert_eq!(profile.department, None);
    }

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!(Role::parse(" Admin "), Role::Admin);
        assert_eq!(Role::parse("CLINIC"), Role::Clinic);
        assert_eq!(Role::parse(""), Role::Unknown);
    }
}
