//! 表单状态管理模块
//!
//! `FormState` 按字段名保存用户输入的原始字符串，负责：
//! - 数据的持有与重置
//! - 从已有记录回填（编辑）
//! - 按资源描述校验，并转换为提交用的 JSON 记录

use crate::crud::Record;
use crate::error::ValidationError;
use campusdesk_shared::{FieldKind, FieldSpec, ResourceSchema};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    values: BTreeMap<String, String>,
}

impl FormState {
    /// 所有字段为空的新表单
    pub fn empty(schema: &ResourceSchema) -> Self {
        Self {
            values: schema
                .fields
                .iter()
                .map(|f| (f.name.to_string(), String::new()))
                .collect(),
        }
    }

    /// 用已有记录回填
    pub fn from_record(schema: &ResourceSchema, record: &Record) -> Self {
        let mut state = Self::empty(schema);
        for field in schema.fields {
            if let Some(value) = record.get(field.name) {
                state.set(field.name, display_value(value));
            }
        }
        state
    }

    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn reset(&mut self, schema: &ResourceSchema) {
        *self = Self::empty(schema);
    }

    /// 校验全部字段，返回所有错误；成功时返回提交用的 JSON 对象
    ///
    /// 可选字段留空时不写入结果，用于新建。
    pub fn validate(&self, schema: &ResourceSchema) -> Result<Record, Vec<ValidationError>> {
        self.collect(schema, false)
    }

    /// 编辑时的校验：留空的可选字段以 `null` 写入，表示清除原值
    pub fn validate_for_update(&self, schema: &ResourceSchema) -> Result<Record, Vec<ValidationError>> {
        self.collect(schema, true)
    }

    fn collect(&self, schema: &ResourceSchema, clear_empty: bool) -> Result<Record, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut record = Map::new();

        for field in schema.fields {
            let raw = self.get(field.name).trim();
            if raw.is_empty() {
                if field.required {
                    errors.push(ValidationError::required(field.label));
                } else if clear_empty {
                    record.insert(field.name.to_string(), Value::Null);
                }
                continue;
            }
            match convert(field, raw) {
                Ok(value) => {
                    record.insert(field.name.to_string(), value);
                }
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(Value::Object(record))
        } else {
            Err(errors)
        }
    }
}

fn convert(field: &FieldSpec, raw: &str) -> Result<Value, ValidationError> {
    match field.kind {
        FieldKind::Text | FieldKind::LongText => Ok(Value::String(raw.to_string())),
        FieldKind::Email => {
            let valid = raw
                .split_once('@')
                .is_some_and(|(user, domain)| !user.is_empty() && !domain.is_empty());
            if valid {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(ValidationError::invalid(field.label, "邮箱格式不正确"))
            }
        }
        FieldKind::Number => raw
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| ValidationError::invalid(field.label, "必须是数字")),
        FieldKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .map_err(|_| ValidationError::invalid(field.label, "日期格式应为 YYYY-MM-DD")),
        FieldKind::Url => {
            if raw.starts_with("http://") || raw.starts_with("https://") {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(ValidationError::invalid(field.label, "链接需以 http(s):// 开头"))
            }
        }
        FieldKind::Select(options) => {
            if options.contains(&raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(ValidationError::invalid(field.label, "不是可选值"))
            }
        }
    }
}

/// 记录字段在表格、表单与导出中的文本形式
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusdesk_shared::resources::{Course, Student};
    use campusdesk_shared::schema::{COURSES, LEAVE_APPLICATIONS, STUDENTS};
    use serde_json::json;

    #[test]
    fn reports_every_missing_required_field() {
        let form = FormState::empty(&STUDENTS);
        let errors = form.validate(&STUDENTS).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field().to_string()).collect();
        assert_eq!(fields, vec!["学号", "姓名", "邮箱", "院系"]);
    }

    #[test]
    fn rejects_malformed_values() {
        let mut form = FormState::empty(&LEAVE_APPLICATIONS);
        form.set("student_id", "S-1");
        form.set("kind", "vacation");
        form.set("start_date", "2026-02-30");
        form.set("end_date", "03/01/2026");
        form.set("reason", "trip");

        let errors = form.validate(&LEAVE_APPLICATIONS).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| matches!(e, ValidationError::Invalid { .. })));
    }

    #[test]
    fn valid_form_converts_into_typed_model() {
        let mut form = FormState::empty(&STUDENTS);
        form.set("student_id", "S-100");
        form.set("name", "Ada");
        form.set("email", "ada@uni.edu");
        form.set("department", "CS");
        form.set("year", "2");
        form.set("date_of_birth", "2004-05-06");

        let record = form.validate(&STUDENTS).unwrap();
        assert!(record.get("phone").is_none());

        let student: Student = serde_json::from_value(record).unwrap();
        assert_eq!(student.year.as_deref(), Some("2"));
        assert_eq!(student.date_of_birth.unwrap().to_string(), "2004-05-06");
    }

    #[test]
    fn numbers_are_sent_as_json_numbers() {
        let mut form = FormState::empty(&COURSES);
        form.set("code", "CS101");
        form.set("title", "Intro");
        form.set("credits", "3");
        form.set("capacity", "abc");
        assert_eq!(form.validate(&COURSES).unwrap_err().len(), 1);

        form.set("capacity", "120");
        let record = form.validate(&COURSES).unwrap();
        assert_eq!(record["credits"], json!(3.0));
        let course: Course = serde_json::from_value(record).unwrap();
        assert_eq!(course.capacity, Some(120.0));
    }

    #[test]
    fn email_only_needs_local_part_and_host() {
        let mut form = FormState::empty(&STUDENTS);
        form.set("student_id", "S-1");
        form.set("name", "Ada");
        form.set("department", "CS");

        form.set("email", "ada@localhost");
        assert!(form.validate(&STUDENTS).is_ok());

        for bad in ["ada", "@uni.edu", "ada@"] {
            form.set("email", bad);
            assert_eq!(form.validate(&STUDENTS).unwrap_err().len(), 1, "{bad}");
        }
    }

    #[test]
    fn update_sends_cleared_optional_fields_as_null() {
        let record = json!({"id": "1", "student_id": "S1", "name": "Bo", "email": "bo@uni.edu", "department": "Math", "phone": "555"});
        let mut form = FormState::from_record(&STUDENTS, &record);
        form.set("phone", "");

        let created = form.validate(&STUDENTS).unwrap();
        assert!(created.get("phone").is_none());

        let updated = form.validate_for_update(&STUDENTS).unwrap();
        assert_eq!(updated["phone"], Value::Null);
        assert_eq!(updated["name"], "Bo");
    }

    #[test]
    fn edit_form_is_filled_from_record() {
        let record = json!({"id": 5, "code": "CS2", "title": "DS", "credits": 4, "department": null});
        let form = FormState::from_record(&COURSES, &record);
        assert_eq!(form.get("credits"), "4");
        assert_eq!(form.get("department"), "");
        assert_eq!(form.get("unknown"), "");
    }
}
