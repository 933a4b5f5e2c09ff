//! 类型化资源模型
//!
//! 字段名与 `schema` 中的描述保持一致，通用表单生成的 JSON 可直接反序列化为这些类型。

use crate::id_from_any;
use crate::schema::{self, Resource, ResourceSchema};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

macro_rules! impl_resource {
    ($($ty:ty => $schema:path),* $(,)?) => {
        $(
            impl Resource for $ty {
                fn schema() -> &'static ResourceSchema {
                    &$schema
                }
            }
        )*
    };
}

impl_resource! {
    Student => schema::STUDENTS,
    Course => schema::COURSES,
    Instructor => schema::INSTRUCTORS,
    Department => schema::DEPARTMENTS,
    HealthRecord => schema::HEALTH_RECORDS,
    LeaveApplication => schema::LEAVE_APPLICATIONS,
    Feedback => schema::FEEDBACK,
    CafeteriaSchedule => schema::CAFETERIA_SCHEDULES,
    Document => schema::DOCUMENTS,
    GalleryImage => schema::GALLERY,
    Transcript => schema::TRANSCRIPTS,
    SemesterRecord => schema::SEMESTERS,
    CourseRegistration => schema::COURSE_REGISTRATIONS,
    Message => schema::MESSAGES,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(default, alias = "_id", deserialize_with = "id_from_any", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(default, alias = "_id", deserialize_with = "id_from_any", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub code: String,
    pub title: String,
    pub credits: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructor {
    #[serde(default, alias = "_id", deserialize_with = "id_from_any", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    #[serde(default, alias = "_id", deserialize_with = "id_from_any", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub established: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    #[serde(default, alias = "_id", deserialize_with = "id_from_any", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub student_id: String,
    pub visit_date: NaiveDate,
    pub diagnosis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveApplication {
    #[serde(default, alias = "_id", deserialize_with = "id_from_any", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub student_id: String,
    pub kind: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    #[serde(default)]
    pub status: LeaveStatus,
}

impl LeaveApplication {
    /// 请假天数（含首尾两天）
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default, alias = "_id", deserialize_with = "id_from_any", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub meal: String,
    pub rating: String,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CafeteriaSchedule {
    #[serde(default, alias = "_id", deserialize_with = "id_from_any", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub day: String,
    pub meal: String,
    pub menu: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, alias = "_id", deserialize_with = "id_from_any", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    #[serde(default, alias = "_id", deserialize_with = "id_from_any", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_year: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default, alias = "_id", deserialize_with = "id_from_any", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub student_id: String,
    pub copies: f64,
    pub delivery: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterRecord {
    #[serde(default, alias = "_id", deserialize_with = "id_from_any", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRegistration {
    #[serde(default, alias = "_id", deserialize_with = "id_from_any", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub course_code: String,
    pub semester: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, alias = "_id", deserialize_with = "id_from_any", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read: bool,
}
