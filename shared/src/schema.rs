//! 资源描述模块
//!
//! 每个功能页面都由一份 `ResourceSchema` 描述：路径、字段、过滤条件、统计端点。
//! 通用 CRUD 层与页面组件只依赖这份数据，不再为每个资源单独编写请求逻辑。

/// 表单字段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    LongText,
    Email,
    Number,
    /// `YYYY-MM-DD`
    Date,
    Url,
    Select(&'static [&'static str]),
}

/// 单个字段描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// 是否显示在列表表格中
    pub listed: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            listed: true,
        }
    }

    pub const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            listed: true,
        }
    }

    /// 仅在表单与详情中出现，不进入列表列
    pub const fn unlisted(mut self) -> Self {
        self.listed = false;
        self
    }
}

/// 列表过滤条件（下拉选择）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub options: &'static [&'static str],
}

/// 资源描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSchema {
    pub title: &'static str,
    /// REST 路径，例如 `/students`
    pub path: &'static str,
    pub fields: &'static [FieldSpec],
    pub filters: &'static [FilterSpec],
    pub stats_path: Option<&'static str>,
    /// 由前端内存演示后端提供数据的占位页面
    pub placeholder: bool,
}

impl ResourceSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn listed_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.listed)
    }

    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path, id)
    }
}

/// 带有静态资源描述的类型化模型
pub trait Resource {
    fn schema() -> &'static ResourceSchema;
}

// =========================================================
// 资源描述表
// =========================================================

const YEARS: &[&str] = &["1", "2", "3", "4"];
const LEAVE_STATUS: &[&str] = &["pending", "approved", "rejected"];
const LEAVE_KINDS: &[&str] = &["sick", "personal", "family", "academic"];
const MEALS: &[&str] = &["breakfast", "lunch", "dinner"];
const WEEKDAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];
const DOC_STATUS: &[&str] = &["requested", "processing", "ready"];
const SEMESTER_STATUS: &[&str] = &["planned", "active", "closed"];
const REGISTRATION_STATUS: &[&str] = &["enrolled", "waitlisted", "dropped"];

pub const STUDENTS: ResourceSchema = ResourceSchema {
    title: "学生管理",
    path: "/students",
    fields: &[
        FieldSpec::required("student_id", "学号", FieldKind::Text),
        FieldSpec::required("name", "姓名", FieldKind::Text),
        FieldSpec::required("email", "邮箱", FieldKind::Email),
        FieldSpec::required("department", "院系", FieldKind::Text),
        FieldSpec::optional("year", "年级", FieldKind::Select(YEARS)),
        FieldSpec::optional("phone", "电话", FieldKind::Text).unlisted(),
        FieldSpec::optional("date_of_birth", "出生日期", FieldKind::Date).unlisted(),
    ],
    filters: &[FilterSpec {
        name: "year",
        label: "年级",
        options: YEARS,
    }],
    stats_path: Some("/students/stats"),
    placeholder: false,
};

pub const COURSES: ResourceSchema = ResourceSchema {
    title: "课程管理",
    path: "/courses",
    fields: &[
        FieldSpec::required("code", "课程代码", FieldKind::Text),
        FieldSpec::required("title", "课程名称", FieldKind::Text),
        FieldSpec::required("credits", "学分", FieldKind::Number),
        FieldSpec::optional("department", "院系", FieldKind::Text),
        FieldSpec::optional("instructor", "授课教师", FieldKind::Text),
        FieldSpec::optional("capacity", "容量", FieldKind::Number).unlisted(),
        FieldSpec::optional("description", "简介", FieldKind::LongText).unlisted(),
    ],
    filters: &[],
    stats_path: None,
    placeholder: false,
};

pub const INSTRUCTORS: ResourceSchema = ResourceSchema {
    title: "教师管理",
    path: "/instructors",
    fields: &[
        FieldSpec::required("name", "姓名", FieldKind::Text),
        FieldSpec::required("email", "邮箱", FieldKind::Email),
        FieldSpec::required("department", "院系", FieldKind::Text),
        FieldSpec::optional("title", "职称", FieldKind::Text),
        FieldSpec::optional("office", "办公室", FieldKind::Text).unlisted(),
    ],
    filters: &[],
    stats_path: None,
    placeholder: false,
};

pub const DEPARTMENTS: ResourceSchema = ResourceSchema {
    title: "院系管理",
    path: "/departments",
    fields: &[
        FieldSpec::required("code", "代码", FieldKind::Text),
        FieldSpec::required("name", "名称", FieldKind::Text),
        FieldSpec::optional("head", "负责人", FieldKind::Text),
        FieldSpec::optional("established", "成立日期", FieldKind::Date).unlisted(),
    ],
    filters: &[],
    stats_path: None,
    placeholder: false,
};

pub const HEALTH_RECORDS: ResourceSchema = ResourceSchema {
    title: "健康档案",
    path: "/health-records",
    fields: &[
        FieldSpec::required("student_id", "学号", FieldKind::Text),
        FieldSpec::required("visit_date", "就诊日期", FieldKind::Date),
        FieldSpec::required("diagnosis", "诊断", FieldKind::Text),
        FieldSpec::optional("treatment", "处理", FieldKind::LongText).unlisted(),
        FieldSpec::optional("blood_type", "血型", FieldKind::Select(&["A", "B", "AB", "O"])),
        FieldSpec::optional("notes", "备注", FieldKind::LongText).unlisted(),
    ],
    filters: &[],
    stats_path: Some("/health-records/stats"),
    placeholder: false,
};

pub const LEAVE_APPLICATIONS: ResourceSchema = ResourceSchema {
    title: "请假申请",
    path: "/leave-applications",
    fields: &[
        FieldSpec::required("student_id", "学号", FieldKind::Text),
        FieldSpec::required("kind", "类型", FieldKind::Select(LEAVE_KINDS)),
        FieldSpec::required("start_date", "开始日期", FieldKind::Date),
        FieldSpec::required("end_date", "结束日期", FieldKind::Date),
        FieldSpec::required("reason", "事由", FieldKind::LongText).unlisted(),
        FieldSpec::optional("status", "状态", FieldKind::Select(LEAVE_STATUS)),
    ],
    filters: &[
        FilterSpec {
            name: "status",
            label: "状态",
            options: LEAVE_STATUS,
        },
        FilterSpec {
            name: "kind",
            label: "类型",
            options: LEAVE_KINDS,
        },
    ],
    stats_path: Some("/leave-applications/stats"),
    placeholder: false,
};

pub const FEEDBACK: ResourceSchema = ResourceSchema {
    title: "食堂反馈",
    path: "/feedback",
    fields: &[
        FieldSpec::required("meal", "餐次", FieldKind::Select(MEALS)),
        FieldSpec::required("rating", "评分", FieldKind::Select(&["1", "2", "3", "4", "5"])),
        FieldSpec::required("comment", "意见", FieldKind::LongText),
        FieldSpec::optional("date", "日期", FieldKind::Date),
    ],
    filters: &[FilterSpec {
        name: "meal",
        label: "餐次",
        options: MEALS,
    }],
    stats_path: Some("/feedback/stats"),
    placeholder: false,
};

pub const CAFETERIA_SCHEDULES: ResourceSchema = ResourceSchema {
    title: "食堂排餐",
    path: "/cafeteria-schedules",
    fields: &[
        FieldSpec::required("day", "星期", FieldKind::Select(WEEKDAYS)),
        FieldSpec::required("meal", "餐次", FieldKind::Select(MEALS)),
        FieldSpec::required("menu", "菜单", FieldKind::LongText),
        FieldSpec::optional("opening_hours", "开放时间", FieldKind::Text),
    ],
    filters: &[FilterSpec {
        name: "day",
        label: "星期",
        options: WEEKDAYS,
    }],
    stats_path: None,
    placeholder: false,
};

pub const DOCUMENTS: ResourceSchema = ResourceSchema {
    title: "文档中心",
    path: "/documents",
    fields: &[
        FieldSpec::required("title", "标题", FieldKind::Text),
        FieldSpec::required("category", "分类", FieldKind::Select(&["certificate", "form", "policy"])),
        FieldSpec::optional("status", "状态", FieldKind::Select(DOC_STATUS)),
        FieldSpec::optional("url", "链接", FieldKind::Url).unlisted(),
    ],
    filters: &[FilterSpec {
        name: "status",
        label: "状态",
        options: DOC_STATUS,
    }],
    stats_path: None,
    placeholder: true,
};

pub const GALLERY: ResourceSchema = ResourceSchema {
    title: "毕业相册",
    path: "/gallery",
    fields: &[
        FieldSpec::required("title", "标题", FieldKind::Text),
        FieldSpec::required("image_url", "图片地址", FieldKind::Url),
        FieldSpec::optional("class_year", "届别", FieldKind::Number),
        FieldSpec::optional("caption", "说明", FieldKind::LongText).unlisted(),
    ],
    filters: &[],
    stats_path: None,
    placeholder: false,
};

pub const TRANSCRIPTS: ResourceSchema = ResourceSchema {
    title: "成绩单申请",
    path: "/transcripts",
    fields: &[
        FieldSpec::required("student_id", "学号", FieldKind::Text),
        FieldSpec::required("copies", "份数", FieldKind::Number),
        FieldSpec::required("delivery", "领取方式", FieldKind::Select(&["pickup", "mail", "email"])),
        FieldSpec::optional("status", "状态", FieldKind::Select(DOC_STATUS)),
    ],
    filters: &[FilterSpec {
        name: "status",
        label: "状态",
        options: DOC_STATUS,
    }],
    stats_path: None,
    placeholder: true,
};

pub const SEMESTERS: ResourceSchema = ResourceSchema {
    title: "学期管理",
    path: "/semesters",
    fields: &[
        FieldSpec::required("name", "学期", FieldKind::Text),
        FieldSpec::required("start_date", "开始日期", FieldKind::Date),
        FieldSpec::required("end_date", "结束日期", FieldKind::Date),
        FieldSpec::optional("status", "状态", FieldKind::Select(SEMESTER_STATUS)),
    ],
    filters: &[FilterSpec {
        name: "status",
        label: "状态",
        options: SEMESTER_STATUS,
    }],
    stats_path: None,
    placeholder: true,
};

pub const COURSE_REGISTRATIONS: ResourceSchema = ResourceSchema {
    title: "选课",
    path: "/course-registrations",
    fields: &[
        FieldSpec::required("course_code", "课程代码", FieldKind::Text),
        FieldSpec::required("semester", "学期", FieldKind::Text),
        FieldSpec::optional("status", "状态", FieldKind::Select(REGISTRATION_STATUS)),
    ],
    filters: &[FilterSpec {
        name: "status",
        label: "状态",
        options: REGISTRATION_STATUS,
    }],
    stats_path: None,
    placeholder: true,
};

pub const MESSAGES: ResourceSchema = ResourceSchema {
    title: "站内信",
    path: "/messages",
    fields: &[
        FieldSpec::required("recipient", "收件人", FieldKind::Email),
        FieldSpec::required("subject", "主题", FieldKind::Text),
        FieldSpec::required("body", "正文", FieldKind::LongText).unlisted(),
        FieldSpec::optional("sender", "发件人", FieldKind::Email),
        FieldSpec::optional("sent_at", "时间", FieldKind::Text),
    ],
    filters: &[FilterSpec {
        name: "folder",
        label: "文件夹",
        options: &["inbox", "sent"],
    }],
    stats_path: None,
    placeholder: false,
};

/// 所有占位页面的路径，由演示后端接管
pub fn placeholder_paths() -> impl Iterator<Item = &'static str> {
    [DOCUMENTS, TRANSCRIPTS, SEMESTERS, COURSE_REGISTRATIONS]
        .into_iter()
        .map(|s| s.path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_path_appends_id() {
        assert_eq!(STUDENTS.item_path("42"), "/students/42");
    }

    #[test]
    fn listed_fields_skip_unlisted() {
        let names: Vec<_> = COURSES.listed_fields().map(|f| f.name).collect();
        assert_eq!(names, vec!["code", "title", "credits", "department", "instructor"]);
    }

    #[test]
    fn placeholder_paths_match_flags() {
        let all = [
            STUDENTS, COURSES, INSTRUCTORS, DEPARTMENTS, HEALTH_RECORDS, LEAVE_APPLICATIONS,
            FEEDBACK, CAFETERIA_SCHEDULES, DOCUMENTS, GALLERY, TRANSCRIPTS, SEMESTERS,
            COURSE_REGISTRATIONS, MESSAGES,
        ];
        let flagged: Vec<_> = all.iter().filter(|s| s.placeholder).map(|s| s.path).collect();
        let listed: Vec<_> = placeholder_paths().collect();
        assert_eq!(flagged, listed);
    }
}
