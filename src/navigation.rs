//! 导航权限模块 - 领域模型
//!
//! 角色能看到哪些页面由一张声明式的能力表决定，导航外壳只在这里查询一次，
//! 各页面内部不再做角色判断。

use campusdesk_shared::schema::{self, ResourceSchema};
use campusdesk_shared::Role;
use std::fmt::Display;

/// 功能页面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Dashboard,
    Students,
    Instructors,
    Departments,
    Courses,
    CourseRegistration,
    SemesterManagement,
    Transcripts,
    HealthRecords,
    LeaveApplications,
    CafeteriaFeedback,
    CafeteriaSchedule,
    Documents,
    GraduationGallery,
    Messages,
    MyProfile,
}

impl Screen {
    pub fn id(&self) -> &'static str {
        match self {
            Screen::Dashboard => "dashboard",
            Screen::Students => "students",
            Screen::Instructors => "instructors",
            Screen::Departments => "departments",
            Screen::Courses => "courses",
            Screen::CourseRegistration => "course-registration",
            Screen::SemesterManagement => "semester-management",
            Screen::Transcripts => "transcripts",
            Screen::HealthRecords => "health-records",
            Screen::LeaveApplications => "leave-applications",
            Screen::CafeteriaFeedback => "cafeteria-feedback",
            Screen::CafeteriaSchedule => "cafeteria-schedule",
            Screen::Documents => "documents",
            Screen::GraduationGallery => "graduation-gallery",
            Screen::Messages => "messages",
            Screen::MyProfile => "my-profile",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        CAPABILITIES
            .iter()
            .map(|c| c.screen)
            .find(|s| s.id() == id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Screen::Dashboard => "概览",
            Screen::MyProfile => "个人资料",
            Screen::CafeteriaFeedback => "食堂反馈",
            Screen::GraduationGallery => "毕业相册",
            other => other.schema().map(|s| s.title).unwrap_or_default(),
        }
    }

    /// 由通用 CRUD 页面渲染的资源描述；概览与个人资料页返回 `None`
    pub fn schema(&self) -> Option<&'static ResourceSchema> {
        Some(match self {
            Screen::Students => &schema::STUDENTS,
            Screen::Instructors => &schema::INSTRUCTORS,
            Screen::Departments => &schema::DEPARTMENTS,
            Screen::Courses => &schema::COURSES,
            Screen::CourseRegistration => &schema::COURSE_REGISTRATIONS,
            Screen::SemesterManagement => &schema::SEMESTERS,
            Screen::Transcripts => &schema::TRANSCRIPTS,
            Screen::HealthRecords => &schema::HEALTH_RECORDS,
            Screen::LeaveApplications => &schema::LEAVE_APPLICATIONS,
            Screen::CafeteriaFeedback => &schema::FEEDBACK,
            Screen::CafeteriaSchedule => &schema::CAFETERIA_SCHEDULES,
            Screen::Documents => &schema::DOCUMENTS,
            Screen::GraduationGallery => &schema::GALLERY,
            Screen::Messages => &schema::MESSAGES,
            Screen::Dashboard | Screen::MyProfile => return None,
        })
    }
}

impl Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// 能力表的一行
#[derive(Debug, Clone, Copy)]
pub struct Capability {
    pub screen: Screen,
    pub roles: &'static [Role],
}

const ALL: &[Role] = &[Role::Admin, Role::Student, Role::Clinic];
const ADMIN: &[Role] = &[Role::Admin];
const STUDENT: &[Role] = &[Role::Student];
const ADMIN_STUDENT: &[Role] = &[Role::Admin, Role::Student];
const ADMIN_CLINIC: &[Role] = &[Role::Admin, Role::Clinic];
const STUDENT_CLINIC: &[Role] = &[Role::Student, Role::Clinic];

/// 角色能力表，顺序即菜单顺序
pub const CAPABILITIES: &[Capability] = &[
    Capability { screen: Screen::Dashboard, roles: ALL },
    Capability { screen: Screen::Students, roles: ADMIN },
    Capability { screen: Screen::Instructors, roles: ADMIN },
    Capability { screen: Screen::Departments, roles: ADMIN },
    Capability { screen: Screen::Courses, roles: ADMIN_STUDENT },
    Capability { screen: Screen::CourseRegistration, roles: STUDENT },
    Capability { screen: Screen::SemesterManagement, roles: ADMIN },
    Capability { screen: Screen::Transcripts, roles: ADMIN_STUDENT },
    Capability { screen: Screen::HealthRecords, roles: ADMIN_CLINIC },
    Capability { screen: Screen::LeaveApplications, roles: ADMIN_STUDENT },
    Capability { screen: Screen::CafeteriaFeedback, roles: ADMIN_STUDENT },
    Capability { screen: Screen::CafeteriaSchedule, roles: ALL },
    Capability { screen: Screen::Documents, roles: ADMIN_STUDENT },
    Capability { screen: Screen::GraduationGallery, roles: ADMIN_STUDENT },
    Capability { screen: Screen::Messages, roles: ALL },
    Capability { screen: Screen::MyProfile, roles: STUDENT_CLINIC },
];

pub fn is_allowed(role: Option<Role>, screen: Screen) -> bool {
    let Some(role) = role else {
        return false;
    };
    CAPABILITIES
        .iter()
        .any(|c| c.screen == screen && c.roles.contains(&role))
}

/// 角色可见的页面；未知或缺失的角色得到空菜单
pub fn visible_screens(role: Option<Role>) -> Vec<Screen> {
    CAPABILITIES
        .iter()
        .filter(|c| is_allowed(role, c.screen))
        .map(|c| c.screen)
        .collect()
}

/// 导航外壳状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavState {
    role: Option<Role>,
    tabs: Vec<Screen>,
    active: Option<Screen>,
}

impl NavState {
    pub fn for_role(role: Option<Role>) -> Self {
        let tabs = visible_screens(role);
        let active = tabs.first().copied();
        Self { role, tabs, active }
    }

    pub fn tabs(&self) -> &[Screen] {
        &self.tabs
    }

    pub fn active(&self) -> Option<Screen> {
        self.active
    }

    /// 只有当前角色可见的页面才能被选中
    pub fn select(&mut self, screen: Screen) -> bool {
        if self.tabs.contains(&screen) {
            self.active = Some(screen);
            true
        } else {
            log::warn!("[Nav] {} is not available for {:?}", screen, self.role);
            false
        }
    }

    /// 角色变化时重新计算菜单；原页面仍可见则保留
    pub fn set_role(&mut self, role: Option<Role>) {
        if self.role == role {
            return;
        }
        let previous = self.active;
        *self = Self::for_role(role);
        if let Some(screen) = previous.filter(|s| self.tabs.contains(s)) {
            self.active = Some(screen);
        }
    }
}

impl Default for NavState {
    fn default() -> Self {
        Self::for_role(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_sees_exact_tab_set() {
        assert_eq!(
            visible_screens(Some(Role::Student)),
            vec![
                Screen::Dashboard,
                Screen::Courses,
                Screen::CourseRegistration,
                Screen::Transcripts,
                Screen::LeaveApplications,
                Screen::CafeteriaFeedback,
                Screen::CafeteriaSchedule,
                Screen::Documents,
                Screen::GraduationGallery,
                Screen::Messages,
                Screen::MyProfile,
            ]
        );
        assert!(!is_allowed(Some(Role::Student), Screen::SemesterManagement));
        assert!(!is_allowed(Some(Role::Student), Screen::Students));
    }

    #[test]
    fn admin_sees_admin_only_tabs_but_not_student_only() {
        let tabs = visible_screens(Some(Role::Admin));
        for admin_only in [
            Screen::SemesterManagement,
            Screen::Students,
            Screen::Instructors,
            Screen::Departments,
        ] {
            assert!(tabs.contains(&admin_only), "{} missing", admin_only);
        }
        assert!(!tabs.contains(&Screen::CourseRegistration));
        assert!(!tabs.contains(&Screen::MyProfile));
    }

    #[test]
    fn clinic_menu() {
        assert_eq!(
            visible_screens(Some(Role::Clinic)),
            vec![
                Screen::Dashboard,
                Screen::HealthRecords,
                Screen::CafeteriaSchedule,
                Screen::Messages,
                Screen::MyProfile,
            ]
        );
    }

    #[test]
    fn unknown_or_missing_role_gets_empty_menu() {
        assert!(visible_screens(None).is_empty());
        assert!(visible_screens(Some(Role::Unknown)).is_empty());
        assert_eq!(NavState::for_role(None).active(), None);
    }

    #[test]
    fn select_rejects_hidden_screens() {
        let mut nav = NavState::for_role(Some(Role::Student));
        assert_eq!(nav.active(), Some(Screen::Dashboard));

        assert!(!nav.select(Screen::SemesterManagement));
        assert_eq!(nav.active(), Some(Screen::Dashboard));

        assert!(nav.select(Screen::Courses));
        assert_eq!(nav.active(), Some(Screen::Courses));
    }

    #[test]
    fn role_change_keeps_shared_tab_and_resets_hidden_one() {
        let mut nav = NavState::for_role(Some(Role::Admin));
        nav.select(Screen::Messages);
        nav.set_role(Some(Role::Clinic));
        assert_eq!(nav.active(), Some(Screen::Messages));

        nav.select(Screen::HealthRecords);
        nav.set_role(Some(Role::Student));
        assert_eq!(nav.active(), Some(Screen::Dashboard));
    }

    #[test]
    fn every_screen_round_trips_through_id() {
        for cap in CAPABILITIES {
            assert_eq!(Screen::from_id(cap.screen.id()), Some(cap.screen));
            assert!(!cap.screen.label().is_empty());
        }
    }
}
