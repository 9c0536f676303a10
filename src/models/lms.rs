//! LMS 业务记录
//!
//! 只保留查重关联逻辑和批处理需要的字段，持久化由上游系统负责。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Lecturer,
    Superadmin,
}

impl Role {
    pub fn name(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Lecturer => "lecturer",
            Role::Superadmin => "superadmin",
        }
    }

    /// 是否允许发起作业查重
    pub fn can_check_assignments(self) -> bool {
        matches!(self, Role::Student | Role::Lecturer)
    }
}

/// 用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub role: Role,
}

/// 讲师档案，关联到一个用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecturer {
    pub id: u64,
    pub user_id: u64,
}

/// 课程
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    pub title: String,
    /// 讲师被删除后为空
    #[serde(default)]
    pub lecturer_id: Option<u64>,
}

/// 课程模块
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseModule {
    pub id: u64,
    pub course_id: u64,
    pub title: String,
}

/// 课时类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LessonType {
    Video,
    #[default]
    Text,
    Quiz,
    Assignment,
    Live,
}

/// 课时
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: u64,
    pub module_id: u64,
    pub title: String,
    #[serde(default)]
    pub lesson_type: LessonType,
}

/// 作业
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: u64,
    pub lesson_id: u64,
    pub title: String,
    #[serde(default = "default_max_points")]
    pub max_points: u32,
}

fn default_max_points() -> u32 {
    100
}

/// 作业提交状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Submitted,
    Graded,
    Returned,
}

/// 作业提交
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSubmission {
    pub id: u64,
    pub assignment_id: u64,
    pub student_id: u64,
    #[serde(default)]
    pub submission_text: Option<String>,
    #[serde(default)]
    pub status: SubmissionStatus,
}

/// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    CourseUpdate,
    AssignmentDue,
    GradePosted,
    ForumReply,
    Announcement,
    Plagiarism,
}

/// 通知
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: u64,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_course: Option<u64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// 创建一条未读通知
    pub fn new(
        user_id: u64,
        title: impl Into<String>,
        message: impl Into<String>,
        notification_type: NotificationType,
    ) -> Self {
        Self {
            user_id,
            title: title.into(),
            message: message.into(),
            notification_type,
            related_course: None,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_course(mut self, course_id: u64) -> Self {
        self.related_course = Some(course_id);
        self
    }
}
