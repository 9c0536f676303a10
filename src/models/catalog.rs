use serde::{Deserialize, Serialize};

use crate::models::lms::{
    Assignment, AssignmentSubmission, Course, CourseModule, Lecturer, Lesson, User,
};

/// 课程目录
///
/// 上游 LMS 数据的只读快照，从 TOML 文件加载。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LmsCatalog {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub lecturers: Vec<Lecturer>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub modules: Vec<CourseModule>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

/// 作业所属讲师
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LecturerLink {
    /// 讲师对应的用户ID（通知接收人）
    pub user_id: u64,
    /// 作业所属课程
    pub course_id: u64,
}

impl LmsCatalog {
    pub fn user(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn assignment(&self, id: u64) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    /// 沿 作业 → 课时 → 模块 → 课程 → 讲师 查找通知接收人
    ///
    /// 任意一环缺失都返回 `None`。
    pub fn lecturer_link(&self, assignment: &Assignment) -> Option<LecturerLink> {
        let lesson = self.lessons.iter().find(|l| l.id == assignment.lesson_id)?;
        let module = self.modules.iter().find(|m| m.id == lesson.module_id)?;
        let course = self.courses.iter().find(|c| c.id == module.course_id)?;
        let lecturer_id = course.lecturer_id?;
        let lecturer = self.lecturers.iter().find(|l| l.id == lecturer_id)?;

        Some(LecturerLink {
            user_id: lecturer.user_id,
            course_id: course.id,
        })
    }
}

/// 一个待查重的作业提交文件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionBatch {
    #[serde(default)]
    pub submissions: Vec<AssignmentSubmission>,
    /// 来源文件路径（加载后填充）
    #[serde(skip)]
    pub file_path: Option<String>,
}
