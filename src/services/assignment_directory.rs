//! 作业目录 - 业务能力层
//!
//! 只读访问上游 LMS 的用户、作业以及作业到讲师的关联链路。

use crate::models::catalog::{LecturerLink, LmsCatalog};
use crate::models::lms::{Assignment, User};

/// 作业目录
pub trait AssignmentDirectory: Send + Sync {
    fn find_user(&self, user_id: u64) -> Option<User>;

    fn find_assignment(&self, assignment_id: u64) -> Option<Assignment>;

    /// 作业 → 课时 → 模块 → 课程 → 讲师，任一环缺失返回 `None`
    fn find_lecturer(&self, assignment: &Assignment) -> Option<LecturerLink>;
}

impl AssignmentDirectory for LmsCatalog {
    fn find_user(&self, user_id: u64) -> Option<User> {
        self.user(user_id).cloned()
    }

    fn find_assignment(&self, assignment_id: u64) -> Option<Assignment> {
        self.assignment(assignment_id).cloned()
    }

    fn find_lecturer(&self, assignment: &Assignment) -> Option<LecturerLink> {
        self.lecturer_link(assignment)
    }
}
