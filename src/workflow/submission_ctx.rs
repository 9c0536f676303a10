//! 作业查重上下文
//!
//! 封装"谁为哪份作业发起了查重"这一信息

use std::fmt::Display;

use crate::models::lms::User;

/// 作业查重上下文
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
    /// 作业ID
    pub assignment_id: u64,

    /// 发起查重的用户
    pub submitter: User,

    /// 作业提交记录ID（批处理时才有）
    pub submission_id: Option<u64>,
}

impl SubmissionCtx {
    /// 创建新的查重上下文
    pub fn new(assignment_id: u64, submitter: User) -> Self {
        Self {
            assignment_id,
            submitter,
            submission_id: None,
        }
    }

    pub fn with_submission(mut self, submission_id: u64) -> Self {
        self.submission_id = Some(submission_id);
        self
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[作业 #{} 提交人 {}({})",
            self.assignment_id,
            self.submitter.username,
            self.submitter.role.name()
        )?;
        if let Some(id) = self.submission_id {
            write!(f, " 提交记录 #{}", id)?;
        }
        write!(f, "]")
    }
}
