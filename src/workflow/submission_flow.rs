//! 作业查重流程 - 流程层
//!
//! 核心职责：把一次查重结果关联回作业
//!
//! 流程顺序：
//! 1. 提交文本并等待报告
//! 2. 从报告中取出相似度
//! 3. 学生提交时通知课程讲师（尽力而为，失败不影响结果）

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clients::PlagiarismApi;
use crate::config::Config;
use crate::error::CheckError;
use crate::models::check::{CheckHandle, CheckReport};
use crate::models::lms::{Assignment, Notification, NotificationType, Role};
use crate::services::{AssignmentDirectory, NotificationSink, PlagiarismChecker};
use crate::utils::logging::truncate_text;
use crate::workflow::submission_ctx::SubmissionCtx;

/// 通知标题
pub const NOTIFICATION_TITLE: &str = "Plagiarism Check Completed";

/// 作业查重结果
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub assignment_id: u64,
    pub text_id: CheckHandle,
    pub plagiarism_score: f64,
    pub report: CheckReport,
    pub message: String,
    /// 是否成功通知了讲师
    #[serde(skip)]
    pub lecturer_notified: bool,
}

/// 作业查重流程
///
/// - 编排"查重 → 取分 → 通知"
/// - 不持有任何跨请求状态
/// - 只依赖业务能力（services）
pub struct SubmissionFlow<A> {
    checker: Arc<PlagiarismChecker<A>>,
    directory: Arc<dyn AssignmentDirectory>,
    notifications: Arc<dyn NotificationSink>,
    language: String,
    max_wait: Duration,
}

impl<A: PlagiarismApi> SubmissionFlow<A> {
    /// 创建新的作业查重流程
    pub fn new(
        checker: Arc<PlagiarismChecker<A>>,
        directory: Arc<dyn AssignmentDirectory>,
        notifications: Arc<dyn NotificationSink>,
        config: &Config,
    ) -> Self {
        Self {
            checker,
            directory,
            notifications,
            language: config.default_language.clone(),
            max_wait: config.max_wait(),
        }
    }

    pub fn checker(&self) -> &Arc<PlagiarismChecker<A>> {
        &self.checker
    }

    pub fn directory(&self) -> &Arc<dyn AssignmentDirectory> {
        &self.directory
    }

    /// 默认提交语言
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    pub async fn run(
        &self,
        ctx: &SubmissionCtx,
        assignment: &Assignment,
        text: &str,
    ) -> Result<CheckOutcome, CheckError> {
        info!("{} 🔍 开始查重: {}", ctx, truncate_text(text, 60));

        let report = self
            .checker
            .check_complete(text, &self.language, self.max_wait)
            .await?;

        Ok(self.correlate(ctx, assignment, report).await)
    }

    /// 把报告关联回作业，并在学生提交时通知讲师
    ///
    /// 本方法不会失败：通知链路缺失或写入失败都只记录日志。
    pub async fn correlate(
        &self,
        ctx: &SubmissionCtx,
        assignment: &Assignment,
        report: CheckReport,
    ) -> CheckOutcome {
        if report.data.get("percent").is_none() {
            debug!("{} 报告中没有 percent 字段，按 0 处理", ctx);
        }
        let score = report.percent();

        let lecturer_notified = if ctx.submitter.role == Role::Student {
            self.notify_lecturer(ctx, assignment, score).await
        } else {
            false
        };

        info!("{} ✓ 查重完成，相似度: {}%", ctx, score);

        CheckOutcome {
            assignment_id: assignment.id,
            text_id: report.text_id.clone(),
            plagiarism_score: score,
            report,
            message: format!("Plagiarism check completed. Similarity: {}%", score),
            lecturer_notified,
        }
    }

    async fn notify_lecturer(&self, ctx: &SubmissionCtx, assignment: &Assignment, score: f64) -> bool {
        let Some(link) = self.directory.find_lecturer(assignment) else {
            debug!("{} 作业未关联到讲师，跳过通知", ctx);
            return false;
        };

        let notification = Notification::new(
            link.user_id,
            NOTIFICATION_TITLE,
            format!(
                "Assignment '{}' plagiarism check completed. Score: {}%",
                assignment.title, score
            ),
            NotificationType::Plagiarism,
        )
        .with_course(link.course_id);

        match self.notifications.create(notification).await {
            Ok(()) => {
                info!("{} 📨 已通知讲师 (用户 {})", ctx, link.user_id);
                true
            }
            Err(e) => {
                warn!("{} ⚠️ 通知讲师失败，已忽略: {}", ctx, e);
                false
            }
        }
    }
}
