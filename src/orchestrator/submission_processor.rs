//! 单个提交文件处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责处理一个 TOML 文件中的全部作业提交。
//!
//! ## 核心功能
//!
//! 1. **遍历提交**：按顺序处理 `Vec<AssignmentSubmission>`
//! 2. **查找上下文**：作业、提交人缺失或提交已评分时跳过
//! 3. **流程调度**：委托 `SubmissionFlow` 完成查重和通知
//! 4. **文件清理**：全部成功后删除已处理的 TOML 文件，有失败则保留以便重跑
//! 5. **统计输出**：记录完成/失败/跳过数量

use crate::clients::PlagiarismApi;
use crate::error::CheckError;
use crate::models::catalog::SubmissionBatch;
use crate::models::lms::SubmissionStatus;
use crate::utils::logging::append_log_line;
use crate::workflow::{SubmissionCtx, SubmissionFlow};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

/// 查重统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionStats {
    pub checked: usize,
    pub failed: usize,
    pub skipped: usize,
    pub notified: usize,
}

impl SubmissionStats {
    pub fn merge(&mut self, other: &SubmissionStats) {
        self.checked += other.checked;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.notified += other.notified;
    }

    pub fn total(&self) -> usize {
        self.checked + self.failed + self.skipped
    }
}

/// 处理单个提交文件
///
/// # 参数
/// - `flow`: 作业查重流程
/// - `batch`: 提交文件内容
/// - `batch_index`: 文件索引（用于日志）
/// - `log_file`: 结果日志文件
///
/// # 返回
/// 返回本文件的统计
pub async fn process_batch<A: PlagiarismApi>(
    flow: &SubmissionFlow<A>,
    batch: SubmissionBatch,
    batch_index: usize,
    log_file: &str,
) -> Result<SubmissionStats> {
    let total = batch.submissions.len();
    log_batch_start(batch_index, batch.file_path.as_deref(), total);

    let directory = flow.directory();
    let mut stats = SubmissionStats::default();

    for (index, submission) in batch.submissions.iter().enumerate() {
        info!(
            "\n[文件 {}] 处理第 {}/{} 份提交 (#{})",
            batch_index,
            index + 1,
            total,
            submission.id
        );

        // 已评分或已退回的提交不再重复查重
        if submission.status != SubmissionStatus::Submitted {
            info!(
                "[文件 {}] ⏭️ 提交 #{} 状态为 {:?}，跳过",
                batch_index, submission.id, submission.status
            );
            stats.skipped += 1;
            continue;
        }

        let Some(text) = submission
            .submission_text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
        else {
            warn!("[文件 {}] ⚠️ 提交 #{} 没有文本，跳过", batch_index, submission.id);
            stats.skipped += 1;
            continue;
        };

        let Some(assignment) = directory.find_assignment(submission.assignment_id) else {
            warn!(
                "[文件 {}] ⚠️ 作业 #{} 不存在，跳过提交 #{}",
                batch_index, submission.assignment_id, submission.id
            );
            stats.skipped += 1;
            continue;
        };

        let Some(student) = directory.find_user(submission.student_id) else {
            warn!(
                "[文件 {}] ⚠️ 用户 #{} 不存在，跳过提交 #{}",
                batch_index, submission.student_id, submission.id
            );
            stats.skipped += 1;
            continue;
        };

        let ctx = SubmissionCtx::new(assignment.id, student).with_submission(submission.id);

        let line = match flow.run(&ctx, &assignment, text).await {
            Ok(outcome) => {
                stats.checked += 1;
                if outcome.lecturer_notified {
                    stats.notified += 1;
                }
                format!(
                    "{} 完成 | text_id {} | 相似度 {}%",
                    ctx, outcome.text_id, outcome.plagiarism_score
                )
            }
            Err(e @ CheckError::Validation { .. }) => {
                warn!("{} ⚠️ 文本不满足查重要求，跳过: {}", ctx, e);
                stats.skipped += 1;
                format!("{} 跳过 | {}", ctx, e)
            }
            Err(e) => {
                error!("{} ❌ 查重失败: {}", ctx, e);
                stats.failed += 1;
                format!("{} 失败 | {}", ctx, e)
            }
        };

        if let Err(e) = append_log_line(log_file, &line) {
            warn!("[文件 {}] ⚠️ 写入结果日志失败: {}", batch_index, e);
        }
    }

    // 有失败时保留文件，方便重跑
    if stats.failed == 0 {
        cleanup_file(batch.file_path.as_deref(), batch_index)?;
    } else {
        warn!(
            "[文件 {}] ⚠️ 有 {} 份提交查重失败，保留文件",
            batch_index, stats.failed
        );
    }

    log_batch_complete(batch_index, &stats);

    Ok(stats)
}

/// 清理已处理的文件
fn cleanup_file(file_path: Option<&str>, batch_index: usize) -> Result<()> {
    let Some(file_path) = file_path else {
        warn!("[文件 {}] ⚠️ 文件路径未设置", batch_index);
        return Ok(());
    };

    if Path::new(file_path).exists() {
        fs::remove_file(file_path).with_context(|| format!("无法删除文件: {}", file_path))?;
        info!(
            "[文件 {}] 🗑️ 文件已删除: {}",
            batch_index,
            Path::new(file_path)
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
        );
    } else {
        warn!("[文件 {}] ⚠️ 文件不存在: {}", batch_index, file_path);
    }

    Ok(())
}

// ========== 日志辅助函数 ==========

fn log_batch_start(batch_index: usize, file_path: Option<&str>, total: usize) {
    info!("[文件 {}] 开始处理", batch_index);
    if let Some(path) = file_path {
        info!("[文件 {}] 路径: {}", batch_index, path);
    }
    info!("[文件 {}] 提交总数: {}", batch_index, total);
}

fn log_batch_complete(batch_index: usize, stats: &SubmissionStats) {
    info!(
        "[文件 {}] 统计: 完成 {}, 失败 {}, 跳过 {}, 通知 {}",
        batch_index, stats.checked, stats.failed, stats.skipped, stats.notified
    );
    info!("\n[文件 {}] ✅ 文件处理完成\n", batch_index);
}
