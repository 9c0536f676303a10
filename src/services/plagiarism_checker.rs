//! 查重服务 - 业务能力层
//!
//! 只负责"提交文本并等到出结果"这一能力，不关心作业和通知。
//!
//! 轮询在 tokio 定时器上挂起，不占用线程；传入 `CancellationToken`
//! 可以在任意一次请求或等待期间中止。

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clients::PlagiarismApi;
use crate::config::Config;
use crate::error::CheckError;
use crate::models::check::{CheckHandle, CheckReport, CheckRequest, CheckStatus};

/// 查重服务
///
/// 职责：
/// - 校验并提交文本
/// - 按固定间隔轮询，直到 CHECKED / FAILED / 超时
/// - 不保存任何跨任务状态，多个检查可以并发执行
pub struct PlagiarismChecker<A> {
    api: A,
    poll_interval: Duration,
    default_max_wait: Duration,
}

impl<A: PlagiarismApi> PlagiarismChecker<A> {
    /// 创建新的查重服务
    pub fn new(api: A, config: &Config) -> Self {
        Self::with_timings(api, config.poll_interval(), config.max_wait())
    }

    /// 使用自定义轮询间隔和默认最长等待时间创建
    pub fn with_timings(api: A, poll_interval: Duration, default_max_wait: Duration) -> Self {
        Self {
            api,
            poll_interval,
            default_max_wait,
        }
    }

    /// 底层 API 客户端
    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn default_max_wait(&self) -> Duration {
        self.default_max_wait
    }

    /// 提交文本并等待检测完成
    ///
    /// # 返回
    /// - 轮询到 CHECKED：返回完整报告
    /// - 轮询到 FAILED：`CheckError::CheckFailed`
    /// - `max_wait` 内没有终态：`CheckError::Timeout`
    pub async fn check_complete(
        &self,
        text: &str,
        language: &str,
        max_wait: Duration,
    ) -> Result<CheckReport, CheckError> {
        self.check_complete_cancellable(text, language, max_wait, &CancellationToken::new())
            .await
    }

    /// 与 [`check_complete`](Self::check_complete) 相同，但可以通过 `cancel` 中止
    pub async fn check_complete_cancellable(
        &self,
        text: &str,
        language: &str,
        max_wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<CheckReport, CheckError> {
        // 校验失败直接返回，不会发出请求
        let request = CheckRequest::new(text, language)?;

        let handle = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CheckError::Cancelled),
            handle = self.api.submit(&request) => handle?,
        };

        info!("📤 文本已提交查重, text_id: {}", handle);

        self.wait_for_report(&handle, max_wait, cancel).await
    }

    /// 轮询已提交的文本直到终态
    pub async fn wait_for_report(
        &self,
        handle: &CheckHandle,
        max_wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<CheckReport, CheckError> {
        let started = Instant::now();
        let mut polls = 0usize;

        while started.elapsed() < max_wait {
            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(CheckError::Cancelled),
                status = self.api.poll_status(handle) => status?,
            };
            polls += 1;

            match status {
                CheckStatus::Checked => {
                    info!(
                        "✓ text_id {} 检测完成 (轮询 {} 次, 用时 {:?})",
                        handle,
                        polls,
                        started.elapsed()
                    );
                    return tokio::select! {
                        biased;
                        _ = cancel.cancelled() => Err(CheckError::Cancelled),
                        report = self.api.fetch_report(handle) => report,
                    };
                }
                CheckStatus::Failed => {
                    warn!("⚠️ text_id {} 检测失败 (轮询 {} 次)", handle, polls);
                    return Err(CheckError::CheckFailed {
                        handle: handle.clone(),
                    });
                }
                other => {
                    debug!(
                        "text_id {} 当前状态 {}, {:?} 后重试",
                        handle, other, self.poll_interval
                    );
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(CheckError::Cancelled),
                _ = sleep(self.poll_interval) => {}
            }
        }

        warn!("⚠️ text_id {} 查重超时 (轮询 {} 次)", handle, polls);
        Err(CheckError::Timeout {
            handle: handle.clone(),
            waited: started.elapsed(),
        })
    }
}
