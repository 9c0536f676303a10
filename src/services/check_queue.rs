//! 后台查重队列
//!
//! 请求线程只负责入队，真正的提交和轮询在后台 worker 中执行，
//! 结果通过 oneshot 通道交回调用方。每个任务都可以单独取消，
//! 关闭队列会取消所有仍在执行的任务。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clients::PlagiarismApi;
use crate::error::CheckError;
use crate::models::check::CheckReport;
use crate::services::plagiarism_checker::PlagiarismChecker;

/// 队列容量，超过后 `enqueue` 会等待
const QUEUE_CAPACITY: usize = 64;

type CheckResult = Result<CheckReport, CheckError>;

/// 队列中的单个任务
struct CheckJob {
    id: u64,
    text: String,
    language: String,
    max_wait: Duration,
    cancel: CancellationToken,
    reply: oneshot::Sender<CheckResult>,
}

/// 入队后返回给调用方的凭据
pub struct CheckTicket {
    id: u64,
    cancel: CancellationToken,
    receiver: oneshot::Receiver<CheckResult>,
}

impl CheckTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 取消该任务，`wait` 随后返回 `CheckError::Cancelled`
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// 等待任务结果
    ///
    /// worker 退出而没有给出结果时视为取消。
    pub async fn wait(self) -> CheckResult {
        self.receiver.await.unwrap_or(Err(CheckError::Cancelled))
    }
}

/// 后台查重队列
pub struct CheckQueue {
    sender: mpsc::Sender<CheckJob>,
    shutdown: CancellationToken,
    next_id: AtomicU64,
    worker: JoinHandle<()>,
}

impl CheckQueue {
    /// 启动后台 worker
    ///
    /// # 参数
    /// - `checker`: 共享的查重服务
    /// - `max_concurrent`: 同时执行的任务上限（至少为 1）
    pub fn spawn<A>(checker: Arc<PlagiarismChecker<A>>, max_concurrent: usize) -> Self
    where
        A: PlagiarismApi + 'static,
    {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        let shutdown = CancellationToken::new();
        let worker = tokio::spawn(run_worker(
            checker,
            receiver,
            max_concurrent.max(1),
            shutdown.clone(),
        ));

        Self {
            sender,
            shutdown,
            next_id: AtomicU64::new(0),
            worker,
        }
    }

    /// 提交一个查重任务
    ///
    /// 队列已关闭时返回 `CheckError::Cancelled`。
    pub async fn enqueue(
        &self,
        text: impl Into<String>,
        language: impl Into<String>,
        max_wait: Duration,
    ) -> Result<CheckTicket, CheckError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let cancel = self.shutdown.child_token();
        let (reply, receiver) = oneshot::channel();

        let job = CheckJob {
            id,
            text: text.into(),
            language: language.into(),
            max_wait,
            cancel: cancel.clone(),
            reply,
        };

        self.sender
            .send(job)
            .await
            .map_err(|_| CheckError::Cancelled)?;

        debug!("查重任务 #{} 已入队", id);

        Ok(CheckTicket {
            id,
            cancel,
            receiver,
        })
    }

    /// 关闭队列，取消所有未完成的任务并等待 worker 退出
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        drop(self.sender);
        if let Err(e) = self.worker.await {
            warn!("查重队列 worker 异常退出: {}", e);
        }
        info!("查重队列已关闭");
    }
}

async fn run_worker<A>(
    checker: Arc<PlagiarismChecker<A>>,
    mut receiver: mpsc::Receiver<CheckJob>,
    max_concurrent: usize,
    shutdown: CancellationToken,
) where
    A: PlagiarismApi + 'static,
{
    let semaphore = Arc::new(Semaphore::new(max_concurrent));

    loop {
        let job = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            job = receiver.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let permit = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            permit = semaphore.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let checker = checker.clone();
        tokio::spawn(async move {
            let _permit = permit;
            debug!("查重任务 #{} 开始执行", job.id);

            let result = checker
                .check_complete_cancellable(&job.text, &job.language, job.max_wait, &job.cancel)
                .await;

            if let Err(e) = &result {
                debug!("查重任务 #{} 结束: {}", job.id, e);
            }

            if job.reply.send(result).is_err() {
                debug!("查重任务 #{} 的调用方已放弃结果", job.id);
            }
        });
    }

    debug!("查重队列 worker 退出");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::check::{CheckHandle, CheckRequest, CheckStatus};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    /// 前 `pending_polls` 次返回 SUBMITTED，之后返回 CHECKED
    struct SlowApi {
        pending_polls: usize,
        polls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl SlowApi {
        fn new(pending_polls: usize) -> Self {
            Self {
                pending_polls,
                polls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PlagiarismApi for SlowApi {
        async fn submit(&self, request: &CheckRequest) -> Result<CheckHandle, CheckError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            Ok(CheckHandle::new(request.language()))
        }

        async fn poll_status(&self, _handle: &CheckHandle) -> Result<CheckStatus, CheckError> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst);
            if n < self.pending_polls {
                Ok(CheckStatus::Submitted)
            } else {
                Ok(CheckStatus::Checked)
            }
        }

        async fn fetch_report(&self, handle: &CheckHandle) -> Result<CheckReport, CheckError> {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(CheckReport::new(handle.clone(), json!({"percent": 3})))
        }
    }

    const TEXT: &str =
        "A text of at least eighty characters, long enough to pass the length validation rule.";

    fn queue(api: SlowApi, max_concurrent: usize) -> (Arc<PlagiarismChecker<SlowApi>>, CheckQueue) {
        let checker = Arc::new(PlagiarismChecker::with_timings(
            api,
            Duration::from_secs(5),
            Duration::from_secs(300),
        ));
        let queue = CheckQueue::spawn(checker.clone(), max_concurrent);
        (checker, queue)
    }

    #[tokio::test(start_paused = true)]
    async fn test_enqueued_jobs_complete() {
        let (_checker, queue) = queue(SlowApi::new(2), 4);

        let first = queue.enqueue(TEXT, "en", Duration::from_secs(60)).await.unwrap();
        let second = queue.enqueue(TEXT, "de", Duration::from_secs(60)).await.unwrap();
        assert_ne!(first.id(), second.id());

        let results = futures::future::join_all(vec![first.wait(), second.wait()]).await;
        let handles: Vec<String> = results
            .into_iter()
            .map(|r| r.unwrap().text_id.as_str().to_string())
            .collect();

        assert_eq!(handles, vec!["en".to_string(), "de".to_string()]);
        queue.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_is_bounded() {
        let (checker, queue) = queue(SlowApi::new(4), 1);

        let mut tickets = Vec::new();
        for _ in 0..3 {
            tickets.push(queue.enqueue(TEXT, "en", Duration::from_secs(120)).await.unwrap());
        }

        for result in futures::future::join_all(tickets.into_iter().map(|t| t.wait())).await {
            assert!(result.is_ok());
        }
        assert_eq!(checker.api().max_in_flight.load(Ordering::SeqCst), 1);
        queue.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_single_ticket() {
        let (_checker, queue) = queue(SlowApi::new(usize::MAX), 2);

        let ticket = queue.enqueue(TEXT, "en", Duration::from_secs(300)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(6)).await;
        ticket.cancel();

        assert!(matches!(ticket.wait().await, Err(CheckError::Cancelled)));
        queue.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_in_flight_jobs() {
        let (_checker, queue) = queue(SlowApi::new(usize::MAX), 2);

        let ticket = queue.enqueue(TEXT, "en", Duration::from_secs(300)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        queue.shutdown().await;

        assert!(matches!(ticket.wait().await, Err(CheckError::Cancelled)));
    }

    #[tokio::test]
    async fn test_validation_error_is_delivered_through_ticket() {
        let (_checker, queue) = queue(SlowApi::new(0), 1);

        let ticket = queue.enqueue("short", "en", Duration::from_secs(60)).await.unwrap();

        assert!(matches!(ticket.wait().await, Err(CheckError::Validation { .. })));
        queue.shutdown().await;
    }
}
