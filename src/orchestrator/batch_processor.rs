//! 批量作业查重处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是批处理模式的入口，负责提交文件的加载、并发调度和全局统计。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、创建结果日志、构建查重客户端和作业目录
//! 2. **批量加载**：扫描并加载所有待处理的提交文件（`Vec<SubmissionBatch>`）
//! 3. **并发控制**：使用 Semaphore 限制同时处理的文件数量
//! 4. **全局统计**：汇总所有文件的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单份提交的细节
//! - **资源所有者**：唯一持有 `SubmissionFlow` 的模块
//! - **向下委托**：委托 submission_processor 处理单个文件

use crate::clients::PlagiarismClient;
use crate::config::Config;
use crate::models::catalog::SubmissionBatch;
use crate::models::loaders::{load_all_submission_files, load_catalog};
use crate::orchestrator::submission_processor::{self, SubmissionStats};
use crate::services::{FileNotificationSink, PlagiarismChecker};
use crate::utils::logging::{
    append_log_line, init_log_file, log_batches_loaded, log_startup, print_final_stats,
};
use crate::workflow::SubmissionFlow;
use anyhow::{Context, Result};
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<SubmissionFlow<PlagiarismClient>>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        // 初始化日志文件
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法创建日志文件: {}", config.output_log_file))?;

        log_startup(config.max_concurrent_checks, config.max_wait_secs);

        let client = PlagiarismClient::new(&config)?;
        let checker = Arc::new(PlagiarismChecker::new(client, &config));

        let catalog = load_catalog(Path::new(&config.catalog_file)).await?;
        let notifications = Arc::new(FileNotificationSink::new(
            config.notification_log_file.clone(),
        ));

        let flow = Arc::new(SubmissionFlow::new(
            checker,
            Arc::new(catalog),
            notifications,
            &config,
        ));

        Ok(Self { config, flow })
    }

    pub fn flow(&self) -> &Arc<SubmissionFlow<PlagiarismClient>> {
        &self.flow
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<SubmissionStats> {
        let batches = self.load_batches().await?;

        if batches.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(SubmissionStats::default());
        }

        let total_submissions = batches.iter().map(|b| b.submissions.len()).sum();
        log_batches_loaded(
            batches.len(),
            total_submissions,
            self.config.max_concurrent_checks,
        );

        let stats = self.process_all_batches(batches).await?;

        print_final_stats(
            stats.checked,
            stats.failed,
            stats.skipped,
            stats.notified,
            &self.config.output_log_file,
        );

        let summary = format!(
            "\n汇总: 完成 {}, 失败 {}, 跳过 {}, 已通知讲师 {}",
            stats.checked, stats.failed, stats.skipped, stats.notified
        );
        if let Err(e) = append_log_line(&self.config.output_log_file, &summary) {
            warn!("⚠️ 写入汇总失败: {}", e);
        }

        Ok(stats)
    }

    /// 加载提交文件
    async fn load_batches(&self) -> Result<Vec<SubmissionBatch>> {
        info!("\n📁 正在扫描待处理的作业提交...");
        Ok(load_all_submission_files(&self.config.submissions_folder).await?)
    }

    /// 并发处理所有文件，文件内部按顺序处理
    async fn process_all_batches(&self, batches: Vec<SubmissionBatch>) -> Result<SubmissionStats> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_checks));
        let mut handles = Vec::with_capacity(batches.len());

        for (idx, batch) in batches.into_iter().enumerate() {
            let batch_index = idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;
            let flow = self.flow.clone();
            let log_file = self.config.output_log_file.clone();

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                submission_processor::process_batch(&flow, batch, batch_index, &log_file).await
            }));
        }

        let mut stats = SubmissionStats::default();
        for (idx, result) in join_all(handles).await.into_iter().enumerate() {
            match result {
                Ok(Ok(batch_stats)) => stats.merge(&batch_stats),
                Ok(Err(e)) => error!("[文件 {}] ❌ 处理过程中发生错误: {:#}", idx + 1, e),
                Err(e) => error!("[文件 {}] 任务执行失败: {}", idx + 1, e),
            }
        }

        Ok(stats)
    }
}
