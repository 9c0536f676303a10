use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info。重复调用是安全的。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n作业查重日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 向日志文件追加一行
pub fn append_log_line(log_file_path: &str, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `max_concurrent`: 最大并发数
/// - `max_wait_secs`: 单次查重最长等待
pub fn log_startup(max_concurrent: usize, max_wait_secs: u64) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 作业批量查重模式");
    info!("📊 最大并发数: {}", max_concurrent);
    info!("⏱️ 单次查重最长等待: {} 秒", max_wait_secs);
    info!("{}", "=".repeat(60));
}

/// 记录提交文件加载信息
pub fn log_batches_loaded(total_files: usize, total_submissions: usize, max_concurrent: usize) {
    info!(
        "✓ 找到 {} 个待处理文件，共 {} 份作业提交",
        total_files, total_submissions
    );
    info!("📋 最多同时处理 {} 个文件\n", max_concurrent);
}

/// 打印最终统计信息
///
/// # 参数
/// - `checked`: 完成数量
/// - `failed`: 失败数量
/// - `skipped`: 跳过数量
/// - `notified`: 已通知讲师数量
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(
    checked: usize,
    failed: usize,
    skipped: usize,
    notified: usize,
    log_file_path: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 完成: {}", checked);
    info!("❌ 失败: {}", failed);
    info!("⏭️ 跳过: {}", skipped);
    info!("📨 已通知讲师: {}", notified);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
