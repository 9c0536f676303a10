//! 通知写入服务 - 业务能力层
//!
//! 只负责"创建一条通知"能力，不关心流程

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::NotificationError;
use crate::models::lms::Notification;

/// 通知存储
///
/// 上游 LMS 的通知表在这里只暴露"写入"这一个能力。
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn create(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// 内存通知存储，用于测试和嵌入式场景
#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    items: Mutex<Vec<Notification>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已写入通知的快照
    pub fn notifications(&self) -> Vec<Notification> {
        self.items
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationStore {
    async fn create(&self, notification: Notification) -> Result<(), NotificationError> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| NotificationError::Unavailable(e.to_string()))?;
        items.push(notification);
        Ok(())
    }
}

/// 文件通知存储
///
/// 职责：
/// - 每条通知以一行 JSON 追加到文件
/// - 同一进程内的写入串行化，避免行交错
pub struct FileNotificationSink {
    file_path: String,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileNotificationSink {
    /// 使用自定义文件路径创建
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            file_path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &str {
        &self.file_path
    }
}

#[async_trait]
impl NotificationSink for FileNotificationSink {
    async fn create(&self, notification: Notification) -> Result<(), NotificationError> {
        debug!(
            "写入通知: 用户 {} | 类型 {:?} | 标题: {}",
            notification.user_id, notification.notification_type, notification.title
        );

        let mut line = serde_json::to_string(&notification)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}
