use std::time::Duration;

use thiserror::Error;

use crate::models::check::CheckHandle;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 查重相关错误
    #[error("查重错误: {0}")]
    Check(#[from] CheckError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 查重流程错误
///
/// 覆盖提交、轮询、取报告三个阶段的全部失败情况，调用方只需处理这一个类型。
#[derive(Debug, Error)]
pub enum CheckError {
    /// 输入校验失败（文本过短），不会发出任何网络请求
    #[error("文本长度至少为 {min} 个字符 (当前: {actual})")]
    Validation { min: usize, actual: usize },

    /// 远端服务调用失败：网络错误、非 2xx 响应或响应体不合法
    #[error("查重服务调用失败 ({endpoint}): status={status:?}, {message}")]
    Remote {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    /// 远端服务报告检测失败（状态码 4）
    #[error("查重服务报告检测失败 (text_id: {handle})")]
    CheckFailed { handle: CheckHandle },

    /// 在最长等待时间内没有进入终态
    #[error("查重超时 (text_id: {handle}, 已等待 {waited:?})")]
    Timeout { handle: CheckHandle, waited: Duration },

    /// 任务被调用方取消
    #[error("查重任务已取消")]
    Cancelled,
}

impl CheckError {
    /// 创建远端调用错误
    pub fn remote(
        endpoint: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        CheckError::Remote {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    /// 远端返回的 HTTP 状态码（如果有）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CheckError::Remote { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CheckError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|u| u.path().to_string())
            .unwrap_or_default();
        CheckError::Remote {
            endpoint,
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 通知写入错误
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("通知序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("通知写入失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("通知存储不可用: {0}")]
    Unavailable(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必填配置缺失
    #[error("配置项 {var_name} 不能为空")]
    Missing { var_name: String },
    /// 配置值不合法
    #[error("配置项 {var_name} 的值 '{value}' 不合法: {reason}")]
    Invalid {
        var_name: String,
        value: String,
        reason: String,
    },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_keeps_status_code() {
        let err = CheckError::remote("/text", Some(502), "bad gateway");
        assert_eq!(err.status_code(), Some(502));
        assert!(err.to_string().contains("/text"));

        let err = CheckError::Cancelled;
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_app_error_wraps_check_error() {
        let err: AppError = CheckError::Validation { min: 80, actual: 3 }.into();
        assert!(matches!(err, AppError::Check(CheckError::Validation { .. })));
        assert!(err.to_string().contains("80"));
    }
}
