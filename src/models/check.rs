//! 查重相关的数据模型
//!
//! 这些类型只描述"一次查重"本身，不关心作业、课程等业务上下文。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::Display;

use crate::error::CheckError;

/// 远端服务要求的最短文本长度（按字符计）
pub const MIN_TEXT_LENGTH: usize = 80;

/// 默认提交语言
pub const DEFAULT_LANGUAGE: &str = "en";

/// 查重请求
///
/// 只能通过 [`CheckRequest::new`] 构造，因此持有该类型即意味着文本长度已通过校验。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    text: String,
    language: String,
}

impl CheckRequest {
    /// 创建查重请求，文本不足 80 个字符时返回 `CheckError::Validation`
    pub fn new(text: impl Into<String>, language: impl Into<String>) -> Result<Self, CheckError> {
        let text = text.into();
        let actual = text.chars().count();
        if actual < MIN_TEXT_LENGTH {
            return Err(CheckError::Validation {
                min: MIN_TEXT_LENGTH,
                actual,
            });
        }

        let language = language.into();
        let language = if language.trim().is_empty() {
            DEFAULT_LANGUAGE.to_string()
        } else {
            language
        };

        Ok(Self { text, language })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

/// 远端服务返回的文本 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CheckHandle(String);

impl CheckHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 从响应中的 id 字段解析，数字和字符串两种形式都接受
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(n.to_string())),
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.trim().to_string())),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for CheckHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        CheckHandle::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("无效的 text_id: {}", value)))
    }
}

impl Display for CheckHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 查重状态
///
/// 状态码由供应商定义，未知状态码一律归为 `Unknown`，不会报错。
/// `Unknown` 保留远端给出的整数状态码，无法解析为整数时为 `None`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckStatus {
    /// 已存储
    Stored,
    /// 已提交检测
    Submitted,
    /// 检测失败
    Failed,
    /// 检测完成
    Checked,
    /// 未知状态
    Unknown(Option<i64>),
}

impl CheckStatus {
    /// 从远端状态码解析
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => CheckStatus::Stored,
            3 => CheckStatus::Submitted,
            4 => CheckStatus::Failed,
            5 => CheckStatus::Checked,
            other => CheckStatus::Unknown(Some(other)),
        }
    }

    /// 从响应中的 `data.state` 解析
    ///
    /// 接受整数、整数值的浮点数和数字字符串，其余取值（包括 `null`）都是 `Unknown(None)`。
    pub fn from_state(state: &Value) -> Self {
        let code = match state {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };

        code.map_or(CheckStatus::Unknown(None), CheckStatus::from_code)
    }

    /// 获取远端状态码
    pub fn code(self) -> Option<i64> {
        match self {
            CheckStatus::Stored => Some(2),
            CheckStatus::Submitted => Some(3),
            CheckStatus::Failed => Some(4),
            CheckStatus::Checked => Some(5),
            CheckStatus::Unknown(code) => code,
        }
    }

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            CheckStatus::Stored => "STORED",
            CheckStatus::Submitted => "SUBMITTED",
            CheckStatus::Failed => "FAILED",
            CheckStatus::Checked => "CHECKED",
            CheckStatus::Unknown(_) => "UNKNOWN",
        }
    }

    /// 是否为终态（轮询到此为止）
    pub fn is_terminal(self) -> bool {
        matches!(self, CheckStatus::Checked | CheckStatus::Failed)
    }
}

impl Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 查重报告
///
/// 除 `percent` 外的字段由远端服务定义，原样保存在 `data` 中。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub text_id: CheckHandle,
    pub data: Value,
}

impl CheckReport {
    pub fn new(text_id: CheckHandle, data: Value) -> Self {
        Self { text_id, data }
    }

    /// 相似度百分比
    ///
    /// 远端可能返回数字或数字字符串；字段缺失或无法解析时返回 0。
    pub fn percent(&self) -> f64 {
        match self.data.get("percent") {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }
}
