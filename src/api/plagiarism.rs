//! 查重接口层
//!
//! 与 Web 框架无关的处理函数：输入已解析好的用户和参数，输出状态码 + JSON。
//! 所有 `CheckError` 都在这里转换为 `{"error": ...}`，不会向上抛出。

use serde_json::{json, Value};
use tracing::{error, info};

use crate::clients::PlagiarismApi;
use crate::error::CheckError;
use crate::models::check::CheckHandle;
use crate::models::lms::User;
use crate::workflow::{SubmissionCtx, SubmissionFlow};

/// 接口响应
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 查重错误对应的状态码和对外文案
fn check_error_response(err: &CheckError) -> ApiResponse {
    match err {
        CheckError::Validation { min, .. } => ApiResponse::error(
            400,
            format!("Text must be at least {} characters long", min),
        ),
        CheckError::Remote {
            status: Some(code), ..
        } => ApiResponse::error(500, format!("API request failed with status {}", code)),
        CheckError::Remote { message, .. } => ApiResponse::error(500, message.clone()),
        CheckError::CheckFailed { .. } => ApiResponse::error(500, "Plagiarism check failed"),
        CheckError::Timeout { .. } => ApiResponse::error(500, "Plagiarism check timed out"),
        CheckError::Cancelled => ApiResponse::error(500, "Plagiarism check cancelled"),
    }
}

fn require_user(user: Option<&User>) -> Result<&User, ApiResponse> {
    user.ok_or_else(|| ApiResponse::error(401, "Authentication required"))
}

/// 远端分配的文本 ID 只包含字母、数字、`-` 和 `_`
fn parse_text_id(text_id: &str) -> Result<CheckHandle, ApiResponse> {
    let well_formed = !text_id.is_empty()
        && text_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if well_formed {
        Ok(CheckHandle::new(text_id))
    } else {
        Err(ApiResponse::error(400, "Invalid text_id"))
    }
}

/// 查重接口
pub struct PlagiarismHandlers<A> {
    flow: SubmissionFlow<A>,
}

impl<A: PlagiarismApi> PlagiarismHandlers<A> {
    pub fn new(flow: SubmissionFlow<A>) -> Self {
        Self { flow }
    }

    /// 直接检查一段文本
    pub async fn check_plagiarism(
        &self,
        user: Option<&User>,
        text: &str,
        language: Option<&str>,
    ) -> ApiResponse {
        if let Err(response) = require_user(user) {
            return response;
        }
        if text.is_empty() {
            return ApiResponse::error(400, "Text is required");
        }

        let language = language
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(self.flow.language());

        match self
            .flow
            .checker()
            .check_complete(text, language, self.flow.max_wait())
            .await
        {
            Ok(report) => ApiResponse::ok(json!({
                "success": true,
                "text_id": report.text_id,
                "report": report.data,
            })),
            Err(e) => {
                error!("❌ 文本查重失败: {}", e);
                check_error_response(&e)
            }
        }
    }

    /// 检查作业提交，学生提交时通知讲师
    pub async fn check_assignment_plagiarism(
        &self,
        user: Option<&User>,
        assignment_id: u64,
        text: &str,
    ) -> ApiResponse {
        let user = match require_user(user) {
            Ok(user) => user,
            Err(response) => return response,
        };
        if !user.role.can_check_assignments() {
            return ApiResponse::error(403, "Access denied");
        }

        let Some(assignment) = self.flow.directory().find_assignment(assignment_id) else {
            return ApiResponse::error(404, "Assignment not found");
        };

        if text.is_empty() {
            return ApiResponse::error(400, "Submission text is required");
        }

        let ctx = SubmissionCtx::new(assignment_id, user.clone());
        match self.flow.run(&ctx, &assignment, text).await {
            Ok(outcome) => {
                info!("{} ✓ 接口返回查重结果", ctx);
                ApiResponse::ok(json!({
                    "success": true,
                    "assignment_id": outcome.assignment_id,
                    "plagiarism_score": outcome.plagiarism_score,
                    "report": outcome.report.data,
                    "message": outcome.message,
                }))
            }
            Err(e) => {
                error!("{} ❌ 作业查重失败: {}", ctx, e);
                check_error_response(&e)
            }
        }
    }

    /// 查询一次状态
    ///
    /// `status` 原样返回远端的整数状态码，未知状态码也会保留。
    pub async fn get_plagiarism_status(&self, user: Option<&User>, text_id: &str) -> ApiResponse {
        if let Err(response) = require_user(user) {
            return response;
        }

        let handle = match parse_text_id(text_id) {
            Ok(handle) => handle,
            Err(response) => return response,
        };
        match self.flow.checker().api().poll_status(&handle).await {
            Ok(status) => ApiResponse::ok(json!({
                "success": true,
                "text_id": handle,
                "status": status.code(),
                "status_name": status.name(),
            })),
            Err(e) => {
                error!("❌ 查询状态失败 (text_id: {}): {}", handle, e);
                check_error_response(&e)
            }
        }
    }

    /// 获取报告
    pub async fn get_plagiarism_report(&self, user: Option<&User>, text_id: &str) -> ApiResponse {
        if let Err(response) = require_user(user) {
            return response;
        }

        let handle = match parse_text_id(text_id) {
            Ok(handle) => handle,
            Err(response) => return response,
        };
        match self.flow.checker().api().fetch_report(&handle).await {
            Ok(report) => ApiResponse::ok(json!({
                "success": true,
                "text_id": report.text_id,
                "report": report.data,
            })),
            Err(e) => {
                error!("❌ 获取报告失败 (text_id: {}): {}", handle, e);
                check_error_response(&e)
            }
        }
    }
}
