//! # LMS Plagiarism
//!
//! 在线学习平台的作业查重模块：把学生提交的文本交给第三方查重服务，
//! 轮询到终态后取回报告，并把相似度关联回作业、通知课程讲师。
//!
//! ## 架构设计
//!
//! ### ① 外部服务层（Clients）
//! - `clients/` - 只负责和查重服务通信
//! - `PlagiarismApi` - 提交 / 查询状态 / 取报告三个能力
//! - `PlagiarismClient` - 基于 reqwest 的实现
//!
//! ### ② 业务能力层（Services）
//! - `PlagiarismChecker` - 提交后按间隔轮询，直到终态、超时或取消
//! - `CheckQueue` - 后台队列，限制同时进行的查重数量
//! - `AssignmentDirectory` - 作业 → 讲师 关联查找
//! - `NotificationSink` - 通知写入
//!
//! ### ③ 流程层（Workflow）
//! - `SubmissionCtx` - 上下文封装（作业 + 提交人）
//! - `SubmissionFlow` - 查重 → 取分 → 通知讲师
//!
//! ### ④ 接口层与编排层
//! - `api/` - 与 Web 框架无关的处理函数，统一转换错误
//! - `orchestrator/` - 批量处理提交文件
//!
//! ## 模块结构

pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use api::{ApiResponse, PlagiarismHandlers};
pub use clients::{PlagiarismApi, PlagiarismClient};
pub use config::Config;
pub use error::{AppError, AppResult, CheckError};
pub use models::{CheckHandle, CheckReport, CheckRequest, CheckStatus};
pub use orchestrator::{App, SubmissionStats};
pub use services::{CheckQueue, CheckTicket, PlagiarismChecker};
pub use workflow::{CheckOutcome, SubmissionCtx, SubmissionFlow};
