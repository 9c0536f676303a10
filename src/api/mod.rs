//! 接口模块
//!
//! 对外暴露查重能力，所有错误在这一层转换为结构化响应

pub mod plagiarism;

pub use plagiarism::{ApiResponse, PlagiarismHandlers};
