//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量查重和流程调度，只做调度和统计，不做具体业务判断。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载提交文件（Vec<SubmissionBatch>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `submission_processor` - 单个文件处理器
//! - 遍历文件中的所有提交（Vec<AssignmentSubmission>）
//! - 查找作业和提交人，缺失时跳过
//! - 清理处理完的文件
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<SubmissionBatch>)
//!     ↓
//! submission_processor (处理 Vec<AssignmentSubmission>)
//!     ↓
//! workflow::SubmissionFlow (处理单份提交)
//!     ↓
//! services (能力层：checker / directory / notifications)
//!     ↓
//! clients (外部服务：查重 API)
//! ```

pub mod batch_processor;
pub mod submission_processor;

// 重新导出主要类型
pub use batch_processor::App;
pub use submission_processor::{process_batch, SubmissionStats};
