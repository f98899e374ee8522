//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! generation_processor (处理 Vec<GenerationJob>)
//!     ↓
//! services::ContentService (存储优先，生成兜底)
//!     ↓
//! services::ContentGenerator (讲义 / 单选题)
//!     ↓
//! scheduler (密钥池 / 单任务 / 批量 / 汇总)
//!     ↓
//! services::LlmService (外部 API)
//! ```
//!
//! 编排层只做调度和统计，不做具体业务判断。

pub mod generation_processor;

pub use generation_processor::{App, JobResult, ProcessingStats};
