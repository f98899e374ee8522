//! # Lesson Content Gen
//!
//! 课程内容获取与 AI 批量生成工具
//!
//! ## 架构设计
//!
//! ### ① 调度层（Scheduler）
//! - `scheduler/` - 把对外部生成 API 的调用分摊到多个密钥和 worker 上
//! - `KeyPool` - 从配置加载的有序、去重密钥集合
//! - `execute` - 单任务执行器，按顺序逐个密钥尝试
//! - `execute_bulk` - 批量调度器，固定 worker 数、共享游标、密钥轮转
//! - `aggregate` - 合并批次结果、去重、截断
//!
//! ### ② 业务能力层（Services）
//! - `LlmService` - 调用一次 LLM
//! - `ContentGenerator` - 生成讲义 / 批量生成单选题
//! - `ContentService` - 存储优先，生成兜底，失败返回"即将上线"
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/generation_processor` - 加载生成任务、写出结果、汇总统计
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod scheduler;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use error::{AttemptFailure, ConfigError, GenerationError, GenerationResult};
pub use models::{ContentKind, ContentRequest, GeneratedQuestion, GenerationJob, LessonContent};
pub use orchestrator::{App, ProcessingStats};
pub use scheduler::{execute, execute_bulk, KeyPool};
pub use services::{ContentGenerator, ContentService, LlmClientFactory, LlmService};
