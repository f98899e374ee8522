//! 调度层（Scheduler Layer）
//!
//! ## 职责
//!
//! 把对外部生成 API 的调用分摊到多个密钥和多个 worker 上。
//!
//! ## 模块划分
//!
//! - `key_pool` - 从配置加载密钥，去重、脱敏
//! - `single` - 单任务执行器：按顺序逐个密钥尝试
//! - `bulk` - 批量调度器：固定 worker 数，共享游标，密钥轮转
//! - `cursor` - 任务游标抽象（领取下一个索引）
//! - `aggregator` - 批次规划与结果去重汇总
//!
//! ## 错误策略
//!
//! - 单任务：全部密钥失败才返回 `ExhaustedKeys`
//! - 批量：单个任务失败只记日志，结果中直接省略
//! - 密钥池为空：单任务尝试兜底客户端，批量直接返回 `NoCredentials`

pub mod aggregator;
pub mod bulk;
pub mod client;
pub mod cursor;
pub mod key_pool;
pub mod single;

pub use aggregator::{aggregate, BatchPlan, ContentIdentity, DEFAULT_BATCH_SIZE};
pub use bulk::{
    execute_bulk, execute_bulk_detailed, execute_bulk_with_cursor, task, BulkOutcome, Task,
    TaskFailure, TaskFuture,
};
pub use client::ClientFactory;
pub use cursor::{AtomicCursor, TaskCursor};
pub use key_pool::{Credential, KeyConfig, KeyPool};
pub use single::{execute, Attempt};
