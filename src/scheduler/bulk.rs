//! 批量任务调度器
//!
//! ## 调度模型
//!
//! - 固定数量的 worker（`min(并发数, 任务数)`），通过 `tokio::spawn` 并发运行
//! - 所有 worker 共享一个任务游标，循环领取下一个任务索引
//! - 第 `w` 个 worker 处理第 `i` 个任务时使用密钥 `(w + i) mod 密钥数`
//! - 单个任务失败只记录日志，对应结果槽位留空，不重试
//! - 全部 worker 结束后按提交顺序过滤掉空槽位
//!
//! ```text
//! tasks[0..n] ──► cursor.claim() ──► worker w ──► key (w + i) % k ──► slots[i]
//! ```

use super::client::ClientFactory;
use super::cursor::{AtomicCursor, TaskCursor};
use super::key_pool::KeyPool;
use crate::error::{GenerationError, GenerationResult};
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// 任务返回的 future
pub type TaskFuture<T> = BoxFuture<'static, anyhow::Result<T>>;

/// 一个批量任务：接收绑定了密钥的客户端，返回结果或失败
pub type Task<C, T> = Box<dyn FnOnce(C) -> TaskFuture<T> + Send>;

/// 把普通的异步闭包包装成 [`Task`]
pub fn task<C, T, Op, Fut>(operation: Op) -> Task<C, T>
where
    Op: FnOnce(C) -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    Box::new(move |client| operation(client).boxed())
}

/// 单个任务的失败记录（仅批量模式）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub index: usize,
    pub worker: usize,
    pub key: String,
    pub reason: String,
}

/// 批量执行的完整结果
#[derive(Debug)]
pub struct BulkOutcome<T> {
    /// 按提交顺序排列，失败的任务为 None
    pub slots: Vec<Option<T>>,
    pub workers_spawned: usize,
    /// 按任务索引排序
    pub failures: Vec<TaskFailure>,
}

impl<T> BulkOutcome<T> {
    fn empty() -> Self {
        Self {
            slots: Vec::new(),
            workers_spawned: 0,
            failures: Vec::new(),
        }
    }

    pub fn submitted(&self) -> usize {
        self.slots.len()
    }

    pub fn delivered(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// 丢弃空槽位，保持提交顺序
    pub fn into_results(self) -> Vec<T> {
        self.slots.into_iter().flatten().collect()
    }
}

/// 批量执行任务
///
/// 密钥池为空时直接返回 `NoCredentials`，不会启动任何 worker。
/// 失败的任务被静默丢弃，调用方需要自行比较结果数量。
pub async fn execute_bulk<F, T>(
    tasks: Vec<Task<F::Client, T>>,
    concurrency: usize,
    keys: &KeyPool,
    factory: Arc<F>,
) -> GenerationResult<Vec<T>>
where
    F: ClientFactory,
    T: Send + 'static,
{
    execute_bulk_detailed(tasks, concurrency, keys, factory)
        .await
        .map(BulkOutcome::into_results)
}

/// 批量执行任务，返回包含失败信息的完整结果
pub async fn execute_bulk_detailed<F, T>(
    tasks: Vec<Task<F::Client, T>>,
    concurrency: usize,
    keys: &KeyPool,
    factory: Arc<F>,
) -> GenerationResult<BulkOutcome<T>>
where
    F: ClientFactory,
    T: Send + 'static,
{
    execute_bulk_with_cursor(tasks, concurrency, keys, factory, Arc::new(AtomicCursor::new())).await
}

/// 使用指定游标批量执行任务
pub async fn execute_bulk_with_cursor<F, T>(
    tasks: Vec<Task<F::Client, T>>,
    concurrency: usize,
    keys: &KeyPool,
    factory: Arc<F>,
    cursor: Arc<dyn TaskCursor>,
) -> GenerationResult<BulkOutcome<T>>
where
    F: ClientFactory,
    T: Send + 'static,
{
    if keys.is_empty() {
        error!("❌ 批量模式需要至少一个 API 密钥");
        return Err(GenerationError::NoCredentials);
    }

    let total = tasks.len();
    if total == 0 {
        return Ok(BulkOutcome::empty());
    }

    let active_workers = concurrency.max(1).min(total);
    info!(
        "🚀 批量执行 {} 个任务，worker 数: {}，密钥数: {}",
        total,
        active_workers,
        keys.len()
    );

    let queue: Arc<Vec<Mutex<Option<Task<F::Client, T>>>>> =
        Arc::new(tasks.into_iter().map(|t| Mutex::new(Some(t))).collect());
    let keys = Arc::new(keys.clone());

    let mut handles = Vec::with_capacity(active_workers);
    for worker in 0..active_workers {
        let ctx = WorkerCtx {
            worker,
            queue: queue.clone(),
            cursor: cursor.clone(),
            keys: keys.clone(),
            factory: factory.clone(),
        };
        handles.push((worker, tokio::spawn(ctx.run())));
    }

    let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();
    let mut failures = Vec::new();

    for (worker, handle) in handles {
        match handle.await {
            Ok(report) => {
                for (index, value) in report.completed {
                    slots[index] = Some(value);
                }
                failures.extend(report.failures);
            }
            Err(e) => {
                error!("[worker {}] 执行中断: {}", worker, e);
            }
        }
    }

    failures.sort_by_key(|f| f.index);

    let outcome = BulkOutcome {
        slots,
        workers_spawned: active_workers,
        failures,
    };

    if outcome.delivered() < total {
        warn!(
            "⚠️ 批量执行完成: 成功 {}/{}，失败的任务已丢弃",
            outcome.delivered(),
            total
        );
    } else {
        info!("✓ 批量执行完成: 成功 {}/{}", total, total);
    }

    Ok(outcome)
}

/// 单个 worker 的运行上下文
struct WorkerCtx<F: ClientFactory, T> {
    worker: usize,
    queue: Arc<Vec<Mutex<Option<Task<F::Client, T>>>>>,
    cursor: Arc<dyn TaskCursor>,
    keys: Arc<KeyPool>,
    factory: Arc<F>,
}

/// worker 结束后上交的结果
struct WorkerReport<T> {
    completed: Vec<(usize, T)>,
    failures: Vec<TaskFailure>,
}

impl<F, T> WorkerCtx<F, T>
where
    F: ClientFactory,
    T: Send + 'static,
{
    async fn run(self) -> WorkerReport<T> {
        let total = self.queue.len();
        let mut report = WorkerReport {
            completed: Vec::new(),
            failures: Vec::new(),
        };

        loop {
            let index = self.cursor.claim();
            if index >= total {
                break;
            }

            let Some(key) = self.keys.rotated(self.worker, index) else {
                break;
            };

            let task = self.queue[index].lock().ok().and_then(|mut slot| slot.take());
            let Some(task) = task else {
                // 同一索引不会被领取两次，只有游标实现有误时才会走到这里
                error!("[worker {}] 任务 {} 已被取走", self.worker, index);
                continue;
            };

            debug!("[worker {}] 领取任务 {}，密钥 {}", self.worker, index, key);
            // 构造客户端、调用闭包本身都可能 panic，一并兜住
            let run = async {
                let client = self.factory.connect(key);
                task(client).await
            };

            let result = match AssertUnwindSafe(run).catch_unwind().await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!("任务 panic")),
            };

            match result {
                Ok(value) => {
                    debug!("[worker {}] ✓ 任务 {} 完成", self.worker, index);
                    report.completed.push((index, value));
                }
                Err(e) => {
                    warn!(
                        "[worker {}] ⚠️ 任务 {} 失败 (密钥 {}): {:#}",
                        self.worker, index, key, e
                    );
                    report.failures.push(TaskFailure {
                        index,
                        worker: self.worker,
                        key: key.redacted(),
                        reason: format!("{:#}", e),
                    });
                }
            }
        }

        report
    }
}
