//! 单任务执行器
//!
//! 按密钥池顺序逐个尝试（不轮转），第一个成功即返回。

use super::client::ClientFactory;
use super::key_pool::KeyPool;
use crate::error::{AttemptFailure, GenerationError, GenerationResult};
use std::future::Future;
use tracing::{debug, info, warn};

/// 单次尝试的结果
#[derive(Debug)]
pub enum Attempt<T> {
    Succeeded(T),
    Failed(AttemptFailure),
}

/// 执行单个操作
///
/// # 参数
/// - `operation`: 接收客户端并返回结果的操作，每个密钥调用一次
/// - `keys`: 密钥池
/// - `factory`: 客户端工厂
///
/// # 返回
/// - 任一密钥成功时返回结果
/// - 全部失败返回 `ExhaustedKeys`，按池顺序记录每次失败
/// - 池为空且兜底不可用或失败时返回 `NoCredentials`
pub async fn execute<F, Op, Fut, T>(
    mut operation: Op,
    keys: &KeyPool,
    factory: &F,
) -> GenerationResult<T>
where
    F: ClientFactory,
    Op: FnMut(F::Client) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    if keys.is_empty() {
        return execute_fallback(operation, factory).await;
    }

    let mut failures = Vec::with_capacity(keys.len());

    for key in keys.keys() {
        debug!("使用密钥 {} 执行任务", key);
        let client = factory.connect(key);

        let attempt = match operation(client).await {
            Ok(value) => Attempt::Succeeded(value),
            Err(e) => Attempt::Failed(AttemptFailure {
                key: key.redacted(),
                reason: format!("{:#}", e),
            }),
        };

        match attempt {
            Attempt::Succeeded(value) => return Ok(value),
            Attempt::Failed(failure) => {
                warn!("⚠️ 密钥 {} 调用失败，尝试下一个: {}", failure.key, failure.reason);
                failures.push(failure);
            }
        }
    }

    warn!("❌ 所有 {} 个密钥均已失败", failures.len());
    Err(GenerationError::ExhaustedKeys { attempts: failures })
}

async fn execute_fallback<F, Op, Fut, T>(mut operation: Op, factory: &F) -> GenerationResult<T>
where
    F: ClientFactory,
    Op: FnMut(F::Client) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let Some(client) = factory.fallback() else {
        warn!("⚠️ 密钥池为空且未配置兜底客户端");
        return Err(GenerationError::NoCredentials);
    };

    info!("🔄 密钥池为空，使用兜底客户端");
    match operation(client).await {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!("⚠️ 兜底客户端调用失败: {:#}", e);
            Err(GenerationError::NoCredentials)
        }
    }
}
