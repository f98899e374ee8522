//! 内容生成服务 - 业务能力层
//!
//! - 讲义：单次调用，按密钥顺序逐个尝试
//! - 单选题：按批次拆分，批量并发生成，合并去重后截断到目标数量

use anyhow::{Context, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use super::llm_service::{CompletionClient, CompletionRequest};
use crate::error::GenerationResult;
use crate::models::GeneratedQuestion;
use crate::scheduler::{self, aggregate, task, BatchPlan, ClientFactory, KeyPool, Task};

const QUESTION_SYSTEM_MESSAGE: &str = "你是一名经验丰富的出题老师，只输出合法的 JSON，不要输出任何解释。";
const NOTES_SYSTEM_MESSAGE: &str = "你是一名耐心的老师，擅长用条理清晰的 Markdown 编写课程讲义。";

/// 批量出题的结果
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub questions: Vec<GeneratedQuestion>,
    pub requested: usize,
    pub batches: usize,
    pub failed_batches: usize,
}

impl GenerationReport {
    pub fn delivered(&self) -> usize {
        self.questions.len()
    }

    /// 实际数量少于请求数量
    pub fn is_partial(&self) -> bool {
        self.delivered() < self.requested
    }
}

/// 内容生成服务
pub struct ContentGenerator<F: ClientFactory> {
    keys: KeyPool,
    factory: Arc<F>,
    concurrency: usize,
    batch_size: usize,
}

impl<F> ContentGenerator<F>
where
    F: ClientFactory,
    F::Client: CompletionClient,
{
    pub fn new(keys: KeyPool, factory: Arc<F>, concurrency: usize, batch_size: usize) -> Self {
        Self {
            keys,
            factory,
            concurrency,
            batch_size,
        }
    }

    /// 生成课程讲义
    pub async fn generate_notes(&self, subject: &str, topic: &str) -> GenerationResult<String> {
        let request = CompletionRequest::new(build_notes_prompt(subject, topic))
            .with_system(NOTES_SYSTEM_MESSAGE);

        scheduler::execute(
            |client: F::Client| {
                let request = request.clone();
                async move {
                    let notes = client.complete(&request).await?;
                    if notes.trim().is_empty() {
                        anyhow::bail!("LLM 返回的讲义为空");
                    }
                    Ok(notes)
                }
            },
            &self.keys,
            self.factory.as_ref(),
        )
        .await
    }

    /// 批量生成单选题
    ///
    /// 数量不足时不会报错，调用方通过 [`GenerationReport::is_partial`] 判断
    pub async fn generate_questions(
        &self,
        subject: &str,
        topic: &str,
        target: usize,
    ) -> GenerationResult<GenerationReport> {
        let plan = BatchPlan::for_target(target, self.batch_size);
        crate::utils::logging::log_batch_plan(plan.target, plan.batch_count, plan.batch_size);

        let tasks: Vec<Task<F::Client, Vec<GeneratedQuestion>>> = (0..plan.batch_count)
            .map(|batch| {
                let request = CompletionRequest::new(build_question_prompt(
                    subject,
                    topic,
                    plan.batch_size,
                    batch,
                ))
                .with_system(QUESTION_SYSTEM_MESSAGE);

                task(move |client: F::Client| async move {
                    let response = client.complete(&request).await?;
                    parse_questions(&response)
                        .with_context(|| format!("第 {} 批题目解析失败", batch + 1))
                })
            })
            .collect();

        let outcome = scheduler::execute_bulk_detailed(
            tasks,
            self.concurrency,
            &self.keys,
            self.factory.clone(),
        )
        .await?;

        let failed_batches = outcome.failures.len();
        let questions = aggregate(outcome.into_results(), target);

        let report = GenerationReport {
            questions,
            requested: target,
            batches: plan.batch_count,
            failed_batches,
        };

        if report.is_partial() {
            warn!(
                "⚠️ 题目数量不足: {}/{} (失败批次 {})",
                report.delivered(),
                report.requested,
                report.failed_batches
            );
        } else {
            info!("✓ 出题完成: {} 道", report.delivered());
        }

        Ok(report)
    }
}

/// 构建出题提示词
///
/// `batch` 用于提示模型变换角度，减少批次之间的重复
fn build_question_prompt(subject: &str, topic: &str, count: usize, batch: usize) -> String {
    format!(
        r#"请为学科「{subject}」中的知识点「{topic}」编写 {count} 道单选题。

【要求】
- 每道题 4 个选项，只有一个正确答案
- correct_answer 必须与某个选项的文字完全一致
- 题目之间不能重复，这是第 {batch_no} 组题目，请尽量覆盖与前几组不同的角度
- 给出简短的解析

【输出格式】
只返回 JSON 数组，例如：
[
  {{"question": "...", "options": ["...", "...", "...", "..."], "correct_answer": "...", "explanation": "..."}}
]"#,
        batch_no = batch + 1
    )
}

fn build_notes_prompt(subject: &str, topic: &str) -> String {
    format!(
        "请为学科「{}」中的知识点「{}」编写一份课程讲义，包含概念讲解、关键要点和一个例子，使用 Markdown 格式。",
        subject, topic
    )
}

/// 解析 LLM 返回的题目列表
///
/// 支持 ```json 代码块包裹、`{"questions": [...]}` 包裹；
/// 格式不正确的单个题目会被丢弃，整体无法解析时返回错误。
pub fn parse_questions(response: &str) -> Result<Vec<GeneratedQuestion>> {
    let body = strip_code_fence(response);

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => {
            // 模型有时会在 JSON 前后附带说明文字
            let start = body.find('[').context("响应中没有 JSON 数组")?;
            let end = body.rfind(']').context("响应中没有 JSON 数组")?;
            if end < start {
                anyhow::bail!("响应中没有 JSON 数组");
            }
            serde_json::from_str(&body[start..=end]).context("无法解析题目 JSON")?
        }
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => items,
            _ => anyhow::bail!("JSON 对象中没有 questions 数组"),
        },
        _ => anyhow::bail!("题目 JSON 不是数组"),
    };

    let total = items.len();
    let questions: Vec<GeneratedQuestion> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<GeneratedQuestion>(item).ok())
        .filter(GeneratedQuestion::is_valid)
        .collect();

    if questions.len() < total {
        debug!("丢弃了 {} 道格式不正确的题目", total - questions.len());
    }

    Ok(questions)
}

static CODE_FENCE: OnceLock<Option<Regex>> = OnceLock::new();

fn strip_code_fence(response: &str) -> &str {
    let fence = CODE_FENCE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").ok());
    if let Some(inner) = fence
        .as_ref()
        .and_then(|re| re.captures(response))
        .and_then(|cap| cap.get(1))
    {
        return inner.as_str();
    }
    response.trim()
}
