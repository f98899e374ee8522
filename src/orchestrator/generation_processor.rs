//! 批量生成任务处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责生成任务的加载、执行和统计。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：加载密钥池，构造客户端工厂和内容服务
//! 2. **批量加载**：扫描 jobs 目录下的所有生成任务
//! 3. **逐个执行**：每个任务内部由调度层并发处理
//! 4. **结果输出**：把课程内容写成 JSON 文件
//! 5. **全局统计**：完整 / 数量不足 / 即将上线

use crate::config::Config;
use crate::models::{ContentKind, GenerationJob, LessonContent};
use crate::scheduler::{ClientFactory, KeyPool};
use crate::services::{CompletionClient, ContentGenerator, ContentService, LlmClientFactory};
use crate::utils::logging;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// 应用主结构
pub struct App<F: ClientFactory = LlmClientFactory> {
    config: Config,
    content_service: ContentService<F>,
}

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub partial: usize,
    pub coming_soon: usize,
    pub failed: usize,
    pub total: usize,
}

/// 单个任务的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobResult {
    Complete,
    Partial,
    ComingSoon,
}

impl App<LlmClientFactory> {
    /// 使用真实 LLM 客户端初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        let factory = LlmClientFactory::new(&config);
        Self::with_factory(config, factory)
    }
}

impl<F> App<F>
where
    F: ClientFactory,
    F::Client: CompletionClient,
{
    /// 使用自定义客户端工厂初始化应用
    pub fn with_factory(config: Config, factory: F) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)
            .with_context(|| format!("无法创建日志文件: {}", config.output_log_file))?;

        let keys = KeyPool::load(&config.key_config());
        logging::log_startup(keys.len(), config.max_concurrent_workers, config.questions_per_batch);

        let generator = ContentGenerator::new(
            keys,
            Arc::new(factory),
            config.max_concurrent_workers,
            config.questions_per_batch,
        );
        let content_service = ContentService::new(generator, config.content_folder.clone());

        Ok(Self {
            config,
            content_service,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        info!("\n📁 正在扫描待处理的生成任务...");
        let jobs = crate::models::load_all_jobs(&self.config.jobs_folder).await?;

        if jobs.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        logging::log_jobs_loaded(jobs.len());
        tokio::fs::create_dir_all(&self.config.output_folder)
            .await
            .with_context(|| format!("无法创建输出目录: {}", self.config.output_folder))?;

        let mut stats = ProcessingStats {
            total: jobs.len(),
            ..Default::default()
        };

        for (idx, job) in jobs.iter().enumerate() {
            logging::log_job_start(idx + 1, jobs.len(), &job.name);

            let status = match self.process_job(job).await {
                Ok(JobResult::Complete) => {
                    stats.success += 1;
                    "完整".to_string()
                }
                Ok(JobResult::Partial) => {
                    stats.partial += 1;
                    "数量不足".to_string()
                }
                Ok(JobResult::ComingSoon) => {
                    stats.coming_soon += 1;
                    "即将上线".to_string()
                }
                Err(e) => {
                    warn!("[任务 {}] ❌ 处理失败: {:#}", idx + 1, e);
                    stats.failed += 1;
                    format!("失败: {:#}", e)
                }
            };

            let line = format!("[任务 {}] {} - {}", idx + 1, job.name, status);
            if let Err(e) = logging::append_log_line(&self.config.output_log_file, &line) {
                warn!("⚠️ 无法写入日志文件: {:#}", e);
            }
        }

        logging::print_final_stats(
            stats.success,
            stats.partial,
            stats.coming_soon,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );

        Ok(stats)
    }

    /// 处理单个生成任务并写出结果
    pub async fn process_job(&self, job: &GenerationJob) -> Result<JobResult> {
        let request = job.to_request();
        let content = self.content_service.fetch(&request).await;
        let result = classify(job, &content);

        let output_path = Path::new(&self.config.output_folder).join(job.output_file_name());
        let json = serde_json::to_string_pretty(&content)?;
        tokio::fs::write(&output_path, json)
            .await
            .with_context(|| format!("无法写入结果文件: {}", output_path.display()))?;

        info!("✓ 结果已写入: {}", output_path.display());
        Ok(result)
    }
}

fn classify(job: &GenerationJob, content: &LessonContent) -> JobResult {
    if content.is_coming_soon {
        JobResult::ComingSoon
    } else if job.kind == ContentKind::Mcq && content.questions.len() < job.count {
        JobResult::Partial
    } else {
        JobResult::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentRequest, GeneratedQuestion};

    fn job(kind: ContentKind, count: usize) -> GenerationJob {
        GenerationJob {
            name: "t".to_string(),
            subject: "s".to_string(),
            topic: "t".to_string(),
            kind,
            count,
            file_path: None,
        }
    }

    fn questions(n: usize) -> Vec<GeneratedQuestion> {
        (0..n)
            .map(|i| GeneratedQuestion {
                question: format!("q{}", i),
                options: vec!["A".to_string(), "B".to_string()],
                correct_answer: "A".to_string(),
                explanation: None,
            })
            .collect()
    }

    #[test]
    fn test_classify() {
        let mcq = job(ContentKind::Mcq, 3);
        let request: ContentRequest = mcq.to_request();

        let full = LessonContent::generated_questions(&request, questions(3));
        assert_eq!(classify(&mcq, &full), JobResult::Complete);

        let short = LessonContent::generated_questions(&request, questions(2));
        assert_eq!(classify(&mcq, &short), JobResult::Partial);

        let unavailable = LessonContent::coming_soon(&request);
        assert_eq!(classify(&mcq, &unavailable), JobResult::ComingSoon);

        let notes = job(ContentKind::Notes, 3);
        let content = LessonContent::generated_notes(&notes.to_request(), "n".to_string());
        assert_eq!(classify(&notes, &content), JobResult::Complete);
    }
}
