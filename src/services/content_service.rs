//! 课程内容获取服务
//!
//! 先查已存储的内容，没有再调用 AI 生成；生成失败时返回"即将上线"，不向上抛错。

use tracing::{info, warn};

use super::content_generator::ContentGenerator;
use super::llm_service::CompletionClient;
use crate::models::{load_stored_lesson, ContentKind, ContentRequest, LessonContent};
use crate::scheduler::ClientFactory;

pub struct ContentService<F: ClientFactory> {
    generator: ContentGenerator<F>,
    content_folder: String,
}

impl<F> ContentService<F>
where
    F: ClientFactory,
    F::Client: CompletionClient,
{
    pub fn new(generator: ContentGenerator<F>, content_folder: impl Into<String>) -> Self {
        Self {
            generator,
            content_folder: content_folder.into(),
        }
    }

    /// 获取课程内容
    pub async fn fetch(&self, request: &ContentRequest) -> LessonContent {
        if let Some(content) = self.fetch_stored(request).await {
            info!("📚 使用已存储内容: {}/{} ({})", request.subject, request.topic, request.kind);
            return content;
        }

        if !request.kind.is_generatable() {
            info!("{} 类型内容不存在，标记为即将上线", request.kind);
            return LessonContent::coming_soon(request);
        }

        self.generate(request).await
    }

    async fn fetch_stored(&self, request: &ContentRequest) -> Option<LessonContent> {
        match load_stored_lesson(&self.content_folder, &request.subject, &request.topic).await {
            Ok(Some(stored)) => LessonContent::from_stored(request, stored),
            Ok(None) => None,
            Err(e) => {
                warn!("⚠️ 读取已存储内容失败，改为生成: {:#}", e);
                None
            }
        }
    }

    async fn generate(&self, request: &ContentRequest) -> LessonContent {
        match request.kind {
            ContentKind::Notes => match self.generator.generate_notes(&request.subject, &request.topic).await {
                Ok(notes) => LessonContent::generated_notes(request, notes),
                Err(e) => {
                    warn!("⚠️ 讲义生成失败: {}", e);
                    LessonContent::coming_soon(request)
                }
            },
            ContentKind::Mcq => {
                match self
                    .generator
                    .generate_questions(&request.subject, &request.topic, request.count)
                    .await
                {
                    Ok(report) if !report.questions.is_empty() => {
                        LessonContent::generated_questions(request, report.questions)
                    }
                    Ok(_) => {
                        warn!("⚠️ 没有生成任何题目");
                        LessonContent::coming_soon(request)
                    }
                    Err(e) => {
                        warn!("⚠️ 题目生成失败: {}", e);
                        LessonContent::coming_soon(request)
                    }
                }
            }
            ContentKind::Video | ContentKind::Pdf => LessonContent::coming_soon(request),
        }
    }
}
