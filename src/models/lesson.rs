use super::question::GeneratedQuestion;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 课程内容类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Notes,
    Mcq,
    Video,
    Pdf,
}

impl ContentKind {
    /// 是否可以由 AI 生成（视频和 PDF 只能从已有内容中获取）
    pub fn is_generatable(self) -> bool {
        matches!(self, ContentKind::Notes | ContentKind::Mcq)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentKind::Notes => "notes",
            ContentKind::Mcq => "mcq",
            ContentKind::Video => "video",
            ContentKind::Pdf => "pdf",
        };
        f.write_str(name)
    }
}

/// 内容请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRequest {
    pub subject: String,
    pub topic: String,
    pub kind: ContentKind,
    /// 单选题数量，其他类型忽略
    #[serde(default)]
    pub count: usize,
}

/// 内容来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    Stored,
    Generated,
    Unavailable,
}

/// 一节课的内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonContent {
    pub subject: String,
    pub topic: String,
    pub kind: ContentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<GeneratedQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_url: Option<String>,
    /// 内容暂不可用，界面应显示"即将上线"而不是报错
    #[serde(rename = "isComingSoon", default)]
    pub is_coming_soon: bool,
    pub source: ContentSource,
}

impl LessonContent {
    fn empty(request: &ContentRequest, source: ContentSource) -> Self {
        Self {
            subject: request.subject.clone(),
            topic: request.topic.clone(),
            kind: request.kind,
            notes: None,
            questions: Vec::new(),
            resource_url: None,
            is_coming_soon: false,
            source,
        }
    }

    pub fn coming_soon(request: &ContentRequest) -> Self {
        Self {
            is_coming_soon: true,
            ..Self::empty(request, ContentSource::Unavailable)
        }
    }

    pub fn generated_notes(request: &ContentRequest, notes: String) -> Self {
        Self {
            notes: Some(notes),
            ..Self::empty(request, ContentSource::Generated)
        }
    }

    pub fn generated_questions(request: &ContentRequest, questions: Vec<GeneratedQuestion>) -> Self {
        Self {
            questions,
            ..Self::empty(request, ContentSource::Generated)
        }
    }

    /// 从存储的内容中取出请求类型对应的部分，没有则返回 None
    pub fn from_stored(request: &ContentRequest, stored: StoredLesson) -> Option<Self> {
        let mut content = Self::empty(request, ContentSource::Stored);
        match request.kind {
            ContentKind::Notes => content.notes = Some(stored.notes?),
            ContentKind::Mcq => {
                if stored.questions.is_empty() {
                    return None;
                }
                content.questions = stored.questions;
            }
            ContentKind::Video => content.resource_url = Some(stored.video_url?),
            ContentKind::Pdf => content.resource_url = Some(stored.pdf_url?),
        }
        Some(content)
    }
}

/// 内容目录中 `<subject>/<topic>.toml` 的文件格式
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredLesson {
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub questions: Vec<GeneratedQuestion>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(kind: ContentKind) -> ContentRequest {
        ContentRequest {
            subject: "biology".to_string(),
            topic: "cells".to_string(),
            kind,
            count: 5,
        }
    }

    #[test]
    fn test_coming_soon_serializes_flag() {
        let content = LessonContent::coming_soon(&request(ContentKind::Video));
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["isComingSoon"], true);
        assert_eq!(json["source"], "unavailable");
        assert_eq!(json["kind"], "video");
        assert!(json.get("questions").is_none());
    }

    #[test]
    fn test_from_stored_picks_requested_kind() {
        let stored = StoredLesson {
            notes: Some("细胞是生命的基本单位".to_string()),
            video_url: Some("https://cdn.example.com/cells.mp4".to_string()),
            ..Default::default()
        };

        let notes = LessonContent::from_stored(&request(ContentKind::Notes), stored.clone()).unwrap();
        assert_eq!(notes.source, ContentSource::Stored);
        assert!(notes.notes.is_some());

        let video = LessonContent::from_stored(&request(ContentKind::Video), stored.clone()).unwrap();
        assert_eq!(video.resource_url.as_deref(), Some("https://cdn.example.com/cells.mp4"));

        assert!(LessonContent::from_stored(&request(ContentKind::Pdf), stored.clone()).is_none());
        assert!(LessonContent::from_stored(&request(ContentKind::Mcq), stored).is_none());
    }

    #[test]
    fn test_generatable_kinds() {
        assert!(ContentKind::Notes.is_generatable());
        assert!(ContentKind::Mcq.is_generatable());
        assert!(!ContentKind::Video.is_generatable());
        assert!(!ContentKind::Pdf.is_generatable());
    }
}
