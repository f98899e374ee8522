use super::lesson::{ContentKind, ContentRequest};
use serde::{Deserialize, Serialize};

/// 生成任务（来自 jobs 目录下的 TOML 文件）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationJob {
    pub name: String,
    pub subject: String,
    pub topic: String,
    pub kind: ContentKind,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

fn default_count() -> usize {
    10
}

impl GenerationJob {
    pub fn to_request(&self) -> ContentRequest {
        ContentRequest {
            subject: self.subject.clone(),
            topic: self.topic.clone(),
            kind: self.kind,
            count: self.count,
        }
    }

    /// 输出文件名：`<subject>_<topic>_<kind>.json`，非法字符替换为下划线
    pub fn output_file_name(&self) -> String {
        let raw = format!("{}_{}_{}", self.subject, self.topic, self.kind);
        format!("{}.json", sanitize_path_component(&raw))
    }
}

/// 把任意文本转换成安全的单级文件名，`/`、`.`、空格等都替换成 `_`
pub(crate) fn sanitize_path_component(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
