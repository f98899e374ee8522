use crate::scheduler::ContentIdentity;
use serde::{Deserialize, Serialize};

/// 生成的单选题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(alias = "correctAnswer", alias = "answer")]
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl GeneratedQuestion {
    /// 校验题目是否可用
    ///
    /// 题干不能为空，至少两个选项，正确答案必须是其中之一
    pub fn is_valid(&self) -> bool {
        if self.question.trim().is_empty() || self.options.len() < 2 {
            return false;
        }
        let answer = self.correct_answer.trim();
        self.options.iter().any(|opt| opt.trim() == answer)
    }
}

/// 题干去掉首尾空白后作为去重标识
impl ContentIdentity for GeneratedQuestion {
    fn identity_key(&self) -> &str {
        self.question.trim()
    }
}

impl std::fmt::Display for GeneratedQuestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} 个选项)",
            crate::utils::logging::truncate_text(&self.question, 80),
            self.options.len()
        )
    }
}
