use thiserror::Error;

/// 单次尝试失败的记录
///
/// `key` 只保存脱敏后的后缀，不会泄露完整密钥
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub key: String,
    pub reason: String,
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "密钥 {} 失败: {}", self.key, self.reason)
    }
}

/// 生成调度错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 密钥池为空，且没有可用的兜底客户端
    #[error("没有可用的 API 密钥")]
    NoCredentials,

    /// 所有密钥都尝试过且全部失败
    #[error("所有 {} 个 API 密钥均已失败", .attempts.len())]
    ExhaustedKeys { attempts: Vec<AttemptFailure> },
}

impl GenerationError {
    /// 按密钥池顺序返回每次尝试的失败记录
    pub fn attempts(&self) -> &[AttemptFailure] {
        match self {
            GenerationError::ExhaustedKeys { attempts } => attempts,
            GenerationError::NoCredentials => &[],
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParse {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 调度层结果类型
pub type GenerationResult<T> = Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_keys_message_counts_attempts() {
        let err = GenerationError::ExhaustedKeys {
            attempts: vec![
                AttemptFailure {
                    key: "…aaaa".to_string(),
                    reason: "quota".to_string(),
                },
                AttemptFailure {
                    key: "…bbbb".to_string(),
                    reason: "invalid".to_string(),
                },
            ],
        };

        assert_eq!(err.to_string(), "所有 2 个 API 密钥均已失败");
        assert_eq!(err.attempts().len(), 2);
        assert_eq!(err.attempts()[1].to_string(), "密钥 …bbbb 失败: invalid");
    }

    #[test]
    fn test_no_credentials_has_no_attempts() {
        assert!(GenerationError::NoCredentials.attempts().is_empty());
    }
}
