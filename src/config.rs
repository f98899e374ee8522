use crate::error::ConfigError;
use crate::scheduler::KeyConfig;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API 密钥列表（按优先级排列，第一个为主密钥）
    pub api_keys: Vec<String>,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 无密钥时使用的兜底端点（例如本地部署的兼容服务）
    pub fallback_api_base_url: Option<String>,
    /// 批量生成时同时运行的 worker 数量
    pub max_concurrent_workers: usize,
    /// 单次生成调用请求的题目数量
    pub questions_per_batch: usize,
    /// 生成任务 TOML 文件目录
    pub jobs_folder: String,
    /// 生成结果输出目录
    pub output_folder: String,
    /// 已有课程内容的存放目录
    pub content_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            fallback_api_base_url: None,
            max_concurrent_workers: 4,
            questions_per_batch: crate::scheduler::DEFAULT_BATCH_SIZE,
            jobs_folder: "jobs".to_string(),
            output_folder: "output".to_string(),
            content_folder: "content".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_keys: std::env::var("LLM_API_KEYS")
                .map(|v| split_keys(&v))
                .unwrap_or(default.api_keys),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            fallback_api_base_url: std::env::var("FALLBACK_API_BASE_URL")
                .ok()
                .or(default.fallback_api_base_url),
            max_concurrent_workers: env_or("MAX_CONCURRENT_WORKERS", default.max_concurrent_workers),
            questions_per_batch: env_or("QUESTIONS_PER_BATCH", default.questions_per_batch),
            jobs_folder: std::env::var("JOBS_FOLDER").unwrap_or(default.jobs_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            content_folder: std::env::var("CONTENT_FOLDER").unwrap_or(default.content_folder),
            verbose_logging: env_or("VERBOSE_LOGGING", default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.display().to_string(),
            source,
        })
    }

    /// 密钥池所需的配置片段
    pub fn key_config(&self) -> KeyConfig {
        KeyConfig {
            api_keys: self.api_keys.clone(),
        }
    }
}

/// 逗号或换行分隔的密钥列表，空白交给 KeyPool 处理
fn split_keys(raw: &str) -> Vec<String> {
    raw.split([',', '\n']).map(str::to_string).collect()
}

fn parse_env_var<T: FromStr>(var_name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::EnvVarParse {
        var_name: var_name.to_string(),
        value: value.to_string(),
        expected_type: std::any::type_name::<T>().to_string(),
    })
}

fn env_or<T: FromStr>(var_name: &str, default: T) -> T {
    match std::env::var(var_name) {
        Ok(value) => parse_env_var(var_name, &value).unwrap_or_else(|e| {
            warn!("⚠️ {}，使用默认值", e);
            default
        }),
        Err(_) => default,
    }
}
