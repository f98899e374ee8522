//! LLM 服务 - 业务能力层
//!
//! 只负责"调用一次生成 API"能力，不关心密钥轮转和并发
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 每个 `LlmService` 绑定一个密钥，由 `LlmClientFactory` 按需构造
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, warn};

use crate::config::Config;
use crate::scheduler::{ClientFactory, Credential};

/// 一次生成调用的请求
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// 覆盖客户端默认模型
    pub model: Option<String>,
    pub system_message: Option<String>,
    pub user_message: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            model: None,
            system_message: None,
            user_message: user_message.into(),
            temperature: 0.7,
            max_tokens: 4096,
        }
    }

    pub fn with_system(mut self, system_message: impl Into<String>) -> Self {
        self.system_message = Some(system_message.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// 外部生成能力
///
/// 调度层把它当作不透明的依赖，测试中可以替换为假实现
pub trait CompletionClient: Send + Sync + 'static {
    fn complete<'a>(&'a self, request: &'a CompletionRequest) -> BoxFuture<'a, Result<String>>;
}

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 完成一次生成
/// - 不知道密钥池的存在
/// - 不做重试
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmService {
    /// 创建绑定到指定密钥的 LLM 服务
    pub fn new(api_base_url: &str, model_name: &str, key: &Credential) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(key.expose())
            .with_api_base(api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: model_name.to_string(),
        }
    }

    /// 创建不带密钥的 LLM 服务（兜底端点）
    pub fn without_key(api_base_url: &str, model_name: &str) -> Self {
        let openai_config = OpenAIConfig::new().with_api_base(api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: model_name.to_string(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    ///
    /// # 示例
    /// ```no_run
    /// # use lesson_content_gen::services::LlmService;
    /// # async fn example(service: &LlmService) -> anyhow::Result<()> {
    /// let response = service.send_to_llm("用一句话介绍光合作用", None).await?;
    /// println!("LLM 响应: {}", response);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn send_to_llm(&self, user_message: &str, system_message: Option<&str>) -> Result<String> {
        let mut request = CompletionRequest::new(user_message);
        request.system_message = system_message.map(str::to_string);
        self.send_request(&request).await
    }

    /// 按完整请求调用 LLM
    pub async fn send_request(&self, request: &CompletionRequest) -> Result<String> {
        let model = request.model.as_deref().unwrap_or(&self.model_name);
        debug!("调用 LLM API，模型: {}", model);
        debug!("用户消息长度: {} 字符", request.user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = &request.system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg.as_str())
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.user_message.as_str())
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .build()?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }
}

impl CompletionClient for LlmService {
    fn complete<'a>(&'a self, request: &'a CompletionRequest) -> BoxFuture<'a, Result<String>> {
        self.send_request(request).boxed()
    }
}

/// 为调度层构造 `LlmService`
#[derive(Debug, Clone)]
pub struct LlmClientFactory {
    api_base_url: String,
    model_name: String,
    fallback_api_base_url: Option<String>,
}

impl LlmClientFactory {
    pub fn new(config: &Config) -> Self {
        Self {
            api_base_url: config.llm_api_base_url.clone(),
            model_name: config.llm_model_name.clone(),
            fallback_api_base_url: config.fallback_api_base_url.clone(),
        }
    }
}

impl ClientFactory for LlmClientFactory {
    type Client = LlmService;

    fn connect(&self, key: &Credential) -> LlmService {
        LlmService::new(&self.api_base_url, &self.model_name, key)
    }

    fn fallback(&self) -> Option<LlmService> {
        self.fallback_api_base_url
            .as_deref()
            .map(|url| LlmService::without_key(url, &self.model_name))
    }
}
