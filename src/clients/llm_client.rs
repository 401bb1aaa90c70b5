//! LLM API 客户端
//!
//! 使用 `async-openai` 调用兼容 OpenAI 的聊天补全接口（通义千问、DeepSeek 等）。

use crate::config::Config;
use crate::error::ProcessError;
use crate::services::RemoteProcessor;
use crate::utils::logging::truncate_text;
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, info, warn};

/// LLM 客户端
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    system_prompt: String,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            system_prompt: config.system_prompt.clone(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 发送一次聊天请求，返回去掉首尾空白的回复
    pub async fn chat(&self, user_message: &str) -> Result<String, ProcessError> {
        let messages = self.build_messages(user_message).map_err(request_failed)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .build()
            .map_err(request_failed)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("❌ LLM API 调用失败: {}", e);
            request_failed(e)
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .ok_or(ProcessError::EmptyResponse)?;

        Ok(content.to_string())
    }

    fn build_messages(&self, user_message: &str) -> Result<Vec<ChatCompletionRequestMessage>, OpenAIError> {
        let mut messages = Vec::with_capacity(2);

        if !self.system_prompt.is_empty() {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.as_str())
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        Ok(messages)
    }
}

#[async_trait]
impl RemoteProcessor for LlmClient {
    async fn process(&self, input: &str) -> Result<String, ProcessError> {
        let start = Instant::now();
        info!("开始处理输入文本: {}", truncate_text(input, 50));
        debug!("调用 LLM API，模型: {}", self.model_name);

        let output = self.chat(input).await?;

        info!(
            "✅ 处理完成，耗时: {:?}, 输出长度: {}字符",
            start.elapsed(),
            output.chars().count()
        );
        Ok(output)
    }
}

fn request_failed(err: OpenAIError) -> ProcessError {
    ProcessError::RequestFailed(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_client() -> LlmClient {
        let config = Config {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or_default(),
            ..Config::default()
        };
        LlmClient::new(&config)
    }

    #[test]
    fn test_messages_include_system_prompt() {
        let client = create_test_client();
        let messages = client.build_messages("你好").unwrap();

        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn test_empty_system_prompt_is_omitted() {
        let config = Config {
            system_prompt: String::new(),
            ..Config::default()
        };
        let client = LlmClient::new(&config);

        let messages = client.build_messages("你好").unwrap();
        assert_eq!(messages.len(), 1);
    }

    /// 需要可用的 LLM_API_KEY：cargo test test_live_chat -- --ignored --nocapture
    #[tokio::test]
    #[ignore]
    async fn test_live_chat() {
        let client = create_test_client();
        let output = client.process("用一句话介绍你自己").await.unwrap();
        println!("LLM 响应: {}", output);
        assert!(!output.is_empty());
    }
}
