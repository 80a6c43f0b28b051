//! LLM 服务 - 业务能力层
//!
//! 只负责"从图片/文本中提取题目"和"翻译题目"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Gemini, Azure, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};
use crate::models::ImageData;

/// 图片提取提示词，输出格式与 `response_parser::parse_response` 对应
const EXTRACT_PROMPT: &str = "Extract the question and answer options from this image.
Format the output as follows:

Question: [The question text]

Options:
A. [Option A]
B. [Option B]
C. [Option C]
D. [Option D]

If there are no options, just return the question.";

const STRUCTURE_SYSTEM_PROMPT: &str =
    "You are a question extraction expert. You turn raw text extracted from an image into a structured question.";

/// 外部 AI 能力边界
///
/// 所有方法失败时都返回错误，而不是把错误信息当作内容返回
#[async_trait]
pub trait QuestionExtractor: Send + Sync {
    /// 从图片中提取题目文本
    async fn extract_question(&self, image: &ImageData) -> AppResult<String>;

    /// 把 OCR 等原始文本整理成 `Question:` / `Options:` 格式
    async fn structure_text(&self, raw_text: &str) -> AppResult<String>;

    /// 翻译文本，保留行结构、题号和选项标记
    async fn translate(&self, text: &str, target_language: &str) -> AppResult<String>;
}

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 提取、整理、翻译题目
/// - 只处理单个题目
/// - 不解析返回内容，不接触题目列表
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        if config.llm_api_key.is_empty() {
            warn!("⚠️ 未配置 LLM_API_KEY，调用 LLM 时将会失败");
        }

        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
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
    /// - `imgs`: 图片 URL（可为 data URL）列表，会追加到用户消息中
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去除首尾空白）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        imgs: &[String],
    ) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符, 图片: {} 张", user_message.len(), imgs.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(AppError::llm_request_failed)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = if imgs.is_empty() {
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()
                .map_err(AppError::llm_request_failed)?
        } else {
            // Vision API：文本 + 图片
            let mut content_parts = vec![ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: user_message.to_string(),
                },
            )];
            for url in imgs {
                content_parts.push(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                    ChatCompletionRequestMessageContentPartImage {
                        image_url: ImageUrl {
                            url: url.clone(),
                            detail: Some(ImageDetail::Auto),
                        },
                    },
                ));
            }

            ChatCompletionRequestUserMessageArgs::default()
                .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
                .build()
                .map_err(AppError::llm_request_failed)?
        };
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(AppError::llm_request_failed)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl QuestionExtractor for LlmService {
    async fn extract_question(&self, image: &ImageData) -> AppResult<String> {
        debug!("提取图片题目: {} ({} 字节)", image.mime, image.bytes.len());
        self.send_to_llm(EXTRACT_PROMPT, None, &[image.to_data_url()])
            .await
    }

    async fn structure_text(&self, raw_text: &str) -> AppResult<String> {
        self.send_to_llm(
            &build_structure_prompt(raw_text),
            Some(STRUCTURE_SYSTEM_PROMPT),
            &[],
        )
        .await
    }

    async fn translate(&self, text: &str, target_language: &str) -> AppResult<String> {
        self.send_to_llm(&build_translate_prompt(text, target_language), None, &[])
            .await
    }
}

fn build_structure_prompt(raw_text: &str) -> String {
    format!(
        r#"Given the following raw text extracted from an image, extract the question and its options in a structured format.

Raw text:
{}

Please format the output as follows:

Question: [The question text]

Options:
A. [Option A]
B. [Option B]
C. [Option C]
D. [Option D]

If there are no options, just return the question.
If the question or options are unclear, make your best guess."#,
        raw_text
    )
}

fn build_translate_prompt(text: &str, target_language: &str) -> String {
    format!(
        r#"Translate the following text to {}:

{}

Preserve the exact format including the "Question:" label, any question numbers, options (A, B, C, D), and other formatting elements. Return only the translation."#,
        target_language, text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> LlmService {
        LlmService::new(&Config::from_env().unwrap_or_default())
    }

    #[test]
    fn test_prompts_keep_parser_markers() {
        assert!(EXTRACT_PROMPT.contains("Question:"));
        assert!(EXTRACT_PROMPT.contains("A. [Option A]"));

        let structure = build_structure_prompt("what is 1+1 a 1 b 2");
        assert!(structure.contains("what is 1+1 a 1 b 2"));
        assert!(structure.contains("Question: [The question text]"));
    }

    #[test]
    fn test_translate_prompt() {
        let prompt = build_translate_prompt("Question: Hi?\nA. yes", "French");
        assert!(prompt.starts_with("Translate the following text to French:"));
        assert!(prompt.contains("Question: Hi?\nA. yes"));
    }

    #[test]
    fn test_new_uses_config_model() {
        let config = Config {
            llm_model_name: "test-model".to_string(),
            ..Config::default()
        };
        assert_eq!(LlmService::new(&config).model_name(), "test-model");
    }

    /// 测试通用 LLM 调用
    ///
    /// 运行方式：
    /// ```bash
    /// cargo test test_send_to_llm_simple -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_send_to_llm_simple() {
        let _ = tracing_subscriber::fmt::try_init();

        let service = create_test_service();
        let response = service
            .structure_text("Which is a prime number? A 4 B 6 C 7 D 9")
            .await
            .expect("LLM 调用失败");

        println!("LLM 响应:\n{}", response);
        assert!(response.to_lowercase().contains("question:"));
    }
}
