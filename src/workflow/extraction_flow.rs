//! 题目提取流程 - 流程层
//!
//! 核心职责：定义"一张图片 → 一份可编辑草稿"的完整流程
//!
//! 流程顺序：
//! 1. 调用外部能力（图片识别 / 文本整理）
//! 2. 解析响应为题干 + 选项
//! 3. 预填 4 槽位表单，交给用户编辑后再提交
//!
//! 外部调用失败时直接返回错误，错误信息不会被当作题目内容

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{AppResult, ValidationError};
use crate::models::{ImageData, ParsedQuestion, QuestionRecord};
use crate::services::{parse_response, parse_unlabeled, QuestionExtractor};
use crate::utils::logging::truncate_text;
use crate::workflow::question_draft::QuestionDraft;

/// 本地文本的解析方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// 带 `Question:` 标记的 LLM 格式
    Labeled,
    /// 无标记的原始文本
    Raw,
}

/// 题目提取流程
///
/// - 编排"调用 → 解析 → 预填表单"
/// - 不持有题目列表，提交由会话层完成
pub struct ExtractionFlow {
    extractor: Arc<dyn QuestionExtractor>,
}

impl ExtractionFlow {
    pub fn new(extractor: Arc<dyn QuestionExtractor>) -> Self {
        Self { extractor }
    }

    /// 从图片提取题目
    pub async fn extract_from_image(&self, image: &ImageData) -> AppResult<QuestionDraft> {
        info!("🔍 正在从图片中提取题目...");
        let text = self.extractor.extract_question(image).await?;
        Ok(self.draft_from_response(&text))
    }

    /// 通过 LLM 整理原始文本
    pub async fn extract_from_text(&self, raw_text: &str) -> AppResult<QuestionDraft> {
        info!("🔍 正在整理文本中的题目...");
        let text = self.extractor.structure_text(raw_text).await?;
        Ok(self.draft_from_response(&text))
    }

    /// 不调用 LLM，直接解析本地文本
    pub fn draft_from_text(text: &str, mode: ParseMode) -> QuestionDraft {
        let parsed = match mode {
            ParseMode::Labeled => parse_response(text),
            ParseMode::Raw => parse_unlabeled(text),
        };
        log_parsed(&parsed);
        QuestionDraft::from_parsed(parsed)
    }

    fn draft_from_response(&self, text: &str) -> QuestionDraft {
        Self::draft_from_text(text, ParseMode::Labeled)
    }

    /// 翻译一道题，返回带语言标记的新题目
    pub async fn translate_record(
        &self,
        record: &QuestionRecord,
        target_language: &str,
    ) -> AppResult<QuestionRecord> {
        info!("🌐 正在翻译为 {}...", target_language);
        let translated = self
            .extractor
            .translate(&record.to_labeled_text(), target_language)
            .await?;

        let parsed = parse_response(&translated);
        if parsed.question_text.is_empty() {
            warn!("⚠️ 翻译结果中没有找到题干: {}", truncate_text(&translated, 80));
            return Err(ValidationError::EmptyQuestionText.into());
        }

        Ok(QuestionRecord::new(parsed.question_text, parsed.options)?.with_language(target_language))
    }
}

fn log_parsed(parsed: &ParsedQuestion) {
    if parsed.is_empty() {
        warn!("⚠️ 响应中没有识别到题目，请手动填写");
    } else if parsed.question_text.is_empty() {
        warn!("⚠️ 未识别到题干，请手动填写");
    } else {
        info!(
            "✓ 识别到题干: {}，选项 {} 个",
            truncate_text(&parsed.question_text, 40),
            parsed.options.len()
        );
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{AppError, LlmError};
    use crate::models::OptionLabel;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 返回固定文本的假 LLM，并记录收到的请求
    pub(crate) struct MockExtractor {
        pub response: Result<String, String>,
        pub requests: Mutex<Vec<String>>,
    }

    impl MockExtractor {
        pub(crate) fn ok(response: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(response.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Err(message.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn respond(&self, request: String) -> AppResult<String> {
            self.requests.lock().unwrap().push(request);
            self.response.clone().map_err(|message| {
                AppError::llm_api_failed(
                    "mock",
                    std::io::Error::new(std::io::ErrorKind::Other, message),
                )
            })
        }
    }

    #[async_trait]
    impl QuestionExtractor for MockExtractor {
        async fn extract_question(&self, image: &ImageData) -> AppResult<String> {
            self.respond(image.mime.to_string())
        }

        async fn structure_text(&self, raw_text: &str) -> AppResult<String> {
            self.respond(raw_text.to_string())
        }

        async fn translate(&self, text: &str, target_language: &str) -> AppResult<String> {
            self.respond(format!("{}|{}", target_language, text))
        }
    }

    fn image() -> ImageData {
        ImageData::new("image/png", vec![1, 2, 3])
    }

    #[tokio::test]
    async fn test_extract_prefills_draft() {
        let mock = MockExtractor::ok("Question: What is 2+2?\n\nOptions:\nA. 3\nB. 4\nC. 5\nD. 6");
        let flow = ExtractionFlow::new(mock.clone());

        let draft = flow.extract_from_image(&image()).await.unwrap();

        assert_eq!(draft.question_text, "What is 2+2?");
        assert_eq!(draft.slots.get(OptionLabel::B), "B. 4");
        assert_eq!(mock.requests.lock().unwrap().as_slice(), ["image/png"]);
    }

    #[tokio::test]
    async fn test_extraction_failure_is_not_content() {
        let flow = ExtractionFlow::new(MockExtractor::failing("quota exceeded"));

        let result = flow.extract_from_image(&image()).await;

        assert!(matches!(
            result,
            Err(AppError::Llm(LlmError::ApiCallFailed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unparseable_response_gives_empty_draft() {
        let flow = ExtractionFlow::new(MockExtractor::ok("I cannot read this image."));

        let draft = flow.extract_from_image(&image()).await.unwrap();

        assert_eq!(draft.question_text, "");
        assert_eq!(draft.to_record(), Err(ValidationError::EmptyQuestionText));
    }

    #[tokio::test]
    async fn test_extract_from_text() {
        let mock = MockExtractor::ok("Question: Capital of France?\nA. Paris\nB. Rome");
        let flow = ExtractionFlow::new(mock.clone());

        let draft = flow.extract_from_text("capital of france paris rome").await.unwrap();

        assert_eq!(draft.question_text, "Capital of France?");
        assert_eq!(draft.slots.to_options(), vec!["A. Paris", "B. Rome"]);
        assert_eq!(
            mock.requests.lock().unwrap().as_slice(),
            ["capital of france paris rome"]
        );
    }

    #[test]
    fn test_draft_from_text_modes() {
        let text = "Which is even?\nA. 1\nB. 2";

        let labeled = ExtractionFlow::draft_from_text(text, ParseMode::Labeled);
        assert_eq!(labeled.question_text, "");

        let raw = ExtractionFlow::draft_from_text(text, ParseMode::Raw);
        assert_eq!(raw.question_text, "Which is even?");
        assert_eq!(raw.slots.get(OptionLabel::B), "B. 2");
    }

    #[tokio::test]
    async fn test_translate_record_sets_language() {
        let mock = MockExtractor::ok("Question: Combien font 2+2 ?\n\nOptions:\nA. 3\nB. 4");
        let flow = ExtractionFlow::new(mock.clone());
        let record = QuestionRecord::new("What is 2+2?", vec!["A. 3".into(), "B. 4".into()]).unwrap();

        let translated = flow.translate_record(&record, "French").await.unwrap();

        assert_eq!(translated.question_text(), "Combien font 2+2 ?");
        assert_eq!(translated.options(), ["A. 3", "B. 4"]);
        assert_eq!(translated.language(), Some("French"));
        assert_eq!(
            mock.requests.lock().unwrap().as_slice(),
            ["French|Question: What is 2+2?\n\nOptions:\nA. 3\nB. 4"]
        );
    }

    #[tokio::test]
    async fn test_translate_without_question_is_rejected() {
        let flow = ExtractionFlow::new(MockExtractor::ok("Désolé, je ne peux pas."));
        let record = QuestionRecord::new("Q", vec![]).unwrap();

        let result = flow.translate_record(&record, "French").await;

        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::EmptyQuestionText))
        ));
    }
}
