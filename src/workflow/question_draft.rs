//! 题目编辑表单
//!
//! 一个题干 + 4 个固定选项槽位，新建和编辑共用

use std::fmt::{self, Display};

use tracing::warn;

use crate::error::ValidationError;
use crate::models::{OptionLabel, OptionSlots, ParsedQuestion, QuestionRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    pub question_text: String,
    pub slots: OptionSlots,
    /// 编辑已翻译的题目时保留其语言标记
    pub language: Option<String>,
}

impl QuestionDraft {
    /// 由解析结果预填表单，超过 4 个的选项被丢弃
    pub fn from_parsed(parsed: ParsedQuestion) -> Self {
        let (slots, dropped) = OptionSlots::from_options(&parsed.options);
        if dropped > 0 {
            warn!("⚠️ 解析到 {} 个选项，超出的 {} 个已丢弃", parsed.options.len(), dropped);
        }
        Self {
            question_text: parsed.question_text,
            slots,
            language: None,
        }
    }

    /// 由已有题目预填表单（用于编辑）
    pub fn from_record(record: &QuestionRecord) -> Self {
        let (slots, _) = OptionSlots::from_options(record.options());
        Self {
            question_text: record.question_text().to_string(),
            slots,
            language: record.language().map(str::to_string),
        }
    }

    pub fn set_question(&mut self, text: impl Into<String>) {
        self.question_text = text.into();
    }

    /// 设置选项，空文本表示清空该槽位
    pub fn set_option(&mut self, label: OptionLabel, text: &str) {
        if text.trim().is_empty() {
            self.slots.clear(label);
        } else {
            self.slots.set(label, text.trim());
        }
    }

    /// 校验并生成题目：题干不能为空，选项按槽位补齐标签前缀
    pub fn to_record(&self) -> Result<QuestionRecord, ValidationError> {
        let record = QuestionRecord::new(self.question_text.as_str(), self.slots.to_options())?;
        Ok(match &self.language {
            Some(language) => record.with_language(language.as_str()),
            None => record,
        })
    }
}

impl Display for QuestionDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let question = if self.question_text.trim().is_empty() {
            "(空)"
        } else {
            self.question_text.as_str()
        };
        writeln!(f, "题干: {}", question)?;
        for (label, text) in self.slots.iter() {
            writeln!(f, "  选项 {}: {}", label, text)?;
        }
        Ok(())
    }
}
