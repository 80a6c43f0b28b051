//! 题目数据结构
//!
//! - `QuestionRecord`：已提交到列表中的题目
//! - `ParsedQuestion`：从 LLM 文本解析出的原始结果
//! - `OptionSlots`：固定 4 个选项槽位的编辑表单

use std::fmt;

use crate::error::ValidationError;

/// 默认语言标记，表示"原文语言"，导出时不加注释行
pub const DEFAULT_LANGUAGE: &str = "English";

/// 选项槽位数量
pub const MAX_OPTIONS: usize = 4;

/// 选项标签 A-D
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; MAX_OPTIONS] =
        [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_char(self) -> char {
        (b'A' + self as u8) as char
    }

    /// 不区分大小写
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(OptionLabel::A),
            'B' => Some(OptionLabel::B),
            'C' => Some(OptionLabel::C),
            'D' => Some(OptionLabel::D),
            _ => None,
        }
    }

    /// 解析用户输入的标签，如 "b"、"C"
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let mut chars = input.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Self::from_char(c).ok_or_else(|| ValidationError::InvalidOptionLabel(input.to_string()))
            }
            _ => Err(ValidationError::InvalidOptionLabel(input.to_string())),
        }
    }

    /// 文本是否已带有本标签前缀（`B.` 或 `B)`）
    pub fn is_prefix_of(self, text: &str) -> bool {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), Some(sep)) => {
                Self::from_char(c) == Some(self) && matches!(sep, '.' | ')')
            }
            _ => false,
        }
    }

    /// 文本开头的 A-D 标签（`C.` / `c)` 等）
    pub fn leading(text: &str) -> Option<Self> {
        OptionLabel::ALL
            .into_iter()
            .find(|label| label.is_prefix_of(text.trim()))
    }

    /// 为选项文本加上标签前缀，已有前缀时原样返回
    pub fn prefix(self, text: &str) -> String {
        let text = text.trim();
        if self.is_prefix_of(text) {
            text.to_string()
        } else {
            format!("{}. {}", self.as_char(), text)
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// LLM 响应解析结果
///
/// 题干可能为空，由调用方决定是否接受
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuestion {
    pub question_text: String,
    pub options: Vec<String>,
}

impl ParsedQuestion {
    pub fn is_empty(&self) -> bool {
        self.question_text.is_empty() && self.options.is_empty()
    }
}

/// 已提交的题目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    question_text: String,
    options: Vec<String>,
    language: Option<String>,
}

impl QuestionRecord {
    /// 创建题目，题干去除首尾空白后不能为空
    pub fn new(
        question_text: impl Into<String>,
        options: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let question_text = question_text.into().trim().to_string();
        if question_text.is_empty() {
            return Err(ValidationError::EmptyQuestionText);
        }

        let options = options
            .into_iter()
            .filter(|o| !o.trim().is_empty())
            .take(MAX_OPTIONS)
            .enumerate()
            .map(|(i, o)| match OptionLabel::from_index(i) {
                Some(label) if OptionLabel::leading(&o).is_none() => label.prefix(&o),
                _ => o.trim().to_string(),
            })
            .collect();

        Ok(Self {
            question_text,
            options,
            language: None,
        })
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// 导出时需要额外标注的语言；与原文语言相同则返回 None
    pub fn language_annotation(&self, source_language: &str) -> Option<&str> {
        self.language
            .as_deref()
            .filter(|lang| !lang.eq_ignore_ascii_case(source_language))
    }

    /// 还原为 `Question:` / 选项格式的文本，供翻译使用
    pub fn to_labeled_text(&self) -> String {
        let mut text = format!("Question: {}", self.question_text);
        if !self.options.is_empty() {
            text.push_str("\n\nOptions:");
            for option in &self.options {
                text.push('\n');
                text.push_str(option);
            }
        }
        text
    }
}

/// 固定 4 个槽位的选项表单
///
/// 超过 4 个的选项在构建时被丢弃
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSlots {
    slots: [String; MAX_OPTIONS],
}

impl OptionSlots {
    /// 填入槽位，返回表单和被丢弃的选项数
    ///
    /// 带标签的选项优先放入同名槽位，该槽位已占用或没有标签时放入第一个空槽位
    pub fn from_options<S: AsRef<str>>(options: &[S]) -> (Self, usize) {
        let mut slots = Self::default();
        let mut dropped = 0;
        for option in options {
            let option = option.as_ref().trim();
            let target = OptionLabel::leading(option)
                .map(OptionLabel::index)
                .filter(|&i| slots.slots[i].is_empty())
                .or_else(|| slots.slots.iter().position(String::is_empty));
            match target {
                Some(i) => slots.slots[i] = option.to_string(),
                None => dropped += 1,
            }
        }
        (slots, dropped)
    }

    pub fn get(&self, label: OptionLabel) -> &str {
        &self.slots[label.index()]
    }

    pub fn set(&mut self, label: OptionLabel, text: impl Into<String>) {
        self.slots[label.index()] = text.into();
    }

    pub fn clear(&mut self, label: OptionLabel) {
        self.slots[label.index()].clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionLabel, &str)> {
        OptionLabel::ALL
            .into_iter()
            .zip(self.slots.iter().map(String::as_str))
    }

    /// 收集非空槽位；已带 A-D 标签的原样保留，其余按槽位标签补齐前缀
    pub fn to_options(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(label, text)| match OptionLabel::leading(text) {
                Some(_) => text.trim().to_string(),
                None => label.prefix(text),
            })
            .collect()
    }
}
