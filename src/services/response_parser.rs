//! LLM 响应解析 - 业务能力层
//!
//! 只负责把一段自由文本解析成题干 + 选项，不关心文本从哪里来

use crate::models::ParsedQuestion;

/// 题干标记（不区分大小写）
const QUESTION_MARKER: &str = "question:";

/// 解析带 `Question:` 标记的 LLM 响应
///
/// 逐行处理：
/// - 以 `Question:` 开头的行，其余部分作为题干；重复出现时以最后一行为准
/// - 首字符为 A-D（不区分大小写）且第二个字符为 `.` 或 `)` 的行，原样作为选项
/// - 其他行（包括 `Options:`）忽略
///
/// 找不到题干行时返回空题干，而不是错误
pub fn parse_response(text: &str) -> ParsedQuestion {
    let mut parsed = ParsedQuestion::default();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(rest) = strip_question_marker(line) {
            parsed.question_text = rest.trim().to_string();
        } else if is_option_line(line) {
            parsed.options.push(line.to_string());
        }
    }

    parsed
}

/// 解析没有 `Question:` 标记的原始文本（如 OCR 结果）
///
/// 第一个选项行之前的所有非空行用空格拼接成题干，选项规则与 [`parse_response`] 相同
pub fn parse_unlabeled(text: &str) -> ParsedQuestion {
    let mut parsed = ParsedQuestion::default();
    let mut stem_lines: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_option_line(line) {
            parsed.options.push(line.to_string());
        } else if parsed.options.is_empty() {
            stem_lines.push(line);
        }
    }

    parsed.question_text = stem_lines.join(" ");
    parsed
}

fn strip_question_marker(line: &str) -> Option<&str> {
    let head = line.get(..QUESTION_MARKER.len())?;
    if head.eq_ignore_ascii_case(QUESTION_MARKER) {
        Some(&line[QUESTION_MARKER.len()..])
    } else {
        None
    }
}

fn is_option_line(line: &str) -> bool {
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(label), Some(sep)) => {
            matches!(label.to_ascii_uppercase(), 'A'..='D') && matches!(sep, '.' | ')')
        }
        _ => false,
    }
}
