//! PDF 导出服务 - 业务能力层
//!
//! 负责把有序题目列表映射为分页排版（`DocumentLayout`），
//! 再交给基础设施层的 `pdf_writer` 绘制并写盘。
//!
//! 排版规则：
//! - 每题一个块：`[Language: xx]`、`N. 题干`、每个选项一行
//! - 每页固定页眉 `Question Paper`、页脚 `Page N`
//! - 累计高度超过可用区域时自动分页；能放进一整页的题目块不会被拆开

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{AppError, AppResult, ExportError};
use crate::infrastructure::pdf_writer;
use crate::models::{QuestionRecord, DEFAULT_LANGUAGE};

/// A4 尺寸（pt）
pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
/// 左右边距
pub const MARGIN_X: f32 = 40.0;
/// 正文起始 y（页眉之下）
pub const BODY_TOP: f32 = PAGE_HEIGHT - 85.0;
/// 正文最低 y（自动分页边距 15mm）
pub const BODY_BOTTOM: f32 = 42.5;
/// 选项缩进
pub const OPTION_INDENT: f32 = 12.0;

const QUESTION_GAP: f32 = 6.0;
const RECORD_GAP: f32 = 14.0;
/// Helvetica 平均字宽约为字号的一半
const AVG_CHAR_WIDTH: f32 = 0.5;

pub const DOCUMENT_TITLE: &str = "Question Paper";

/// 行类型，决定字体、字号和缩进
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Language,
    Question,
    Option,
}

impl LineKind {
    pub fn font_size(self) -> f32 {
        match self {
            LineKind::Language => 10.0,
            LineKind::Question | LineKind::Option => 12.0,
        }
    }

    pub fn line_height(self) -> f32 {
        self.font_size() * 1.5
    }

    pub fn bold(self) -> bool {
        matches!(self, LineKind::Language | LineKind::Question)
    }

    pub fn x(self) -> f32 {
        match self {
            LineKind::Option => MARGIN_X + OPTION_INDENT,
            _ => MARGIN_X,
        }
    }

    fn wrap_columns(self) -> usize {
        let width = PAGE_WIDTH - MARGIN_X - self.x();
        (width / (self.font_size() * AVG_CHAR_WIDTH)) as usize
    }
}

/// 已定位的一行文字（y 为基线位置）
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutLine {
    pub kind: LineKind,
    pub text: String,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// 页码（从1开始）
    pub number: usize,
    pub lines: Vec<LayoutLine>,
}

impl PageLayout {
    pub fn footer(&self) -> String {
        format!("Page {}", self.number)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    /// 按阅读顺序遍历所有行
    pub fn lines(&self) -> impl Iterator<Item = &LayoutLine> {
        self.pages.iter().flat_map(|p| p.lines.iter())
    }
}

/// 一个题目块中尚未定位的行
struct BlockLine {
    kind: LineKind,
    text: String,
    gap_after: f32,
}

/// PDF 导出服务
pub struct PdfExporter {
    source_language: String,
}

impl PdfExporter {
    pub fn new(source_language: impl Into<String>) -> Self {
        Self {
            source_language: source_language.into(),
        }
    }

    /// 计算分页排版
    pub fn layout(&self, records: &[QuestionRecord]) -> DocumentLayout {
        let mut pages = vec![PageLayout {
            number: 1,
            lines: Vec::new(),
        }];
        let mut y = BODY_TOP;

        for (i, record) in records.iter().enumerate() {
            let block = self.build_block(i + 1, record);
            let block_height: f32 = block.iter().map(|l| l.kind.line_height() + l.gap_after).sum();

            // 整块放得下一页但当前页剩余空间不够时，整块换页
            let page_is_fresh = y == BODY_TOP;
            if !page_is_fresh && y - block_height < BODY_BOTTOM && block_height <= BODY_TOP - BODY_BOTTOM {
                new_page(&mut pages, &mut y);
            }

            for line in block {
                let height = line.kind.line_height();
                if y - height < BODY_BOTTOM && y != BODY_TOP {
                    new_page(&mut pages, &mut y);
                }
                y -= height;
                if let Some(page) = pages.last_mut() {
                    page.lines.push(LayoutLine {
                        kind: line.kind,
                        text: line.text,
                        y,
                    });
                }
                y -= line.gap_after;
            }
        }

        debug!("排版完成: {} 道题, {} 页", records.len(), pages.len());

        DocumentLayout {
            title: DOCUMENT_TITLE.to_string(),
            pages,
        }
    }

    fn build_block(&self, number: usize, record: &QuestionRecord) -> Vec<BlockLine> {
        let mut block = Vec::new();

        if let Some(language) = record.language_annotation(&self.source_language) {
            push_wrapped(&mut block, LineKind::Language, &format!("Language: {}", language));
        }

        push_wrapped(
            &mut block,
            LineKind::Question,
            &format!("{}. {}", number, record.question_text()),
        );
        if let Some(last) = block.last_mut() {
            last.gap_after = QUESTION_GAP;
        }

        for option in record.options() {
            push_wrapped(&mut block, LineKind::Option, option);
        }

        if let Some(last) = block.last_mut() {
            last.gap_after = RECORD_GAP;
        }
        block
    }

    /// 导出题目列表到 PDF 文件
    ///
    /// # 参数
    /// - `records`: 按顺序排列的题目
    /// - `path`: 输出路径，父目录不存在时自动创建
    ///
    /// # 返回
    /// 返回写入的文件路径
    pub async fn export(&self, records: &[QuestionRecord], path: &Path) -> AppResult<PathBuf> {
        if records.is_empty() {
            return Err(ExportError::EmptyList.into());
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|source| {
                ExportError::CreateDirFailed {
                    path: parent.to_path_buf(),
                    source,
                }
            })?;
        }

        let layout = self.layout(records);
        let bytes = pdf_writer::render(&layout)?;

        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| AppError::export_write_failed(path, e))?;

        info!(
            "✓ 已导出 {} 道题到 {} ({} 页, {} 字节)",
            records.len(),
            path.display(),
            layout.pages.len(),
            bytes.len()
        );

        Ok(path.to_path_buf())
    }
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

fn new_page(pages: &mut Vec<PageLayout>, y: &mut f32) {
    let number = pages.len() + 1;
    pages.push(PageLayout {
        number,
        lines: Vec::new(),
    });
    *y = BODY_TOP;
}

fn push_wrapped(block: &mut Vec<BlockLine>, kind: LineKind, text: &str) {
    for piece in wrap_text(text, kind.wrap_columns()) {
        block.push(BlockLine {
            kind,
            text: piece,
            gap_after: 0.0,
        });
    }
}

/// 按字符数折行：优先在空格处断开，超长单词（或无空格的文字）按列宽截断
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    let mut current: Vec<char> = Vec::new();

    for word in text.split_whitespace() {
        let word: Vec<char> = word.chars().collect();

        if !current.is_empty() && current.len() + 1 + word.len() <= columns {
            current.push(' ');
            current.extend(word);
            continue;
        }
        if !current.is_empty() {
            lines.push(current.drain(..).collect());
        }

        let mut chunks = word.chunks(columns).peekable();
        while let Some(chunk) = chunks.next() {
            if chunks.peek().is_some() {
                lines.push(chunk.iter().collect());
            } else {
                current.extend_from_slice(chunk);
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current.into_iter().collect());
    }
    lines
}
