//! PDF 绘制 - 基础设施层
//!
//! 唯一直接接触 `lopdf` 的地方：把已经排好版的 `DocumentLayout` 画成 PDF 字节。
//! 使用 PDF 内置的 Helvetica 系列字体（WinAnsiEncoding），不嵌入字体文件，
//! 因此 WinAnsi (cp1252) 以外的字符会被替换为 `?`。

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::error::ExportError;
use crate::services::pdf_exporter::{DocumentLayout, PageLayout, PAGE_HEIGHT, PAGE_WIDTH};

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";
const FONT_ITALIC: &str = "F3";

const HEADER_SIZE: f32 = 15.0;
const FOOTER_SIZE: f32 = 8.0;
const HEADER_Y: f32 = PAGE_HEIGHT - 45.0;
const FOOTER_Y: f32 = 22.0;

/// 把排版结果绘制成 PDF 字节
pub fn render(layout: &DocumentLayout) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = add_font(&mut doc, "Helvetica");
    let bold_id = add_font(&mut doc, "Helvetica-Bold");
    let italic_id = add_font(&mut doc, "Helvetica-Oblique");
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_REGULAR => regular_id,
            FONT_BOLD => bold_id,
            FONT_ITALIC => italic_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = page_content(&layout.title, page);
        let encoded = content
            .encode()
            .map_err(|source| ExportError::RenderFailed { source })?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                PAGE_WIDTH.into(),
                PAGE_HEIGHT.into(),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::RenderFailed { source: e.into() })?;
    Ok(bytes)
}

fn add_font(doc: &mut Document, base_font: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    })
}

fn page_content(title: &str, page: &PageLayout) -> Content {
    let mut operations = Vec::new();

    push_text(
        &mut operations,
        FONT_BOLD,
        HEADER_SIZE,
        centered_x(title, HEADER_SIZE),
        HEADER_Y,
        title,
    );

    for line in &page.lines {
        let font = if line.kind.bold() { FONT_BOLD } else { FONT_REGULAR };
        push_text(
            &mut operations,
            font,
            line.kind.font_size(),
            line.kind.x(),
            line.y,
            &line.text,
        );
    }

    let footer = page.footer();
    push_text(
        &mut operations,
        FONT_ITALIC,
        FOOTER_SIZE,
        centered_x(&footer, FOOTER_SIZE),
        FOOTER_Y,
        &footer,
    );

    Content { operations }
}

fn push_text(operations: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, text: &str) {
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new("Tf", vec![font.into(), size.into()]));
    operations.push(Operation::new("Td", vec![x.into(), y.into()]));
    operations.push(Operation::new(
        "Tj",
        vec![Object::string_literal(encode_win_ansi(text))],
    ));
    operations.push(Operation::new("ET", vec![]));
}

/// Helvetica 平均字宽估算下的居中位置
fn centered_x(text: &str, size: f32) -> f32 {
    let width = text.chars().count() as f32 * size * 0.5;
    ((PAGE_WIDTH - width) / 2.0).max(0.0)
}

/// cp1252 在 0x80-0x9F 区间的字符，0x81/0x8D/0x8F/0x90/0x9D 未定义
const CP1252_HIGH: [(char, u8); 27] = [
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

/// 转成 WinAnsi 单字节编码，无法表示的字符替换为 `?`
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match u32::from(c) {
        // C1 控制字符在 WinAnsi 中对应的是其他字形
        0x80..=0x9F => b'?',
        code @ 0..=0xFF => code as u8,
        _ => CP1252_HIGH
            .iter()
            .find(|(ch, _)| *ch == c)
            .map_or(b'?', |(_, byte)| *byte),
    }
}
