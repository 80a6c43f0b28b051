//! # Question Manager
//!
//! 从题目图片中提取题干和选项，整理成题目列表并导出 PDF 的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有底层能力，只暴露能力
//! - `pdf_writer` - 唯一接触 `lopdf` 的地方，把排版结果画成 PDF
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `LlmService` - 图片提取 / 文本整理 / 翻译能力（`QuestionExtractor`）
//! - `response_parser` - 把 LLM 文本解析为题干 + 选项
//! - `QuestionStore` - 有序题目列表
//! - `PdfExporter` - 题目列表 → 分页排版 → PDF 文件
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"从提取到提交的流程
//! - `ExtractionFlow` - 调用 → 解析 → 预填表单
//! - `Session` - 题目列表 + 草稿 + 编辑游标
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 交互命令解析与执行

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{OptionLabel, QuestionRecord};
pub use orchestrator::{App, Command};
pub use services::{parse_response, PdfExporter, QuestionExtractor, QuestionStore};
pub use workflow::{ExtractionFlow, QuestionDraft, Session};
