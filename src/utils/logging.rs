//! 日志与显示工具
//!
//! 提供日志格式化和输出的辅助函数

use tracing::info;

use crate::config::Config;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 智能题目管理");
    info!("🤖 模型: {}", config.llm_model_name);
    info!("📁 导出目录: {}", config.export_dir.display());
    info!("{}", "=".repeat(60));
}

/// 生成默认的导出文件名，如 `questions_20250101_120000.pdf`
pub fn default_export_filename() -> String {
    format!("questions_{}.pdf", chrono::Local::now().format("%Y%m%d_%H%M%S"))
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
