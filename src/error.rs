use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 用户输入校验错误（可恢复，只阻止本次提交）
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 读取输入文件失败
    #[error("读取文件失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 构建请求失败
    #[error("构建LLM请求失败: {source}")]
    RequestBuildFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 读取图片失败
    #[error("读取图片失败 ({}): {source}", path.display())]
    ImageReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// 不支持的图片格式
    #[error("不支持的图片格式: {}", path.display())]
    UnsupportedImage { path: PathBuf },
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 题目列表为空
    #[error("没有可导出的题目")]
    EmptyList,
    /// 创建目录失败
    #[error("创建目录失败 ({}): {source}", path.display())]
    CreateDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// PDF 内容编码失败
    #[error("PDF内容编码失败: {source}")]
    RenderFailed { source: lopdf::Error },
    /// 写入文件失败
    #[error("写入文件失败 ({}): {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// 用户输入校验错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// 题干为空
    #[error("题干不能为空")]
    EmptyQuestionText,
    /// 题号超出范围（1-based）
    #[error("题号 {number} 超出范围 [1, {len}]")]
    NumberOutOfRange { number: usize, len: usize },
    /// 选项标签无效
    #[error("无效的选项标签: {0}（应为 A-D）")]
    InvalidOptionLabel(String),
    /// 正在编辑其他题目
    #[error("正在编辑第 {number} 题，请先保存或取消")]
    EditInProgress { number: usize },
    /// 当前没有编辑中的题目
    #[error("当前没有正在编辑的题目")]
    NoActiveEdit,
    /// 当前没有草稿
    #[error("当前没有待提交的题目，请先提取或载入")]
    NoDraft,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({}): {source}", path.display())]
    ParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建LLM请求构建错误
    pub fn llm_request_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Llm(LlmError::RequestBuildFailed {
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn export_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Export(ExportError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 是否为用户可直接修正的输入错误
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
