use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{AppResult, LlmError};

/// 待识别的题目图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageData {
    pub fn new(mime: &'static str, bytes: Vec<u8>) -> Self {
        Self { mime, bytes }
    }

    /// 从本地文件加载，按扩展名判断格式
    pub async fn load(path: &Path) -> AppResult<Self> {
        let mime = mime_for(path).ok_or_else(|| LlmError::UnsupportedImage {
            path: path.to_path_buf(),
        })?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| LlmError::ImageReadFailed {
                path: PathBuf::from(path),
                source,
            })?;
        Ok(Self { mime, bytes })
    }

    /// 转成 Vision API 可用的 data URL
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
