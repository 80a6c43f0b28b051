use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::DEFAULT_LANGUAGE;

/// 程序配置
///
/// 加载顺序：默认值 → TOML 配置文件（可选） → 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    /// PDF 默认输出目录
    pub export_dir: PathBuf,
    /// 原文语言，与之相同的语言标记导出时不显示
    pub source_language: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-1.5-flash".to_string(),
            llm_temperature: 0.2,
            llm_max_tokens: 1024,
            export_dir: PathBuf::from("exports"),
            source_language: DEFAULT_LANGUAGE.to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 只使用默认值和环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，再应用环境变量覆盖
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })?;
        config.with_env_overrides()
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let default = self;
        Ok(Self {
            llm_api_key: std::env::var("LLM_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                .unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: parse_env("LLM_TEMPERATURE", "f32")?.unwrap_or(default.llm_temperature),
            llm_max_tokens: parse_env("LLM_MAX_TOKENS", "u32")?.unwrap_or(default.llm_max_tokens),
            export_dir: std::env::var("EXPORT_DIR").map(PathBuf::from).unwrap_or(default.export_dir),
            source_language: std::env::var("SOURCE_LANGUAGE").unwrap_or(default.source_language),
            verbose_logging: parse_env("VERBOSE_LOGGING", "bool")?.unwrap_or(default.verbose_logging),
        })
    }
}

fn parse_env<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value,
            expected_type: expected_type.to_string(),
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "llm_model_name = \"gemini-2.0-flash\"\nexport_dir = \"out/pdf\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        // 环境变量可能覆盖，这里只检查未被覆盖的字段
        if std::env::var("LLM_MODEL_NAME").is_err() {
            assert_eq!(config.llm_model_name, "gemini-2.0-flash");
        }
        if std::env::var("EXPORT_DIR").is_err() {
            assert_eq!(config.export_dir, PathBuf::from("out/pdf"));
        }
        if std::env::var("LLM_MAX_TOKENS").is_err() {
            assert_eq!(config.llm_max_tokens, 1024);
        }
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "llm_max_tokens = \"many\"").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Config::load(Path::new("/nonexistent/config.toml")),
            Err(ConfigError::ReadFailed { .. })
        ));
    }

    #[test]
    fn test_parse_env_unset_is_none() {
        let value: Option<u32> = parse_env("QUESTION_MANAGER_TEST_UNSET_VAR", "u32").unwrap();
        assert_eq!(value, None);
    }
}
