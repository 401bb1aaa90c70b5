use crate::error::{AppError, AppResult};
use serde::Deserialize;
use std::path::Path;

/// 默认配置文件
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 同时进行的 API 调用数量
    pub max_workers: usize,
    /// 输入表格路径
    pub input_path: String,
    /// 读写的工作表名称
    pub sheet_name: String,
    /// 输出目录
    pub output_dir: String,
    /// 输出文件名前缀
    pub output_prefix: String,
    /// 日志目录
    pub log_dir: String,
    /// 单次调用超时（秒），0 表示不限制
    pub request_timeout_secs: u64,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub system_prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_workers: 16,
            input_path: "input.xlsx".to_string(),
            sheet_name: "Sheet1".to_string(),
            output_dir: ".".to_string(),
            output_prefix: "output".to_string(),
            log_dir: "logs".to_string(),
            request_timeout_secs: 0,
            llm_api_key: String::new(),
            llm_api_base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string(),
            llm_model_name: "qwen-plus".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：默认值 → 配置文件（`BATCH_CONFIG` 或 `config.toml`，可选）→ 环境变量
    pub fn load() -> AppResult<Self> {
        let path = std::env::var("BATCH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        let config = config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取，缺省字段使用默认值
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("读取 {} 失败: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
            .map_err(|e| AppError::Config(format!("解析 {} 失败: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖已有配置
    pub fn apply_env(self) -> Self {
        Self {
            max_workers: std::env::var("MAX_WORKERS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.max_workers),
            input_path: std::env::var("INPUT_PATH").unwrap_or(self.input_path),
            sheet_name: std::env::var("SHEET_NAME").unwrap_or(self.sheet_name),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(self.output_dir),
            output_prefix: std::env::var("OUTPUT_PREFIX").unwrap_or(self.output_prefix),
            log_dir: std::env::var("LOG_DIR").unwrap_or(self.log_dir),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.request_timeout_secs),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            system_prompt: std::env::var("SYSTEM_PROMPT").unwrap_or(self.system_prompt),
        }
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> AppResult<()> {
        if self.max_workers == 0 {
            return Err(AppError::Config("max_workers 必须大于 0".to_string()));
        }
        if self.input_path.trim().is_empty() {
            return Err(AppError::Config("input_path 不能为空".to_string()));
        }
        Ok(())
    }

    /// 超时设置，`None` 表示不限制
    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        (self.request_timeout_secs > 0).then(|| std::time::Duration::from_secs(self.request_timeout_secs))
    }
}
