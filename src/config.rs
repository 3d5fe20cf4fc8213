use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult, BatchError, ConfigError};
use crate::models::BatchSettings;

/// 浏览器使用方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserMode {
    /// 启动一个新的无头浏览器
    Launch,
    /// 连接到已经开启调试端口的浏览器
    Connect,
}

impl FromStr for BrowserMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "launch" => Ok(BrowserMode::Launch),
            "connect" => Ok(BrowserMode::Connect),
            other => Err(ConfigError::EnvVarParseFailed {
                var_name: "BROWSER_MODE".to_string(),
                value: other.to_string(),
                expected_type: "launch | connect".to_string(),
            }),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 浏览器使用方式
    pub browser_mode: BrowserMode,
    /// 浏览器调试端口（connect 模式）
    pub browser_debug_port: u16,
    /// 浏览器可执行文件路径（launch 模式，留空则自动查找）
    pub chrome_executable: Option<String>,
    /// Markdown 输出目录
    pub output_dir: String,
    /// 两个页面之间的间隔（秒）
    pub delay_secs: f64,
    /// 是否静默保存到输出目录（否则逐个询问保存位置）
    pub auto_save: bool,
    /// 页面加载超时（毫秒）
    pub page_load_timeout_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 运行报告文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_mode: BrowserMode::Launch,
            browser_debug_port: 9222,
            chrome_executable: None,
            output_dir: "markdown".to_string(),
            delay_secs: 2.0,
            auto_save: true,
            page_load_timeout_ms: 30_000,
            verbose_logging: false,
            output_log_file: "batch_report.txt".to_string(),
        }
    }
}

impl Config {
    /// 读取配置：默认值 → 配置文件（可选） → 环境变量
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env())
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    fn from_toml_str(content: &str, origin: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|source| {
            AppError::Config(ConfigError::TomlParseFailed {
                path: origin.to_string(),
                source,
            })
        })
    }

    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// 用环境变量覆盖已有配置
    pub fn with_env(self) -> Self {
        let base = self;
        Self {
            browser_mode: std::env::var("BROWSER_MODE").ok().and_then(|v| v.parse().ok()).unwrap_or(base.browser_mode),
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(base.browser_debug_port),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().or(base.chrome_executable),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(base.output_dir),
            delay_secs: std::env::var("BATCH_DELAY_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.delay_secs),
            auto_save: std::env::var("AUTO_SAVE").ok().and_then(|v| v.parse().ok()).unwrap_or(base.auto_save),
            page_load_timeout_ms: std::env::var("PAGE_LOAD_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.page_load_timeout_ms),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(base.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(base.output_log_file),
        }
    }

    /// 生成批处理设置
    pub fn batch_settings(&self) -> Result<BatchSettings, BatchError> {
        BatchSettings::from_secs(self.delay_secs, self.auto_save)
            .map(|s| s.with_load_timeout(Duration::from_millis(self.page_load_timeout_ms)))
    }
}
