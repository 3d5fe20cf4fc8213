use serde::Serialize;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 批处理控制错误
    #[error("批处理错误: {0}")]
    Batch(#[from] BatchError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 启动浏览器失败
    #[error("启动浏览器失败: {source}")]
    LaunchFailed {
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 浏览器配置失败
    #[error("浏览器配置失败: {0}")]
    ConfigurationFailed(String),
    /// 找不到已打开的目标页面
    #[error("没有找到标题或地址包含 '{needle}' 的页面")]
    PageNotFound { needle: String },
    /// CDP 调用失败
    #[error("CDP 调用失败: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
}

/// 批处理控制错误
///
/// 这些错误在批次开始之前返回给调用方，不会在运行中出现。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// URL 列表为空
    #[error("URL 列表为空，至少需要一个有效的 URL")]
    EmptyUrlList,
    /// URL 无效或协议不是 http/https
    #[error("无效的 URL: {url}")]
    InvalidUrl { url: String },
    /// 间隔时间无效
    #[error("无效的间隔时间: {value} 秒")]
    InvalidDelay { value: String },
    /// 已有批次在运行
    #[error("已有批次正在运行")]
    AlreadyRunning,
    /// 编排器已经停止
    #[error("批处理编排器已停止")]
    OrchestratorStopped,
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 输出目录不可用
    #[error("输出目录不存在或不可写 ({path}): {reason}")]
    OutputDir { path: String, reason: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
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

/// 单个页面处理失败的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemErrorKind {
    LoadTimeout,
    LoadError,
    ExtractionUnavailable,
    ExtractionSemanticError,
    PersistenceError,
    Unknown,
}

/// 单个页面处理错误
///
/// 全部可以在批次层面恢复：编排器把它们记录为失败结果后继续下一个 URL。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    /// 页面加载超时
    #[error("页面加载超时 ({timeout_ms}ms): {url}")]
    LoadTimeout { url: String, timeout_ms: u64 },
    /// 页面加载失败
    #[error("页面加载失败 ({url}): {reason}")]
    LoadError { url: String, reason: String },
    /// 页面中没有可用的提取能力（注入后仍然无响应）
    #[error("提取脚本不可用: {reason}")]
    ExtractionUnavailable { reason: String },
    /// 提取脚本明确返回了错误
    #[error("{message}")]
    ExtractionSemantic { message: String },
    /// 保存文件失败
    #[error("保存 {filename} 失败: {reason}")]
    Persistence { filename: String, reason: String },
    /// 未分类的错误，保留原始信息
    #[error("{message}")]
    Unknown { message: String },
}

impl ItemError {
    /// 获取错误类别
    pub fn kind(&self) -> ItemErrorKind {
        match self {
            ItemError::LoadTimeout { .. } => ItemErrorKind::LoadTimeout,
            ItemError::LoadError { .. } => ItemErrorKind::LoadError,
            ItemError::ExtractionUnavailable { .. } => ItemErrorKind::ExtractionUnavailable,
            ItemError::ExtractionSemantic { .. } => ItemErrorKind::ExtractionSemanticError,
            ItemError::Persistence { .. } => ItemErrorKind::PersistenceError,
            ItemError::Unknown { .. } => ItemErrorKind::Unknown,
        }
    }

    /// 用任意错误构造 Unknown
    pub fn unknown(err: impl std::fmt::Display) -> Self {
        ItemError::Unknown {
            message: err.to_string(),
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::Cdp(err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(port: u16, source: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed { port, source })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
