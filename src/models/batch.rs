use std::time::Duration;

use serde::Serialize;

use crate::error::{BatchError, ItemError, ItemErrorKind};

/// 默认页面加载超时
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_millis(30_000);

/// 批处理设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// 两个页面之间的间隔
    pub delay: Duration,
    /// true: 静默保存到默认目录; false: 逐个询问保存位置
    pub auto_persist: bool,
    /// 单个页面的加载超时
    pub load_timeout: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
            auto_persist: true,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }
}

impl BatchSettings {
    pub fn new(delay: Duration, auto_persist: bool) -> Self {
        Self {
            delay,
            auto_persist,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }

    /// 从"秒"为单位的间隔构造，负数、非有限值或超出 `Duration` 范围的值会被拒绝
    pub fn from_secs(delay_secs: f64, auto_persist: bool) -> Result<Self, BatchError> {
        let invalid = || BatchError::InvalidDelay {
            value: delay_secs.to_string(),
        };
        if !delay_secs.is_finite() || delay_secs < 0.0 {
            return Err(invalid());
        }
        let delay = Duration::try_from_secs_f64(delay_secs).map_err(|_| invalid())?;
        Ok(Self::new(delay, auto_persist))
    }

    pub fn with_load_timeout(mut self, load_timeout: Duration) -> Self {
        self.load_timeout = load_timeout;
        self
    }
}

/// 单个 URL 的最终结果，追加后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ItemResult {
    Success {
        url: String,
        filename: String,
    },
    Failure {
        url: String,
        kind: ItemErrorKind,
        error: String,
    },
}

impl ItemResult {
    pub fn from_outcome(url: impl Into<String>, outcome: Result<String, ItemError>) -> Self {
        let url = url.into();
        match outcome {
            Ok(filename) => ItemResult::Success { url, filename },
            Err(e) => ItemResult::Failure {
                url,
                kind: e.kind(),
                error: e.to_string(),
            },
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ItemResult::Success { url, .. } | ItemResult::Failure { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ItemResult::Success { .. })
    }
}

/// 批处理任务状态
///
/// 只由编排器持有和修改；对外只提供克隆出来的快照。
#[derive(Debug, Clone, Default)]
pub struct BatchJob {
    pub urls: Vec<String>,
    pub current_index: usize,
    pub settings: BatchSettings,
    pub is_running: bool,
    pub results: Vec<ItemResult>,
}

impl BatchJob {
    /// 创建新的任务并进入运行状态
    pub fn start(urls: Vec<String>, settings: BatchSettings) -> Self {
        Self {
            urls,
            current_index: 0,
            settings,
            is_running: true,
            results: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.urls.len()
    }

    pub fn current_url(&self) -> Option<&str> {
        self.urls.get(self.current_index).map(String::as_str)
    }

    pub fn has_remaining(&self) -> bool {
        self.current_index < self.urls.len()
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }
}

/// 提取脚本返回的页面内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,
    pub markdown: String,
}
