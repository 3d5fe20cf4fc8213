//! 页面处理上下文
//!
//! 封装"我正在处理这一批的第几个 URL"这一信息

use std::fmt::Display;

/// 页面处理上下文
#[derive(Debug, Clone)]
pub struct ItemCtx {
    /// 目标 URL
    pub url: String,

    /// 在批次中的位置（从1开始）
    pub position: usize,

    /// 批次总数
    pub total: usize,
}

impl ItemCtx {
    /// 创建新的页面上下文
    pub fn new(url: impl Into<String>, position: usize, total: usize) -> Self {
        Self {
            url: url.into(),
            position,
            total,
        }
    }

    /// 单页模式下的上下文
    pub fn single(url: impl Into<String>) -> Self {
        Self::new(url, 1, 1)
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[页面 {}/{}]", self.position, self.total)
    }
}
