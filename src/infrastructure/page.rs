//! 页面能力抽象 - 基础设施层
//!
//! 服务层只依赖这里的 trait，不直接接触 chromiumoxide，
//! 测试中可以用内存实现替换真实浏览器。

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value as JsonValue;

/// 页面加载状态通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// 仍在加载
    Loading,
    /// 加载完成（终态）
    Complete,
    /// 加载失败（终态）
    Failed(String),
}

/// 加载状态监听器
///
/// 持有即注册，drop 即注销。
pub type LoadEvents = BoxStream<'static, LoadState>;

/// 一个隔离的页面会话
#[async_trait]
pub trait PageContext: Send + Sync {
    /// 会话标识（仅用于日志）
    fn id(&self) -> &str;

    /// 在页面中执行 JS 表达式并返回 JSON 结果
    async fn evaluate(&self, script: &str) -> Result<JsonValue>;

    /// 关闭页面，释放资源
    async fn close(&self) -> Result<()>;
}

/// 能够打开新页面的宿主（浏览器）
#[async_trait]
pub trait PageHost: Send + Sync {
    type Context: PageContext + 'static;

    /// 在后台（非前台）打开一个新页面并导航到 `url`
    ///
    /// 返回的监听器在导航发出之前注册，不会错过加载完成的通知。
    async fn open_background(&self, url: &str) -> Result<(Self::Context, LoadEvents)>;
}
