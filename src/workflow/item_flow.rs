//! 单个 URL 的处理流程 - 流程层
//!
//! 核心职责：定义"一个 URL"的完整处理流程
//!
//! 流程顺序：
//! 1. 打开页面并等待加载（带超时）
//! 2. 提取标题和 Markdown
//! 3. 关闭页面（无论提取成功与否）
//! 4. 生成文件名并保存

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{debug, error, info};

use crate::error::ItemError;
use crate::infrastructure::{PageContext, PageHost};
use crate::models::BatchSettings;
use crate::services::{ExtractionClient, PageLoader, PersistenceStep, Storage};
use crate::workflow::item_ctx::ItemCtx;

/// 单个 URL 的处理流程
///
/// - 编排 加载 → 提取 → 关闭 → 保存
/// - 所有失败（包括 panic）都转换为 `ItemError`，不会向上抛出
/// - 持有本批次的文件名登记表（通过 PersistenceStep）
pub struct ItemFlow<H: PageHost, S: Storage> {
    loader: PageLoader<H>,
    extractor: ExtractionClient,
    persistence: PersistenceStep<S>,
}

impl<H: PageHost, S: Storage> ItemFlow<H, S> {
    pub fn new(host: H, storage: S) -> Self {
        Self::with_extractor(host, storage, ExtractionClient::new())
    }

    pub fn with_extractor(host: H, storage: S, extractor: ExtractionClient) -> Self {
        Self {
            loader: PageLoader::new(host),
            extractor,
            persistence: PersistenceStep::new(storage),
        }
    }

    /// 新批次开始
    pub fn reset(&mut self) {
        self.persistence.reset();
    }

    /// 处理一个 URL，返回保存的文件名
    pub async fn run(&mut self, ctx: &ItemCtx, settings: &BatchSettings) -> Result<String, ItemError> {
        let outcome = AssertUnwindSafe(self.run_steps(ctx, settings))
            .catch_unwind()
            .await;

        outcome.unwrap_or_else(|panic| Err(panic_error(ctx, panic)))
    }

    async fn run_steps(&mut self, ctx: &ItemCtx, settings: &BatchSettings) -> Result<String, ItemError> {
        info!("{} 🌐 正在打开: {}", ctx, ctx.url);
        let page = self.loader.load(&ctx.url, settings.load_timeout).await?;
        debug!("{} 页面加载完成", ctx);

        // 提取过程中的 panic 也要先关闭页面
        let extracted = AssertUnwindSafe(self.extractor.extract(&page))
            .catch_unwind()
            .await;

        // 无论提取是否成功都关闭页面，关闭失败忽略（页面可能已经不在了）
        if let Err(e) = page.close().await {
            debug!("{} 关闭页面失败: {}", ctx, e);
        }

        let extracted = extracted.unwrap_or_else(|panic| Err(panic_error(ctx, panic)))?;
        info!("{} ✓ 提取完成: {}", ctx, extracted.title);

        self.persistence
            .persist(&extracted, !settings.auto_persist)
            .await
    }
}

/// 把 panic 转换为 Unknown 错误
fn panic_error(ctx: &ItemCtx, panic: Box<dyn Any + Send>) -> ItemError {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "未知错误".to_string());
    error!("{} ❌ 处理过程中发生 panic: {}", ctx, message);
    ItemError::Unknown { message }
}
