//! 单页处理器 - 编排层
//!
//! 处理一个已经打开的页面：提取 → 询问保存位置 → 保存。
//! 不涉及批次状态，也不能中途取消。

use tracing::{error, info};

use crate::error::ItemError;
use crate::infrastructure::PageContext;
use crate::services::{ExtractionClient, PersistenceStep, Storage};
use crate::workflow::ItemCtx;

/// 把当前页面保存为 Markdown
///
/// # 参数
/// - `page`: 已加载的页面（调用方负责它的生命周期，这里不会关闭）
/// - `label`: 页面地址或标题（仅用于日志）
///
/// # 返回
/// 返回保存的文件名
pub async fn download_page<C, S>(
    page: &C,
    label: &str,
    extractor: &ExtractionClient,
    persistence: &mut PersistenceStep<S>,
) -> Result<String, ItemError>
where
    C: PageContext + ?Sized,
    S: Storage,
{
    let ctx = ItemCtx::single(label);
    info!("{} 📄 正在提取当前页面: {}", ctx, label);

    let extracted = extractor.extract(page).await.map_err(|e| {
        error!("{} ❌ 提取失败: {}", ctx, e);
        e
    })?;

    let filename = persistence.persist(&extracted, true).await.map_err(|e| {
        error!("{} ❌ 保存失败: {}", ctx, e);
        e
    })?;

    info!("{} ✅ 已保存为 {}", ctx, filename);
    Ok(filename)
}
