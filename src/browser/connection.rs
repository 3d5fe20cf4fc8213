use chromiumoxide::{Browser, Page};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::browser::spawn_handler;
use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::JsExecutor;

/// 连接到已开启调试端口的浏览器
pub async fn connect_to_browser(port: u16) -> AppResult<Browser> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    spawn_handler(handler);

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    Ok(browser)
}

/// 在已打开的页面中查找标题或地址包含 `needle` 的页面
pub async fn find_open_page(browser: &Browser, needle: &str) -> AppResult<Page> {
    let pages = browser.pages().await.map_err(BrowserError::from)?;
    debug!("获取到 {} 个页面", pages.len());
    debug!("正在查找标题或地址包含 '{}' 的页面", needle);

    for p in pages.iter() {
        let title = p.get_title().await.ok().flatten().unwrap_or_default();
        let url = p.url().await.ok().flatten().unwrap_or_default();
        debug!("检查页面: {} ({})", title, url);

        if title.contains(needle) || url.contains(needle) {
            info!("✓ 找到目标页面: {}", if title.is_empty() { &url } else { &title });
            return Ok(p.clone());
        }
    }

    Err(BrowserError::PageNotFound {
        needle: needle.to_string(),
    }
    .into())
}

/// 读取页面的 document.readyState，页面还没加载完时给出提示
pub async fn warn_if_not_ready(executor: &JsExecutor) {
    match executor.eval_as::<String>("document.readyState").await {
        Ok(state) if state == "complete" => debug!("页面已加载完成"),
        Ok(state) => warn!("⚠️ 页面尚未加载完成 (readyState = {})，提取结果可能不完整", state),
        Err(e) => debug!("无法读取 readyState: {}", e),
    }
}
