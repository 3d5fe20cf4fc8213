use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{EventLoadEventFired, NavigateParams};
use chromiumoxide::cdp::browser_protocol::target::CreateTargetParams;
use chromiumoxide::Browser;
use futures::{stream, StreamExt};
use tracing::debug;

use crate::infrastructure::{JsExecutor, LoadEvents, LoadState, PageContext, PageHost};

/// 基于 chromiumoxide 的页面宿主
///
/// 每个 URL 都在一个新的后台标签页中打开。
#[derive(Clone)]
pub struct ChromeHost {
    browser: Arc<Browser>,
}

impl ChromeHost {
    pub fn new(browser: Browser) -> Self {
        Self {
            browser: Arc::new(browser),
        }
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }
}

#[async_trait]
impl PageHost for ChromeHost {
    type Context = JsExecutor;

    async fn open_background(&self, url: &str) -> Result<(Self::Context, LoadEvents)> {
        let params = CreateTargetParams::builder()
            .url("about:blank")
            .background(true)
            .build()
            .map_err(|e| anyhow!("无法构建页面参数: {}", e))?;
        let page = self.browser.new_page(params).await?;
        let executor = JsExecutor::new(page);
        debug!("已创建后台页面 {}", executor.id());

        // 先注册监听器，再发起导航
        let loaded = match executor.page().event_listener::<EventLoadEventFired>().await {
            Ok(listener) => listener,
            Err(e) => {
                let _ = executor.close().await;
                return Err(e.into());
            }
        };

        let navigation = match executor.page().execute(NavigateParams::new(url)).await {
            Ok(response) => response.result.error_text.clone(),
            Err(e) => Some(e.to_string()),
        };

        let events: LoadEvents = match navigation {
            Some(error_text) => stream::once(async move { LoadState::Failed(error_text) }).boxed(),
            None => stream::once(async { LoadState::Loading })
                .chain(loaded.map(|_| LoadState::Complete))
                .boxed(),
        };

        Ok((executor, events))
    }
}
