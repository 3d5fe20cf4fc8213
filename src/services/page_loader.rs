//! 页面加载服务 - 业务能力层
//!
//! 只负责"打开页面并等待加载完成"，不关心提取和保存

use std::time::Duration;

use futures::StreamExt;
use tracing::{debug, warn};

use crate::error::ItemError;
use crate::infrastructure::{LoadEvents, LoadState, PageContext, PageHost};

/// 页面加载服务
///
/// 职责：
/// - 在后台打开隔离的页面
/// - 等待加载完成 / 加载失败 / 超时，三者只取其一
/// - 任何情况下都注销加载监听器
/// - 失败时自己关闭页面；成功时页面交给调用方关闭
pub struct PageLoader<H: PageHost> {
    host: H,
}

impl<H: PageHost> PageLoader<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    /// 打开 `url` 并等待加载完成
    pub async fn load(&self, url: &str, timeout: Duration) -> Result<H::Context, ItemError> {
        let (ctx, events) = self
            .host
            .open_background(url)
            .await
            .map_err(|e| ItemError::unknown(format!("无法创建页面: {}", e)))?;
        debug!("页面 {} 已打开，等待加载: {}", ctx.id(), url);

        // events 被移入等待过程，无论哪个分支胜出都会随之 drop
        let outcome = tokio::time::timeout(timeout, wait_for_terminal_state(events, url)).await;

        let err = match outcome {
            Ok(Ok(())) => return Ok(ctx),
            Ok(Err(e)) => e,
            Err(_) => ItemError::LoadTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            },
        };

        if let Err(e) = ctx.close().await {
            // 页面可能已经不存在了
            warn!("关闭页面 {} 失败: {}", ctx.id(), e);
        }
        Err(err)
    }
}

async fn wait_for_terminal_state(mut events: LoadEvents, url: &str) -> Result<(), ItemError> {
    while let Some(state) = events.next().await {
        match state {
            LoadState::Complete => return Ok(()),
            LoadState::Failed(reason) => {
                return Err(ItemError::LoadError {
                    url: url.to_string(),
                    reason,
                })
            }
            LoadState::Loading => continue,
        }
    }

    Err(ItemError::LoadError {
        url: url.to_string(),
        reason: "加载状态通知已中断".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use futures::{stream, Stream};
    use serde_json::Value as JsonValue;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::task::{Context, Poll};

    struct FakeContext {
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl PageContext for FakeContext {
        fn id(&self) -> &str {
            "fake"
        }

        async fn evaluate(&self, _script: &str) -> Result<JsonValue> {
            Ok(JsonValue::Null)
        }

        async fn close(&self) -> Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// drop 时减少监听器计数
    struct ListenerGuard(Arc<AtomicUsize>);

    impl Drop for ListenerGuard {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    struct GuardedEvents {
        inner: LoadEvents,
        _guard: ListenerGuard,
    }

    impl Stream for GuardedEvents {
        type Item = LoadState;

        fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<LoadState>> {
            self.inner.poll_next_unpin(cx)
        }
    }

    enum Script {
        Complete,
        Fail,
        Hang,
        OpenError,
    }

    struct FakeHost {
        script: Script,
        closed: Arc<AtomicBool>,
        listeners: Arc<AtomicUsize>,
    }

    impl FakeHost {
        fn new(script: Script) -> Self {
            Self {
                script,
                closed: Arc::new(AtomicBool::new(false)),
                listeners: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl PageHost for FakeHost {
        type Context = FakeContext;

        async fn open_background(&self, _url: &str) -> Result<(FakeContext, LoadEvents)> {
            if matches!(self.script, Script::OpenError) {
                return Err(anyhow!("target crashed"));
            }

            self.listeners.fetch_add(1, Ordering::SeqCst);
            let guard = ListenerGuard(self.listeners.clone());
            let states: LoadEvents = match self.script {
                Script::Complete => stream::iter(vec![LoadState::Loading, LoadState::Complete]).boxed(),
                Script::Fail => stream::iter(vec![LoadState::Failed("net::ERR_FAILED".into())]).boxed(),
                _ => stream::pending().boxed(),
            };
            let events = GuardedEvents {
                inner: states,
                _guard: guard,
            }
            .boxed();

            Ok((
                FakeContext {
                    closed: self.closed.clone(),
                },
                events,
            ))
        }
    }

    #[tokio::test]
    async fn test_load_complete_keeps_context_open() {
        let host = FakeHost::new(Script::Complete);
        let (closed, listeners) = (host.closed.clone(), host.listeners.clone());
        let loader = PageLoader::new(host);

        let ctx = loader.load("https://a.example", Duration::from_secs(30)).await;
        tokio_test::assert_ok!(&ctx);
        assert!(!closed.load(Ordering::SeqCst));
        assert_eq!(listeners.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_load_error_closes_context() {
        let host = FakeHost::new(Script::Fail);
        let (closed, listeners) = (host.closed.clone(), host.listeners.clone());
        let loader = PageLoader::new(host);

        let err = loader
            .load("https://a.example", Duration::from_secs(30))
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), crate::error::ItemErrorKind::LoadError);
        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(listeners.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_timeout_closes_context_and_listener() {
        let host = FakeHost::new(Script::Hang);
        let (closed, listeners) = (host.closed.clone(), host.listeners.clone());
        let loader = PageLoader::new(host);

        let started = tokio::time::Instant::now();
        let err = loader
            .load("https://b.example", Duration::from_millis(30_000))
            .await
            .err()
            .unwrap();

        assert_eq!(
            err,
            ItemError::LoadTimeout {
                url: "https://b.example".to_string(),
                timeout_ms: 30_000
            }
        );
        assert!(started.elapsed() >= Duration::from_millis(30_000));
        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(listeners.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_open_failure_is_unknown() {
        let loader = PageLoader::new(FakeHost::new(Script::OpenError));
        let err = loader
            .load("https://a.example", Duration::from_secs(1))
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), crate::error::ItemErrorKind::Unknown);
        assert!(err.to_string().contains("target crashed"));
    }
}
