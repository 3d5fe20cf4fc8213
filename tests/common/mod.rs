//! 测试用的内存浏览器和存储

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::{stream, StreamExt};
use serde_json::{json, Value as JsonValue};
use tokio::sync::{broadcast, Notify};

use batch_markdown::infrastructure::{LoadEvents, LoadState, PageContext, PageHost};
use batch_markdown::services::Storage;
use batch_markdown::BatchEvent;

/// 每个 URL 在假浏览器中的表现
#[derive(Clone)]
pub enum Behavior {
    /// 正常加载，注入脚本后返回文章
    Article { title: String },
    /// 等 gate 打开后才加载完成
    Gated { title: String, gate: Arc<Notify> },
    /// 永远不会加载完成
    Hang,
    /// 加载失败
    Fail(String),
    /// 加载完成，但提取脚本报告没有文章
    NoArticle,
    /// 加载完成，执行脚本时 panic
    Panic,
}

impl Behavior {
    pub fn article(title: &str) -> Self {
        Behavior::Article {
            title: title.to_string(),
        }
    }
}

/// 假页面
pub struct FakeContext {
    id: String,
    behavior: Behavior,
    injected: AtomicBool,
    closed: AtomicBool,
    open_pages: Arc<AtomicUsize>,
}

impl FakeContext {
    pub fn new(id: &str, behavior: Behavior, open_pages: Arc<AtomicUsize>) -> Self {
        open_pages.fetch_add(1, Ordering::SeqCst);
        Self {
            id: id.to_string(),
            behavior,
            injected: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            open_pages,
        }
    }
}

#[async_trait]
impl PageContext for FakeContext {
    fn id(&self) -> &str {
        &self.id
    }

    async fn evaluate(&self, script: &str) -> Result<JsonValue> {
        if matches!(self.behavior, Behavior::Panic) {
            panic!("renderer crashed");
        }
        if script.contains("__batchMarkdown = ") {
            self.injected.store(true, Ordering::SeqCst);
            return Ok(json!(true));
        }
        if !self.injected.load(Ordering::SeqCst) {
            return Ok(json!({ "absent": true }));
        }

        Ok(match &self.behavior {
            Behavior::Article { title } | Behavior::Gated { title, .. } => json!({
                "title": title,
                "markdown": format!("# {}\n\nbody", title),
            }),
            Behavior::NoArticle => json!({ "error": "Could not extract article" }),
            Behavior::Hang | Behavior::Fail(_) | Behavior::Panic => {
                return Err(anyhow!("page not loaded"))
            }
        })
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.open_pages.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// 按 URL 脚本化的假浏览器
#[derive(Clone, Default)]
pub struct FakeHost {
    behaviors: Arc<HashMap<String, Behavior>>,
    pub open_pages: Arc<AtomicUsize>,
    pub opened: Arc<Mutex<Vec<String>>>,
}

impl FakeHost {
    pub fn new(behaviors: Vec<(&str, Behavior)>) -> Self {
        Self {
            behaviors: Arc::new(
                behaviors
                    .into_iter()
                    .map(|(url, b)| (url.to_string(), b))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn open_count(&self) -> usize {
        self.open_pages.load(Ordering::SeqCst)
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageHost for FakeHost {
    type Context = FakeContext;

    async fn open_background(&self, url: &str) -> Result<(FakeContext, LoadEvents)> {
        let behavior = self
            .behaviors
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("unexpected url {}", url))?;
        self.opened.lock().unwrap().push(url.to_string());

        let events: LoadEvents = match &behavior {
            Behavior::Article { .. } | Behavior::NoArticle | Behavior::Panic => {
                stream::iter(vec![LoadState::Loading, LoadState::Complete]).boxed()
            }
            Behavior::Gated { gate, .. } => {
                let gate = gate.clone();
                stream::once(async move {
                    gate.notified().await;
                    LoadState::Complete
                })
                .boxed()
            }
            Behavior::Hang => stream::pending().boxed(),
            Behavior::Fail(reason) => stream::iter(vec![LoadState::Failed(reason.clone())]).boxed(),
        };

        Ok((FakeContext::new(url, behavior, self.open_pages.clone()), events))
    }
}

/// 内存存储，记录每次保存
#[derive(Clone, Default)]
pub struct MemoryStorage {
    pub saved: Arc<Mutex<Vec<SavedFile>>>,
}

#[derive(Debug, Clone)]
pub struct SavedFile {
    pub filename: String,
    pub content: String,
    pub prompted: bool,
}

impl MemoryStorage {
    pub fn filenames(&self) -> Vec<String> {
        self.saved
            .lock()
            .unwrap()
            .iter()
            .map(|f| f.filename.clone())
            .collect()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save(&self, bytes: &[u8], filename: &str, prompt_user: bool) -> Result<String> {
        self.saved.lock().unwrap().push(SavedFile {
            filename: filename.to_string(),
            content: String::from_utf8_lossy(bytes).to_string(),
            prompted: prompt_user,
        });
        Ok(filename.to_string())
    }
}

/// 收集事件直到 complete（包含 complete 本身）
pub async fn collect_until_complete(rx: &mut broadcast::Receiver<BatchEvent>) -> Vec<BatchEvent> {
    let mut events = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(120), rx.recv())
            .await
            .expect("等待事件超时")
            .expect("事件通道已关闭");
        let done = matches!(event, BatchEvent::Complete { .. });
        events.push(event);
        if done {
            return events;
        }
    }
}

/// 收集通道关闭前剩下的所有事件
pub async fn drain(rx: &mut broadcast::Receiver<BatchEvent>) -> Vec<BatchEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.recv().await {
        events.push(event);
    }
    events
}
