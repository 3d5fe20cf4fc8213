use std::path::Path;

use anyhow::{anyhow, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::browser::{self, ChromeHost};
use crate::config::{BrowserMode, Config};
use crate::infrastructure::JsExecutor;
use crate::models::{BatchEvent, BatchJob, BatchSettings};
use crate::orchestrator::{self, BatchOrchestrator};
use crate::services::{ensure_output_dir, ExtractionClient, FileStorage, PersistenceStep};
use crate::utils::logging::{log_startup, print_final_stats, write_report};
use crate::workflow::ItemFlow;

/// 应用主结构
pub struct App {
    config: Config,
    host: ChromeHost,
}

impl App {
    /// 初始化应用：按 `mode` 启动或连接浏览器
    pub async fn initialize(config: Config, mode: BrowserMode) -> Result<Self> {
        log_startup(&format!("{:?}", mode), &config.output_dir);

        let browser = match mode {
            BrowserMode::Launch => {
                browser::launch_headless_browser(config.chrome_executable.as_deref()).await?
            }
            BrowserMode::Connect => browser::connect_to_browser(config.browser_debug_port).await?,
        };

        Ok(Self {
            config,
            host: ChromeHost::new(browser),
        })
    }

    /// 运行一个批次，直到完成或被 Ctrl-C 取消
    pub async fn run_batch(&self, urls: Vec<String>, settings: BatchSettings, json_events: bool) -> Result<BatchJob> {
        let storage = FileStorage::new(&self.config.output_dir);
        ensure_output_dir(storage.output_dir())?;

        let flow = ItemFlow::new(self.host.clone(), storage);
        let (handle, task) = BatchOrchestrator::spawn(flow);
        let mut events = handle.subscribe();
        handle.start(urls, settings).await?;

        // 收到 complete 后释放句柄，编排器处理完手上的 URL 就会退出并关闭事件通道
        let mut handle = Some(handle);
        let mut cancelled = false;
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => {
                        emit_event(&event, json_events)?;
                        if let BatchEvent::Complete { cancelled: c } = event {
                            cancelled = c;
                            handle = None;
                        }
                    }
                    Err(RecvError::Lagged(n)) => warn!("⚠️ 事件处理过慢，丢失了 {} 个事件", n),
                    Err(RecvError::Closed) => break,
                },
                signal = tokio::signal::ctrl_c(), if handle.is_some() => {
                    signal?;
                    warn!("⏹️ 收到 Ctrl-C，正在取消批次...");
                    if let Some(handle) = &handle {
                        handle.cancel().await?;
                    }
                }
            }
        }

        let job = task.await.map_err(|e| anyhow!("编排器任务异常退出: {}", e))?;

        write_report(Path::new(&self.config.output_log_file), &job, cancelled)?;
        print_final_stats(&job, cancelled, &self.config.output_log_file);

        Ok(job)
    }

    /// 保存浏览器中已打开的一个页面，返回文件名
    pub async fn download_page(&self, target: &str) -> Result<String> {
        let page = browser::find_open_page(self.host.browser(), target).await?;
        let executor = JsExecutor::new(page);
        browser::warn_if_not_ready(&executor).await;

        let label = executor
            .page()
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| target.to_string());

        let mut persistence = PersistenceStep::new(FileStorage::new(&self.config.output_dir));
        let filename =
            orchestrator::download_page(&executor, &label, &ExtractionClient::new(), &mut persistence).await?;
        Ok(filename)
    }
}

/// 输出一个批处理事件
fn emit_event(event: &BatchEvent, json_events: bool) -> Result<()> {
    if json_events {
        println!("{}", serde_json::to_string(event)?);
    } else {
        debug!("事件: {:?}", event);
    }
    Ok(())
}
