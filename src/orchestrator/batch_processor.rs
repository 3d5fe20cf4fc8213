//! 批处理编排器 - 编排层
//!
//! ## 职责
//!
//! 本模块独占批处理状态（`BatchJob`），按顺序一个一个地处理 URL。
//!
//! ## 核心功能
//!
//! 1. **启动/取消**：通过 `BatchHandle` 发送命令，编排器串行处理
//! 2. **顺序处理**：同一时刻最多只有一个打开的页面
//! 3. **间隔调度**：两个 URL 之间的等待是一个定时的后续步骤，等待期间仍然响应命令
//! 4. **部分失败**：单个 URL 失败只记录结果，不影响后续 URL
//! 5. **事件通知**：progress / result / complete 通过广播发送，没有订阅者时丢弃
//!
//! ## 取消语义
//!
//! 取消只修改状态，不会中断正在处理的 URL。该 URL 结束后其结果仍会被记录并发送
//! （文件可能已经写入），之后不再调度新的 URL。已取消的批次不会再发送第二个
//! complete 事件。

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::error::BatchError;
use crate::infrastructure::PageHost;
use crate::models::{validate_urls, BatchEvent, BatchJob, BatchSettings, ItemResult};
use crate::services::Storage;
use crate::utils::logging::{log_batch_start, log_item_result};
use crate::workflow::{ItemCtx, ItemFlow};

/// 事件广播容量
pub const EVENT_CAPACITY: usize = 256;

/// 命令队列容量
const COMMAND_CAPACITY: usize = 32;

/// 间隔超出时钟范围时使用的等待时间（约 30 年）
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// 发给编排器的命令
enum BatchCommand {
    Start {
        urls: Vec<String>,
        settings: BatchSettings,
        reply: oneshot::Sender<Result<(), BatchError>>,
    },
    Cancel,
    Snapshot {
        reply: oneshot::Sender<BatchJob>,
    },
}

/// 已接受、等待生效的启动请求
struct PendingStart {
    urls: Vec<String>,
    settings: BatchSettings,
    reply: oneshot::Sender<Result<(), BatchError>>,
}

/// 编排器句柄
///
/// 可以克隆；所有句柄都释放且没有待处理的 URL 时，编排器退出。
#[derive(Clone)]
pub struct BatchHandle {
    commands: mpsc::Sender<BatchCommand>,
    events: broadcast::Sender<BatchEvent>,
}

impl BatchHandle {
    /// 订阅批处理事件
    pub fn subscribe(&self) -> broadcast::Receiver<BatchEvent> {
        self.events.subscribe()
    }

    /// 启动新批次
    ///
    /// URL 列表为空或包含无效地址时直接拒绝；已有批次在运行时返回 `AlreadyRunning`。
    pub async fn start(&self, urls: Vec<String>, settings: BatchSettings) -> Result<(), BatchError> {
        validate_urls(&urls)?;

        let (reply, response) = oneshot::channel();
        self.commands
            .send(BatchCommand::Start {
                urls,
                settings,
                reply,
            })
            .await
            .map_err(|_| BatchError::OrchestratorStopped)?;
        response.await.map_err(|_| BatchError::OrchestratorStopped)?
    }

    /// 取消正在运行的批次
    pub async fn cancel(&self) -> Result<(), BatchError> {
        self.commands
            .send(BatchCommand::Cancel)
            .await
            .map_err(|_| BatchError::OrchestratorStopped)
    }

    /// 获取批次状态的快照
    pub async fn snapshot(&self) -> Result<BatchJob, BatchError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(BatchCommand::Snapshot { reply })
            .await
            .map_err(|_| BatchError::OrchestratorStopped)?;
        response.await.map_err(|_| BatchError::OrchestratorStopped)
    }
}

/// 命令接收端
///
/// 所有句柄释放后只返回一次 None，之后永远挂起。
struct CommandInbox {
    rx: mpsc::Receiver<BatchCommand>,
    closed: bool,
}

impl CommandInbox {
    async fn next(&mut self) -> Option<BatchCommand> {
        if self.closed {
            std::future::pending::<()>().await;
        }
        let command = self.rx.recv().await;
        self.closed = command.is_none();
        command
    }
}

/// 批次状态（编排器独占）
struct BatchState {
    job: BatchJob,
    next_step: Option<Instant>,
    pending_start: Option<PendingStart>,
    events: broadcast::Sender<BatchEvent>,
}

impl BatchState {
    fn emit(&self, event: BatchEvent) {
        // 没有订阅者时发送失败，直接忽略
        let _ = self.events.send(event);
    }

    /// 处理一条命令
    ///
    /// 返回需要立即生效的启动请求。`in_flight` 为 true 时（上一个 URL 仍在处理）
    /// 启动请求会被暂存，等该 URL 结束后再生效。
    fn handle(&mut self, command: BatchCommand, in_flight: bool) -> Option<PendingStart> {
        match command {
            BatchCommand::Start {
                urls,
                settings,
                reply,
            } => {
                if self.job.is_running {
                    warn!("⚠️ 已有批次正在运行，忽略新的启动请求");
                    let _ = reply.send(Err(BatchError::AlreadyRunning));
                    return None;
                }
                if urls.is_empty() {
                    let _ = reply.send(Err(BatchError::EmptyUrlList));
                    return None;
                }

                let start = PendingStart {
                    urls,
                    settings,
                    reply,
                };
                if !in_flight {
                    return Some(start);
                }

                info!("上一个页面仍在处理中，新批次将在其结束后开始");
                if let Some(previous) = self.pending_start.replace(start) {
                    let _ = previous.reply.send(Err(BatchError::AlreadyRunning));
                }
                None
            }
            BatchCommand::Cancel => {
                self.cancel();
                None
            }
            BatchCommand::Snapshot { reply } => {
                let _ = reply.send(self.job.clone());
                None
            }
        }
    }

    fn cancel(&mut self) {
        if !self.job.is_running {
            debug!("没有正在运行的批次，忽略取消请求");
            return;
        }

        self.job.is_running = false;
        self.next_step = None;
        warn!(
            "⏹️ 批次已取消: 已完成 {}/{}",
            self.job.results.len(),
            self.job.total()
        );
        self.emit(BatchEvent::Complete { cancelled: true });
    }

    fn complete(&mut self) {
        self.job.is_running = false;
        self.next_step = None;
        info!(
            "🏁 批次完成: 成功 {}, 失败 {}",
            self.job.success_count(),
            self.job.failure_count()
        );
        self.emit(BatchEvent::Complete { cancelled: false });
    }

    fn record(&mut self, result: ItemResult) {
        self.emit(BatchEvent::from(&result));
        self.job.results.push(result);
    }
}

/// 批处理编排器
///
/// - 独占 `BatchJob` 和本批次的文件名登记表
/// - 串行处理命令和 URL，不需要加锁
/// - 向下委托 `ItemFlow` 处理单个 URL
pub struct BatchOrchestrator<H: PageHost, S: Storage> {
    flow: ItemFlow<H, S>,
    state: BatchState,
    inbox: CommandInbox,
}

impl<H, S> BatchOrchestrator<H, S>
where
    H: PageHost + 'static,
    S: Storage + 'static,
{
    /// 在后台任务中运行编排器
    ///
    /// 任务结束时返回最后的批次状态（包括取消后仍完成的那个 URL 的结果）。
    pub fn spawn(flow: ItemFlow<H, S>) -> (BatchHandle, JoinHandle<BatchJob>) {
        let (orchestrator, handle) = Self::new(flow);
        let task = tokio::spawn(orchestrator.run());
        (handle, task)
    }

    pub fn new(flow: ItemFlow<H, S>) -> (Self, BatchHandle) {
        let (commands, rx) = mpsc::channel(COMMAND_CAPACITY);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let orchestrator = Self {
            flow,
            state: BatchState {
                job: BatchJob::default(),
                next_step: None,
                pending_start: None,
                events: events.clone(),
            },
            inbox: CommandInbox { rx, closed: false },
        };
        (orchestrator, BatchHandle { commands, events })
    }

    /// 主循环：处理命令，到点处理下一个 URL
    pub async fn run(mut self) -> BatchJob {
        loop {
            if self.inbox.closed && self.state.next_step.is_none() {
                debug!("所有句柄已释放，编排器退出");
                break;
            }

            let wake = self.state.next_step;
            tokio::select! {
                command = self.inbox.next() => {
                    if let Some(command) = command {
                        if let Some(start) = self.state.handle(command, false) {
                            self.apply_start(start);
                        }
                    }
                }
                _ = sleep_until(wake.unwrap_or_else(Instant::now)), if wake.is_some() => {
                    self.state.next_step = None;
                    self.process_next().await;
                }
            }
        }

        self.state.job
    }

    fn apply_start(&mut self, start: PendingStart) {
        let PendingStart {
            urls,
            settings,
            reply,
        } = start;

        log_batch_start(urls.len(), &settings);
        self.flow.reset();
        self.state.job = BatchJob::start(urls, settings);
        self.state.next_step = Some(Instant::now());
        let _ = reply.send(Ok(()));
    }

    /// 处理当前位置的 URL，并安排下一步
    async fn process_next(&mut self) {
        if !self.state.job.is_running {
            return;
        }
        let Some(url) = self.state.job.current_url().map(str::to_string) else {
            self.state.complete();
            return;
        };

        let index = self.state.job.current_index;
        let total = self.state.job.total();
        let settings = self.state.job.settings;
        let ctx = ItemCtx::new(url.clone(), index + 1, total);

        self.state.emit(BatchEvent::Progress {
            current: index + 1,
            total,
            url: url.clone(),
        });

        // 处理 URL 的同时继续响应命令（取消只改状态，不中断当前 URL）
        let outcome = {
            let item = self.flow.run(&ctx, &settings);
            tokio::pin!(item);
            loop {
                tokio::select! {
                    outcome = &mut item => break outcome,
                    command = self.inbox.next() => {
                        if let Some(command) = command {
                            // in_flight 时启动请求只会被暂存
                            let _ = self.state.handle(command, true);
                        }
                    }
                }
            }
        };

        let result = ItemResult::from_outcome(url, outcome);
        log_item_result(&ctx, &result);
        self.state.record(result);
        self.state.job.current_index += 1;

        if self.state.job.is_running {
            if self.state.job.has_remaining() {
                debug!("{:?} 后处理下一个 URL", settings.delay);
                self.state.next_step = Some(deadline_after(settings.delay));
            } else {
                self.state.complete();
            }
        } else {
            debug!("批次已停止，不再调度新的 URL");
        }

        if let Some(start) = self.state.pending_start.take() {
            self.apply_start(start);
        }
    }
}

/// 计算下一步的时间点，溢出时退回到很远的将来（仍然可以被取消）
fn deadline_after(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay).unwrap_or_else(|| {
        warn!("⚠️ 间隔 {:?} 超出时钟范围，改为等待到很远的将来", delay);
        now + FAR_FUTURE
    })
}
