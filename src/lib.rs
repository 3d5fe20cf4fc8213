//! # Batch Markdown
//!
//! 按顺序把一批网页转换为 Markdown 文件
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PageHost` / `PageContext` - 打开后台页面、执行脚本、关闭页面
//! - `JsExecutor` - 基于 chromiumoxide 的 PageContext 实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个页面
//! - `PageLoader` - 带超时的页面加载
//! - `ExtractionClient` - 提取标题和 Markdown
//! - `FilenameRegistry` - 批次内不重复的文件名
//! - `FileStorage` - 写入磁盘
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个 URL"的完整处理流程
//! - `ItemCtx` - 上下文封装（url + 位置）
//! - `ItemFlow` - 流程编排（load → extract → close → persist）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批处理编排器，独占批次状态
//! - `orchestrator/single_page` - 单页处理器
//!
//! ## 模块结构

pub mod app;
pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult, BatchError, ItemError, ItemErrorKind};
pub use infrastructure::{JsExecutor, PageContext, PageHost};
pub use models::{BatchEvent, BatchJob, BatchSettings, ItemResult};
pub use orchestrator::{BatchHandle, BatchOrchestrator};
pub use workflow::{ItemCtx, ItemFlow};
