//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批处理编排器
//! - 独占批次状态（BatchJob）
//! - 启动 / 取消 / 快照命令
//! - 按顺序处理 URL，两个 URL 之间按设置等待
//! - 发送 progress / result / complete 事件
//!
//! ### `single_page` - 单页处理器
//! - 处理一个已经打开的页面
//! - 提取后询问保存位置
//! - 不涉及批次状态
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<URL>)        single_page (处理一个已打开的页面)
//!     ↓                                       ↓
//! workflow::ItemFlow (处理单个 URL)            │
//!     ↓                                       ↓
//! services (能力层：加载 / 提取 / 文件名 / 保存)
//!     ↓
//! infrastructure (基础设施：PageHost / PageContext / JsExecutor)
//! ```

pub mod batch_processor;
pub mod single_page;

// 重新导出主要类型
pub use batch_processor::{BatchHandle, BatchOrchestrator};
pub use single_page::download_page;
