/// 日志工具模块
///
/// 提供日志初始化、格式化和运行报告的辅助函数
use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::models::{BatchJob, BatchSettings, ItemResult};
use crate::workflow::ItemCtx;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info 级别。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("batch_markdown={},warn", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(mode: &str, output_dir: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 网页批量转 Markdown");
    info!("🌐 浏览器模式: {}", mode);
    info!("📁 输出目录: {}", output_dir);
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
pub fn log_batch_start(total: usize, settings: &BatchSettings) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理 {} 个 URL", total);
    info!(
        "⏱️ 间隔: {:.1} 秒, 加载超时: {} 毫秒, 自动保存: {}",
        settings.delay.as_secs_f64(),
        settings.load_timeout.as_millis(),
        if settings.auto_persist { "是" } else { "否" }
    );
    info!("{}", "=".repeat(60));
}

/// 记录单个 URL 的结果
pub fn log_item_result(ctx: &ItemCtx, result: &ItemResult) {
    match result {
        ItemResult::Success { filename, .. } => info!("{} ✅ 成功: {}", ctx, filename),
        ItemResult::Failure { error, .. } => error!("{} ❌ 失败: {}", ctx, error),
    }
}

/// 打印最终统计信息
pub fn print_final_stats(job: &BatchJob, cancelled: bool, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计{}", if cancelled { "（已取消）" } else { "" });
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", job.success_count(), job.total());
    info!("❌ 失败: {}", job.failure_count());
    if cancelled {
        info!("⏭️ 未处理: {}", job.total().saturating_sub(job.results.len()));
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 写入运行报告
pub fn write_report(path: &Path, job: &BatchJob, cancelled: bool) -> Result<()> {
    let mut report = format!(
        "{}\n批处理报告 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );

    for result in &job.results {
        match result {
            ItemResult::Success { url, filename } => {
                report.push_str(&format!("✅ {} -> {}\n", url, filename));
            }
            ItemResult::Failure { url, error, .. } => {
                report.push_str(&format!("❌ {} | {}\n", url, truncate_text(error, 200)));
            }
        }
    }

    report.push_str(&format!(
        "\n成功 {} / 失败 {} / 共 {}{}\n",
        job.success_count(),
        job.failure_count(),
        job.total(),
        if cancelled { "（已取消）" } else { "" }
    ));

    fs::write(path, report)?;
    Ok(())
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
