use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};

use batch_markdown::cli::{Cli, Command};
use batch_markdown::config::BrowserMode;
use batch_markdown::models::{load_url_file, parse_urls, BatchSettings};
use batch_markdown::utils::logging;
use batch_markdown::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config.as_deref()).context("加载配置失败")?;

    // 初始化日志
    logging::init(cli.verbose || config.verbose_logging);

    match cli.command {
        Command::Batch {
            urls,
            file,
            delay,
            no_auto_save,
            json_events,
        } => {
            let mut all_urls = parse_urls(&urls.join("\n"));
            if let Some(path) = file {
                all_urls.extend(
                    load_url_file(&path)
                        .await
                        .with_context(|| format!("读取 URL 文件失败: {}", path.display()))?,
                );
            }
            if all_urls.is_empty() {
                bail!("没有找到有效的 URL");
            }

            let defaults = config.batch_settings()?;
            let settings = BatchSettings::from_secs(
                delay.unwrap_or(config.delay_secs),
                !no_auto_save && config.auto_save,
            )?
            .with_load_timeout(defaults.load_timeout);

            let mode = config.browser_mode;
            let app = App::initialize(config, mode).await?;
            let job = app.run_batch(all_urls, settings, json_events).await?;

            if job.failure_count() > 0 {
                error!("❌ {} 个 URL 处理失败", job.failure_count());
            }
        }
        Command::Page { target } => {
            // 单页模式只能作用于用户已经打开的浏览器
            let app = App::initialize(config, BrowserMode::Connect).await?;
            let filename = app.download_page(&target).await?;
            info!("✅ 已保存: {}", filename);
        }
    }

    Ok(())
}
