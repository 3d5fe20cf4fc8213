use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "batch-markdown")]
#[command(about = "把一批网页转换为 Markdown 文件")]
#[command(version)]
pub struct Cli {
    /// 配置文件（TOML）
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 按顺序处理一批 URL
    Batch {
        /// 要处理的 URL
        urls: Vec<String>,

        /// 从文件读取 URL（每行一个）
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// 两个页面之间的间隔（秒）
        #[arg(short, long)]
        delay: Option<f64>,

        /// 逐个询问保存位置
        #[arg(long)]
        no_auto_save: bool,

        /// 以 JSON Lines 输出进度事件
        #[arg(long)]
        json_events: bool,
    },
    /// 保存浏览器中一个已经打开的页面
    Page {
        /// 页面标题或地址中包含的文本
        #[arg(short, long)]
        target: String,
    },
}
