//! 文件存储服务 - 业务能力层
//!
//! 只负责"把字节写到磁盘"，不关心文件名怎么来的

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::error::FileError;

/// 存储协作方
#[async_trait]
pub trait Storage: Send + Sync {
    /// 保存 `bytes`，返回实际保存的文件名
    ///
    /// `prompt_user` 为 true 时先询问保存位置。
    async fn save(&self, bytes: &[u8], filename: &str, prompt_user: bool) -> Result<String>;
}

/// 询问保存位置
#[async_trait]
pub trait DestinationPrompt: Send + Sync {
    /// 返回 None 表示用户放弃保存
    async fn choose(&self, suggested: &Path) -> Result<Option<PathBuf>>;
}

/// 从标准输入读取保存位置
///
/// 直接回车使用建议路径，输入 `-` 放弃保存。
pub struct StdinPrompt;

#[async_trait]
impl DestinationPrompt for StdinPrompt {
    async fn choose(&self, suggested: &Path) -> Result<Option<PathBuf>> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("💾 保存到 [{}] (输入 - 跳过): ", suggested.display()).as_bytes())
            .await?;
        stdout.flush().await?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;

        let answer = line.trim();
        Ok(match answer {
            "" => Some(suggested.to_path_buf()),
            "-" => None,
            other => Some(PathBuf::from(other)),
        })
    }
}

/// 写入输出目录的文件存储
pub struct FileStorage {
    output_dir: PathBuf,
    prompt: Box<dyn DestinationPrompt>,
}

impl FileStorage {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_prompt(output_dir, StdinPrompt)
    }

    pub fn with_prompt(output_dir: impl Into<PathBuf>, prompt: impl DestinationPrompt + 'static) -> Self {
        Self {
            output_dir: output_dir.into(),
            prompt: Box::new(prompt),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn save(&self, bytes: &[u8], filename: &str, prompt_user: bool) -> Result<String> {
        let suggested = self.output_dir.join(filename);
        let target = if prompt_user {
            self.prompt
                .choose(&suggested)
                .await?
                .ok_or_else(|| anyhow!("用户取消了保存"))?
        } else {
            suggested
        };

        // 临时文件和重命名都是阻塞 IO
        let bytes = bytes.to_vec();
        let written = tokio::task::spawn_blocking(move || write_atomic(&target, &bytes))
            .await
            .map_err(|e| anyhow!("写入任务异常退出: {}", e))??;
        info!("✓ 已保存: {}", written.display());

        Ok(written
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| filename.to_string()))
    }
}

/// 先写临时文件再重命名，已存在的同名文件会被替换
fn write_atomic(target: &Path, bytes: &[u8]) -> Result<PathBuf, FileError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    ensure_output_dir(&dir)?;

    let write_err = |source: std::io::Error| FileError::WriteFailed {
        path: target.display().to_string(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(target).map_err(|e| write_err(e.error))?;

    debug!("写入 {} 字节到 {}", bytes.len(), target.display());
    Ok(target.to_path_buf())
}

/// 确保输出目录存在，不存在则创建
pub fn ensure_output_dir(dir: &Path) -> Result<(), FileError> {
    let output_err = |reason: String| FileError::OutputDir {
        path: dir.display().to_string(),
        reason,
    };

    if dir.exists() {
        if !dir.is_dir() {
            return Err(output_err("不是目录".to_string()));
        }
    } else {
        std::fs::create_dir_all(dir).map_err(|e| output_err(e.to_string()))?;
    }
    Ok(())
}
