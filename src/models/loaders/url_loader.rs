use std::path::Path;

use tokio::fs;
use tracing::{debug, info};
use url::Url;

use crate::error::{AppError, AppResult, BatchError};

/// 从文本中解析 URL 列表
///
/// 按行拆分，去掉首尾空白；空行、无法解析的行以及非 http/https 的地址会被跳过。
pub fn parse_urls(text: &str) -> Vec<String> {
    let mut urls = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match Url::parse(trimmed) {
            Ok(url) if is_web_scheme(&url) => urls.push(trimmed.to_string()),
            Ok(url) => debug!("跳过非 http(s) 地址: {} ({})", trimmed, url.scheme()),
            Err(e) => debug!("跳过无效 URL: {} ({})", trimmed, e),
        }
    }

    urls
}

/// 从文件中读取 URL 列表
pub async fn load_url_file(path: &Path) -> AppResult<Vec<String>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let urls = parse_urls(&content);
    info!(
        "从 {} 读取到 {} 个 URL",
        path.file_name().unwrap_or_default().to_string_lossy(),
        urls.len()
    );
    Ok(urls)
}

/// 批次开始前的校验：列表非空，且每一项都是绝对的 http/https 地址
pub fn validate_urls(urls: &[String]) -> Result<(), BatchError> {
    if urls.is_empty() {
        return Err(BatchError::EmptyUrlList);
    }

    for raw in urls {
        match Url::parse(raw) {
            Ok(url) if is_web_scheme(&url) => {}
            _ => return Err(BatchError::InvalidUrl { url: raw.clone() }),
        }
    }

    Ok(())
}

fn is_web_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
