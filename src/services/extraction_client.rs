//! 内容提取服务 - 业务能力层
//!
//! 只负责"向页面要 Markdown"，不关心页面怎么打开、结果怎么保存

use std::borrow::Cow;

use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::error::ItemError;
use crate::infrastructure::PageContext;
use crate::models::ExtractedPage;

/// 注入到页面中的提取脚本
pub const EXTRACTOR_SCRIPT: &str = include_str!("../../assets/extractor.js");

/// 调用页面内提取能力的探测脚本
///
/// 能力不存在时返回 `{ absent: true }`，和提取脚本自己返回的 `{ error }` 区分开。
const GET_MARKDOWN_PROBE: &str = r#"
(() => {
    const api = window.__batchMarkdown;
    if (!api || typeof api.getMarkdown !== 'function') {
        return { absent: true };
    }
    return api.getMarkdown();
})()
"#;

/// 提取脚本的响应
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExtractionReply {
    Absent { absent: bool },
    Failed { error: String },
    Article { title: String, markdown: String },
}

/// 一次调用的结果
enum Attempt {
    Replied(Result<ExtractedPage, ItemError>),
    Unavailable(String),
}

/// 内容提取服务
///
/// 职责：
/// - 先直接调用页面中已有的提取能力
/// - 能力不存在时注入一次脚本，再调用一次
/// - 不做更多重试
pub struct ExtractionClient {
    capability_script: Cow<'static, str>,
}

impl ExtractionClient {
    /// 使用内置的提取脚本
    pub fn new() -> Self {
        Self {
            capability_script: Cow::Borrowed(EXTRACTOR_SCRIPT),
        }
    }

    /// 使用自定义的提取脚本
    pub fn with_script(script: impl Into<String>) -> Self {
        Self {
            capability_script: Cow::Owned(script.into()),
        }
    }

    /// 从已加载的页面提取标题和 Markdown
    pub async fn extract<C>(&self, ctx: &C) -> Result<ExtractedPage, ItemError>
    where
        C: PageContext + ?Sized,
    {
        let first_reason = match self.request(ctx).await {
            Attempt::Replied(result) => return result,
            Attempt::Unavailable(reason) => reason,
        };
        info!("页面 {} 中没有提取脚本 ({})，正在注入...", ctx.id(), first_reason);

        ctx.evaluate(&self.capability_script)
            .await
            .map_err(|e| ItemError::ExtractionUnavailable {
                reason: format!("注入提取脚本失败: {}", e),
            })?;

        match self.request(ctx).await {
            Attempt::Replied(result) => result,
            Attempt::Unavailable(reason) => Err(ItemError::ExtractionUnavailable { reason }),
        }
    }

    async fn request<C>(&self, ctx: &C) -> Attempt
    where
        C: PageContext + ?Sized,
    {
        let value = match ctx.evaluate(GET_MARKDOWN_PROBE).await {
            Ok(value) => value,
            Err(e) => return Attempt::Unavailable(e.to_string()),
        };
        Attempt::Replied(match parse_reply(value) {
            Ok(Some(page)) => Ok(page),
            Ok(None) => return Attempt::Unavailable("页面中没有响应者".to_string()),
            Err(e) => Err(e),
        })
    }
}

impl Default for ExtractionClient {
    fn default() -> Self {
        Self::new()
    }
}

/// 解析探测脚本的返回值；`Ok(None)` 表示页面里没有提取能力
fn parse_reply(value: JsonValue) -> Result<Option<ExtractedPage>, ItemError> {
    let reply: ExtractionReply =
        serde_json::from_value(value).map_err(|e| ItemError::ExtractionSemantic {
            message: format!("无法解析提取结果: {}", e),
        })?;

    match reply {
        ExtractionReply::Absent { absent: true } => Ok(None),
        ExtractionReply::Absent { absent: false } => Err(ItemError::ExtractionSemantic {
            message: "提取结果为空".to_string(),
        }),
        ExtractionReply::Failed { error } => Err(ItemError::ExtractionSemantic { message: error }),
        ExtractionReply::Article { title, markdown } => {
            debug!("提取成功: {} ({} 字节)", title, markdown.len());
            Ok(Some(ExtractedPage { title, markdown }))
        }
    }
}
