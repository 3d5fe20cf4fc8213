//! 批处理对外事件
//!
//! 事件只发不收：没有订阅者时直接丢弃。

use serde::Serialize;

use crate::models::ItemResult;

/// 批处理事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum BatchEvent {
    /// 开始处理第 `current` 个 URL（从 1 开始）
    Progress {
        current: usize,
        total: usize,
        url: String,
    },
    /// 一个 URL 处理结束
    Result {
        url: String,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// 批次结束
    Complete { cancelled: bool },
}

impl From<&ItemResult> for BatchEvent {
    fn from(result: &ItemResult) -> Self {
        match result {
            ItemResult::Success { url, filename } => BatchEvent::Result {
                url: url.clone(),
                success: true,
                filename: Some(filename.clone()),
                error: None,
            },
            ItemResult::Failure { url, error, .. } => BatchEvent::Result {
                url: url.clone(),
                success: false,
                filename: None,
                error: Some(error.clone()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_wire_shape() {
        let progress = BatchEvent::Progress {
            current: 1,
            total: 2,
            url: "https://a.example".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&progress).unwrap(),
            json!({"action": "progress", "current": 1, "total": 2, "url": "https://a.example"})
        );

        let result = BatchEvent::from(&ItemResult::Success {
            url: "https://a.example".to_string(),
            filename: "hello-world.md".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"action": "result", "url": "https://a.example", "success": true, "filename": "hello-world.md"})
        );

        assert_eq!(
            serde_json::to_value(BatchEvent::Complete { cancelled: true }).unwrap(),
            json!({"action": "complete", "cancelled": true})
        );
    }
}
