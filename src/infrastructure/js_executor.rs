//! JS 执行器 - 基础设施层
//!
//! 持有一个 chromiumoxide 的 page 资源，只暴露"执行 JS"和"关闭"的能力

use anyhow::Result;
use async_trait::async_trait;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::infrastructure::page::PageContext;

/// JS 执行器
///
/// 职责：
/// - 持有一个 Page 资源
/// - 暴露 eval() 能力
/// - 不认识批次 / 文件名
/// - 不处理业务流程
pub struct JsExecutor {
    page: Page,
    target_id: String,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        let target_id = page.target_id().as_ref().to_string();
        Self { page, target_id }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    ///
    /// # 参数
    /// - `js_code`: 要执行的 JavaScript 代码
    ///
    /// # 返回
    /// 返回 JSON 值
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }
}

#[async_trait]
impl PageContext for JsExecutor {
    fn id(&self) -> &str {
        &self.target_id
    }

    async fn evaluate(&self, script: &str) -> Result<JsonValue> {
        self.eval(script).await
    }

    async fn close(&self) -> Result<()> {
        // Page::close 会消费 self
        self.page.clone().close().await?;
        Ok(())
    }
}
